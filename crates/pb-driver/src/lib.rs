//! pb-driver - the PhoneBasic command-line front end
//!
//! Ties the four language-core crates together: read a source file,
//! run it through `pb-parse` (which drives `pb-lex` internally) and
//! `pb-codegen`, then load the resulting bytecode into a `pb-vm::Vm`
//! and run it to completion. Spec.md names this driver as an external
//! collaborator and leaves its shape mostly unspecified; this crate
//! gives it the same ambient shape (clap, tracing, anyhow) every other
//! driver crate in this workspace's corpus carries.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser as ClapParser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pb_codegen::{disassemble_window, lower_program};
use pb_parse::Parser as PbParser;
use pb_vm::{StdIo, Vm, VmError};

/// A tiny imperative, BASIC-flavoured language whose syntax avoids
/// characters awkward to type on a phone keypad.
#[derive(ClapParser, Debug)]
#[command(name = "phonebasic")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the PhoneBasic source file to run
    pub source: PathBuf,

    /// Enable verbose diagnostics and the VM's step tracer
    #[arg(short, long)]
    pub debug: bool,
}

/// Installs the `tracing` subscriber. `--debug` raises the default
/// filter from `info` to `debug` unless `RUST_LOG` already says
/// otherwise, mirroring the original implementation's
/// `SetDebugger(True)` verbosity bump.
pub fn init_logging(debug: bool) {
    let default_filter = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .try_init();
}

/// Runs the full pipeline for `cli.source`, returning the process exit
/// code: `0` on a clean `HALT`, `1` on any lex/parse/translate/VM
/// error (already logged and printed as a human-readable diagnostic).
pub fn run(cli: &Cli) -> i32 {
    match run_inner(cli) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {err:#}");
            1
        }
    }
}

fn run_inner(cli: &Cli) -> anyhow::Result<()> {
    let source = std::fs::read_to_string(&cli.source)
        .with_context(|| format!("failed to read {}", cli.source.display()))?;

    tracing::info!(path = %cli.source.display(), "parsing source");
    let ast = PbParser::parse_program(&source).map_err(|e| {
        tracing::error!(error = %e, "parse failed");
        e
    })?;

    tracing::info!(statements = ast.len(), "translating to bytecode");
    let artefact = lower_program(&ast).map_err(|e| {
        tracing::error!(error = %e, "translation failed");
        e
    })?;

    tracing::info!(bytes = artefact.code.len(), "running");
    let mut vm = Vm::new(StdIo::default());
    vm.load(artefact.code.clone(), artefact.strings);

    let result = if cli.debug {
        run_traced(&mut vm)
    } else {
        vm.run()
    };

    result.map_err(|e| {
        tracing::error!(error = %e, loc = ?e.loc(), "vm error");
        anyhow::anyhow!(render_vm_error(&e, &artefact.code))
    })
}

/// Steps the VM one instruction at a time, printing its state after
/// every step — the step tracer `--debug` enables.
fn run_traced<IO: pb_vm::VmIo>(vm: &mut Vm<IO>) -> Result<(), VmError> {
    while !vm.halted() {
        vm.step()?;
        tracing::debug!(
            ip = vm.ip(),
            name_reg = ?vm.name_register(),
            stack = ?vm.stack(),
            "step"
        );
    }
    Ok(())
}

/// Formats a VM error alongside a small disassembled window around the
/// offending instruction, per spec.md §7's "may render a small window
/// of disassembled instructions around `loc`".
fn render_vm_error(err: &VmError, code: &[u8]) -> String {
    match err.loc() {
        Some(loc) => {
            let window = disassemble_window(code, loc.0, 4);
            format!("{err}\n\n{window}")
        }
        None => err.to_string(),
    }
}
