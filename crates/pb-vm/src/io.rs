//! The VM's three external collaborators: printing, line input, and
//! screen clearing. None of these are specified in detail (§1 names
//! them as "external collaborators, not specified") — `VmIo` exists so
//! tests can swap in an in-memory double instead of touching the real
//! terminal.

use std::io::{self, BufRead, Write};

pub trait VmIo {
    fn print(&mut self, text: &str);
    fn read_line(&mut self) -> io::Result<String>;
    fn clear_screen(&mut self);
}

/// Talks to the real process stdin/stdout, and shells out to the host
/// clear command the way the reference CLI does.
#[derive(Default)]
pub struct StdIo;

impl VmIo for StdIo {
    fn print(&mut self, text: &str) {
        print!("{text}");
        let _ = io::stdout().flush();
    }

    fn read_line(&mut self) -> io::Result<String> {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(line)
    }

    fn clear_screen(&mut self) {
        let cmd = if cfg!(windows) { "cls" } else { "clear" };
        let _ = std::process::Command::new(cmd).status();
    }
}

/// An in-memory [`VmIo`] for tests: `input` is drained line by line,
/// everything printed is appended to `output`, and clears are just
/// counted.
#[derive(Default)]
pub struct TestIo {
    pub input: std::collections::VecDeque<String>,
    pub output: String,
    pub clears: usize,
}

impl TestIo {
    pub fn with_input(lines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            input: lines.into_iter().map(Into::into).collect(),
            output: String::new(),
            clears: 0,
        }
    }
}

impl VmIo for TestIo {
    fn print(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn read_line(&mut self) -> io::Result<String> {
        Ok(self.input.pop_front().unwrap_or_default())
    }

    fn clear_screen(&mut self) {
        self.clears += 1;
    }
}
