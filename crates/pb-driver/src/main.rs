use clap::Parser;

use pb_driver::{init_logging, run, Cli};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);
    std::process::exit(run(&cli));
}
