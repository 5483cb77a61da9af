//! marcdo command-line tool.

use anyhow::Context;
use clap::Parser;
use marcdo::cli::{self, Cli};
use marcdo::logging::init_logging;
use std::io::{self, Write};

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging(&cli.log_config()) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let exit_code = match execute(&cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn execute(cli: &Cli) -> anyhow::Result<i32> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let code = cli::run(&cli.command, &mut out).context("command failed")?;
    out.flush().context("failed to flush output")?;
    Ok(code)
}
