mod cli;
mod commands;
mod effects;

use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    tagmark_logging::initialize(cli.log.into(), level);

    match commands::run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
