//! Rasterfx - Command-line tool for applying palette and viewport effects to rendered frames

use std::process::ExitCode;

use rasterfx::cli;

fn main() -> ExitCode {
    cli::run()
}
