//! Main entry point for the blitzcrack CLI app

use blitzcrack::cli_runner;

fn main() -> std::process::ExitCode {
    match cli_runner::run_cli_app() {
        Ok(code) => code,
        Err(e) => {
            if e.downcast_ref::<clap::Error>().is_none() {
                eprintln!("Error: {}", e);
            }
            std::process::ExitCode::FAILURE
        }
    }
}
