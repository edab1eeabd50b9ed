use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use departures_bridge::{cli, run};

fn main() -> ExitCode {
    // Logging goes to stderr: stdout carries exactly one JSON line.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::parse();

    match run(&cli.config(), &cli.stop_name) {
        Ok(line) => {
            println!("{line}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
