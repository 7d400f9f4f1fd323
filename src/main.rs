//! beatprefix CLI entry point

use beatprefix::config::{Cli, Settings};
use beatprefix::pipeline;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(&cli);

    let settings = Settings::from_cli(&cli);

    if let Err(e) = validate_inputs(&cli) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    match pipeline::run(&settings) {
        Ok(result) => {
            if settings.dry_run {
                return ExitCode::SUCCESS;
            }
            if result.total_files == 0 {
                println!("No files found to analyze.");
                return ExitCode::SUCCESS;
            }

            println!();
            println!(
                "Summary: {} successful, {} failed (of {} total)",
                result.successful, result.failed, result.total_files
            );
            for (path, error) in result.failures() {
                eprintln!("  {}: {}", path.display(), error);
            }

            if result.has_failures() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Fatal error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let filter = cli.log_level().to_string().to_lowercase();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

fn validate_inputs(cli: &Cli) -> Result<(), String> {
    if !cli.dir.exists() {
        return Err(format!(
            "Library directory does not exist: {}\n\n  Tip: Check the path is correct and accessible.\n  Example:\n    beatprefix --dir ~/Music/DJ --bitrate 320k",
            cli.dir.display()
        ));
    }

    if !cli.dir.is_dir() {
        return Err(format!(
            "--dir must point to a directory, got a file: {}",
            cli.dir.display()
        ));
    }

    Ok(())
}
