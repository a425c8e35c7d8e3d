//! slippy-tiler - Generate slippy-map tiles from a large square image.
//!
//! Exit codes: 0 on success, otherwise the category code of the failure
//! (see [`slippy_tiler::TilerError::exit_code`]).

use clap::Parser;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use slippy_tiler::{run, Config, OutputFormat};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(&config);

    let report = match run(&config).await {
        Ok(report) => report,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(e.exit_code());
        }
    };

    if config.format == OutputFormat::Json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to serialize report: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
///
/// Progress goes to stdout, or stderr when stdout carries the JSON report.
/// `RUST_LOG` overrides the level chosen by `-v`, but never `-q`.
fn init_logging(config: &Config) {
    let env_filter = if config.quiet {
        EnvFilter::new("off")
    } else {
        let default = if config.verbose {
            "slippy_tiler=debug"
        } else {
            "slippy_tiler=info"
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into())
    };

    let writer = match config.format {
        OutputFormat::Text => BoxMakeWriter::new(std::io::stdout),
        OutputFormat::Json => BoxMakeWriter::new(std::io::stderr),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .without_time()
                .with_target(false),
        )
        .init();
}
