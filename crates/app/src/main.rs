//! Torchgen - Main Entry Point
//!
//! Reads a settings file and writes the generated Lambda handler source.
//!
//! ```text
//! torchgen <config.yaml> <destination-dir>
//! ```

mod cli;
mod config;
mod report;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cli::Cli;
use config::AppConfig;

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::from(2);
        }
    };

    tracing::info!("torchgen v{}", env!("CARGO_PKG_VERSION"));

    let result = match &config.template {
        Some(template) => {
            torchgen_infrastructure::generate_with_template(&cli.config, &cli.destination, template)
        }
        None => torchgen_infrastructure::generate(&cli.config, &cli.destination),
    };

    match result {
        Ok(generated) => {
            println!("{}", generated.path.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", report::render_error(&err, config.format));
            ExitCode::FAILURE
        }
    }
}
