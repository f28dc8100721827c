// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use clap::Parser;
use jotter::Cli;
use jt_core::Config;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = match jotter::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };
    setup_logging(&config, cli.verbose);

    if let Err(e) = jotter::run(cli, config).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

/// Logs to stderr so the notes view on stdout stays readable.
fn setup_logging(config: &Config, verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let directive = if verbose {
        "debug"
    } else {
        config.log_filter.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
