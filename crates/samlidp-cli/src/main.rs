//! # samlidp
//!
//! Command-line tool for SAML identity provider metadata.

#![forbid(unsafe_code)]

use clap::Parser;
use samlidp_cli::{
    cli::{Cli, Command},
    commands::{run_metadata, run_verify},
    output::error,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match cli.command {
        Command::Metadata(args) => run_metadata(&args),
        Command::Verify(args) => run_verify(&args),
    };

    if let Err(e) = result {
        error(&e.to_string());
        std::process::exit(1);
    }
}
