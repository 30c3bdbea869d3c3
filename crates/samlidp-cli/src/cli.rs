//! CLI argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// SAML IdP metadata tool.
#[derive(Debug, Parser)]
#[command(name = "samlidp")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose (debug) logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render signed IdP metadata.
    Metadata(MetadataArgs),

    /// Verify the signature of a metadata document.
    Verify(VerifyArgs),
}

/// Arguments for `metadata`.
#[derive(Debug, Args)]
pub struct MetadataArgs {
    /// IdP configuration file (TOML).
    #[arg(short, long, env = "SAMLIDP_CONFIG")]
    pub config: PathBuf,

    /// PEM private key used to sign the document.
    #[arg(short, long, env = "SAMLIDP_SIGNING_KEY")]
    pub key: PathBuf,

    /// PEM certificate; overrides `x509_certificate` from the configuration.
    #[arg(long)]
    pub certificate: Option<PathBuf>,

    /// Write the document here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Validate the signature before writing the document.
    #[arg(long)]
    pub verify: bool,
}

/// Arguments for `verify`.
#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// Metadata document to verify.
    pub document: PathBuf,

    /// Trusted PEM certificate; may be repeated. Without one, the
    /// certificate embedded in the signature is used.
    #[arg(long = "certificate")]
    pub certificates: Vec<PathBuf>,
}
