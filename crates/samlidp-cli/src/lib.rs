//! # samlidp-cli
//!
//! Command-line tools for SAML identity provider metadata.
//!
//! This crate provides command-line utilities for:
//! - Rendering signed IdP metadata from a TOML configuration
//! - Verifying the enveloped signature of a metadata document

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;

pub use cli::Cli;
pub use error::{CliError, CliResult};
