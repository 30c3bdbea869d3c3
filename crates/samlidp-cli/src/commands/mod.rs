//! Command implementations.

pub mod metadata;
pub mod verify;

pub use metadata::{render_metadata, run_metadata};
pub use verify::{run_verify, verify_document};

use std::path::Path;

use crate::{CliError, CliResult};

/// Reads a text file, naming it in the error.
fn read_file(path: &Path, what: &str) -> CliResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| CliError::Config(format!("failed to read {what} {}: {e}", path.display())))
}
