//! Output formatting utilities.
//!
//! Status messages go to stderr so that documents written to stdout can be
//! piped.

use std::io::Write;
use std::path::Path;

use colored::Colorize;

/// Prints a success message.
pub fn success(message: &str) {
    eprintln!("{} {}", "✓".green().bold(), message);
}

/// Prints an error message.
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Prints a warning message.
pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Writes a document to `path`, or to stdout when no path is given.
pub fn write_document(document: &str, path: Option<&Path>) -> crate::CliResult<()> {
    match path {
        Some(path) => {
            std::fs::write(path, document)?;
            success(&format!("wrote {}", path.display()));
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(document.as_bytes())?;
            stdout.write_all(b"\n")?;
            stdout.flush()?;
        }
    }
    Ok(())
}
