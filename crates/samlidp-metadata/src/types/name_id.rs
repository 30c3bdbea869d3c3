//! Supported Name ID formats.
//!
//! Formats are configured by short name (`email_address`, `persistent`, ...)
//! either as a flat list, all of which are SAML 2.0 formats, or split by
//! SAML version. Values that are already URNs are published verbatim.

use serde::{Deserialize, Serialize};

/// Configured Name ID formats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NameIdFormats {
    /// A flat list of SAML 2.0 formats.
    List(Vec<String>),
    /// Formats split by SAML version.
    Versioned {
        /// SAML 1.1 formats.
        #[serde(rename = "1.1", default)]
        v1_1: Vec<String>,
        /// SAML 2.0 formats.
        #[serde(rename = "2.0", default)]
        v2_0: Vec<String>,
    },
}

impl Default for NameIdFormats {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

/// Expands configured formats into Name ID format URIs.
#[derive(Debug, Clone, Copy)]
pub struct NameIdFormatter<'a> {
    formats: &'a NameIdFormats,
}

impl<'a> NameIdFormatter<'a> {
    /// Creates a formatter over the configured formats.
    #[must_use]
    pub const fn new(formats: &'a NameIdFormats) -> Self {
        Self { formats }
    }

    /// Returns every format URI, SAML 1.1 entries before SAML 2.0 entries.
    #[must_use]
    pub fn all(&self) -> Vec<String> {
        match self.formats {
            NameIdFormats::Versioned { v1_1, v2_0 } => v1_1
                .iter()
                .map(|name| build("1.1", name))
                .chain(v2_0.iter().map(|name| build("2.0", name)))
                .collect(),
            NameIdFormats::List(list) => list.iter().map(|name| build("2.0", name)).collect(),
        }
    }
}

fn build(version: &str, name: &str) -> String {
    let name = name.trim();
    if name.starts_with("urn:") {
        return name.to_string();
    }
    format!(
        "urn:oasis:names:tc:SAML:{version}:nameid-format:{}",
        lower_camel_case(name)
    )
}

/// `email_address` -> `emailAddress`.
fn lower_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else if out.is_empty() {
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
