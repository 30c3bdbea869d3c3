//! SAML metadata types and data structures.
//!
//! This module contains the configuration-facing types that feed the
//! metadata builder: contacts, attribute declarations, Name ID formats,
//! and the SAML constants they are published with.

mod attribute;
mod constants;
mod contact;
mod name_id;

pub use attribute::*;
pub use constants::*;
pub use contact::*;
pub use name_id::*;

/// Returns the value if it contains anything other than whitespace.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
