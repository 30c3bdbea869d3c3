//! Identifier generation.

use uuid::Uuid;

/// Generates a fresh reference identifier for a signed XML element.
///
/// The value is a valid XML `ID` (an NCName): an underscore followed by a
/// random v4 UUID, so it never starts with a digit.
#[must_use]
pub fn generate_reference_id() -> String {
    format!("_{}", Uuid::new_v4())
}
