//! Attribute declarations and their decorated metadata form.

use serde::{Deserialize, Serialize};

use super::attribute_name_formats;
use super::non_blank;

/// A configured attribute, keyed by its configuration name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDeclaration {
    /// Configuration key; also the default name and friendly name.
    pub key: String,

    /// The attribute name (typically a URI).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// The format of the attribute name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_format: Option<String>,

    /// Overrides the friendly name derived from `key`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,

    /// Values advertised for the attribute, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

impl AttributeDeclaration {
    /// Creates a declaration with only a key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Sets the attribute name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the name format.
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.name_format = Some(format.into());
        self
    }

    /// Overrides the friendly name.
    #[must_use]
    pub fn with_friendly_name(mut self, friendly_name: impl Into<String>) -> Self {
        self.friendly_name = Some(friendly_name.into());
        self
    }

    /// Appends a value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.values.push(value.into());
        self
    }
}

/// An attribute as published in the `IDPSSODescriptor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRecord {
    /// The attribute name.
    pub name: String,
    /// The format of the attribute name.
    pub name_format: String,
    /// Human-readable name.
    pub friendly_name: String,
    /// Ordered values; may be empty.
    pub values: Vec<String>,
}

/// Normalizes attribute declarations into metadata records.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeDecorator;

impl AttributeDecorator {
    /// Decorates a single declaration.
    #[must_use]
    pub fn decorate(declaration: &AttributeDeclaration) -> AttributeRecord {
        let key = declaration.key.as_str();

        AttributeRecord {
            name: non_blank(declaration.name.as_deref())
                .unwrap_or(key)
                .to_string(),
            name_format: non_blank(declaration.name_format.as_deref())
                .unwrap_or(attribute_name_formats::URI)
                .to_string(),
            friendly_name: non_blank(declaration.friendly_name.as_deref())
                .unwrap_or(key)
                .to_string(),
            values: declaration.values.clone(),
        }
    }

    /// Decorates declarations, preserving their order.
    #[must_use]
    pub fn decorate_all(declarations: &[AttributeDeclaration]) -> Vec<AttributeRecord> {
        declarations.iter().map(Self::decorate).collect()
    }
}
