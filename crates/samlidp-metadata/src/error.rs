//! SAML error types.
//!
//! Metadata generation itself has no error states; everything here
//! originates in a collaborator (configuration, signer, XML writer) and is
//! passed through unchanged.

use thiserror::Error;

/// Result type for SAML operations.
pub type SamlResult<T> = Result<T, SamlError>;

/// SAML metadata errors.
#[derive(Debug, Error)]
pub enum SamlError {
    /// Configuration is missing or malformed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// XML signature creation failed.
    #[error("signature creation failed: {0}")]
    SignatureCreation(String),

    /// XML signature validation failed.
    #[error("signature validation failed: {0}")]
    SignatureInvalid(String),

    /// XML parsing error.
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// XML serialization error.
    #[error("XML write error: {0}")]
    XmlWrite(String),

    /// Cryptographic operation error.
    #[error("crypto error: {0}")]
    Crypto(String),
}

impl SamlError {
    /// Returns true if the error was raised while loading configuration.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Returns true if the error was raised while producing or checking a
    /// signature.
    #[must_use]
    pub const fn is_signature(&self) -> bool {
        matches!(
            self,
            Self::SignatureCreation(_) | Self::SignatureInvalid(_) | Self::Crypto(_)
        )
    }
}

impl From<quick_xml::Error> for SamlError {
    fn from(err: quick_xml::Error) -> Self {
        Self::XmlParse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for SamlError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::XmlParse(err.to_string())
    }
}

impl From<toml::de::Error> for SamlError {
    fn from(err: toml::de::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}

impl From<samlidp_crypto::SignatureError> for SamlError {
    fn from(err: samlidp_crypto::SignatureError) -> Self {
        Self::Crypto(err.to_string())
    }
}
