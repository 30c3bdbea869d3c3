//! Identity provider metadata configuration.
//!
//! A [`MetadataConfiguration`] is built once, usually from a TOML file, and
//! shared read-only with every [`MetadataBuilder`](crate::MetadataBuilder):
//!
//! ```toml
//! base_saml_location = "https://idp.example.com/saml"
//! algorithm = "rsa-sha256"
//! x509_certificate = """
//! -----BEGIN CERTIFICATE-----
//! MIIC...
//! -----END CERTIFICATE-----
//! """
//! single_service_post_location = "https://idp.example.com/saml/auth"
//! name_id_formats = ["email_address", "persistent"]
//!
//! [technical_contact]
//! company = "Example"
//! email_address = "ops@example.com"
//!
//! [[attributes]]
//! key = "email"
//! name = "urn:oid:0.9.2342.19200300.100.1.3"
//! values = []
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SamlError, SamlResult};
use crate::signature::SignatureAlgorithm;
use crate::types::{non_blank, AttributeDeclaration, ContactInfo, NameIdFormats};

/// Settings published in the IdP metadata document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfiguration {
    /// Entity ID; defaults to `base_saml_location` when unset.
    pub entity_id: Option<String>,

    /// Base URL of the SAML endpoints.
    pub base_saml_location: String,

    /// Signature algorithm for the metadata signature.
    pub algorithm: SignatureAlgorithm,

    /// Signing certificate in PEM format.
    pub x509_certificate: String,

    /// Whether service providers must sign authentication requests.
    pub signed_auth_requests: bool,

    /// Single sign-on location for the HTTP-POST binding.
    pub single_service_post_location: Option<String>,

    /// Single sign-on location for the HTTP-Redirect binding.
    pub single_service_redirect_location: Option<String>,

    /// Single logout location for the HTTP-POST binding.
    pub single_logout_service_post_location: Option<String>,

    /// Single logout location for the HTTP-Redirect binding.
    pub single_logout_service_redirect_location: Option<String>,

    /// Published attributes, in order.
    pub attributes: Vec<AttributeDeclaration>,

    /// Technical contact.
    pub technical_contact: ContactInfo,

    /// Supported Name ID formats.
    pub name_id_formats: NameIdFormats,
}

impl MetadataConfiguration {
    /// Creates a configuration for the given base location.
    #[must_use]
    pub fn new(base_saml_location: impl Into<String>) -> Self {
        Self {
            base_saml_location: base_saml_location.into(),
            ..Self::default()
        }
    }

    /// Parses a configuration from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::Configuration`] if the TOML is invalid.
    pub fn from_toml_str(content: &str) -> SamlResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Loads a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::Configuration`] if the file cannot be read or
    /// parsed.
    pub fn load(path: impl AsRef<Path>) -> SamlResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SamlError::Configuration(format!("failed to read {}: {e}", path.display()))
        })?;
        let config = Self::from_toml_str(&content)?;
        if config.algorithm.is_deprecated() {
            tracing::warn!(
                algorithm = ?config.algorithm,
                "configured signature algorithm is refused for signing"
            );
        }
        tracing::debug!(path = %path.display(), "loaded metadata configuration");
        Ok(config)
    }

    /// Returns the entity ID, falling back to the base SAML location.
    #[must_use]
    pub fn resolved_entity_id(&self) -> &str {
        non_blank(self.entity_id.as_deref()).unwrap_or(&self.base_saml_location)
    }

    /// Returns the base64 certificate body without PEM armour or line breaks.
    #[must_use]
    pub fn certificate_payload(&self) -> String {
        self.x509_certificate
            .replace("-----BEGIN CERTIFICATE-----", "")
            .replace("-----END CERTIFICATE-----", "")
            .replace(['\n', '\r'], "")
    }

    /// Sets the entity ID.
    #[must_use]
    pub fn with_entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Sets the signature algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: SignatureAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Sets the signing certificate (PEM).
    #[must_use]
    pub fn with_certificate(mut self, certificate_pem: impl Into<String>) -> Self {
        self.x509_certificate = certificate_pem.into();
        self
    }

    /// Sets whether authentication requests must be signed.
    #[must_use]
    pub fn with_signed_auth_requests(mut self, signed: bool) -> Self {
        self.signed_auth_requests = signed;
        self
    }

    /// Sets the HTTP-POST single sign-on location.
    #[must_use]
    pub fn with_sso_post_location(mut self, location: impl Into<String>) -> Self {
        self.single_service_post_location = Some(location.into());
        self
    }

    /// Sets the HTTP-Redirect single sign-on location.
    #[must_use]
    pub fn with_sso_redirect_location(mut self, location: impl Into<String>) -> Self {
        self.single_service_redirect_location = Some(location.into());
        self
    }

    /// Sets the HTTP-POST single logout location.
    #[must_use]
    pub fn with_slo_post_location(mut self, location: impl Into<String>) -> Self {
        self.single_logout_service_post_location = Some(location.into());
        self
    }

    /// Sets the HTTP-Redirect single logout location.
    #[must_use]
    pub fn with_slo_redirect_location(mut self, location: impl Into<String>) -> Self {
        self.single_logout_service_redirect_location = Some(location.into());
        self
    }

    /// Appends an attribute declaration.
    #[must_use]
    pub fn with_attribute(mut self, attribute: AttributeDeclaration) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Sets the technical contact.
    #[must_use]
    pub fn with_technical_contact(mut self, contact: ContactInfo) -> Self {
        self.technical_contact = contact;
        self
    }

    /// Sets the Name ID formats.
    #[must_use]
    pub fn with_name_id_formats(mut self, formats: NameIdFormats) -> Self {
        self.name_id_formats = formats;
        self
    }
}
