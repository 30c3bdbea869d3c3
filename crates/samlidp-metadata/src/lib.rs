//! SAML 2.0 Identity Provider metadata.
//!
//! This crate assembles the signed `EntityDescriptor` a SAML identity
//! provider publishes so that service providers can discover its endpoints,
//! supported Name ID formats, attributes, and signing certificate.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`config`] - The IdP settings the document is built from
//! - [`metadata`] - The document assembler
//! - [`signature`] - Enveloped XML signature creation and validation
//! - [`types`] - Contacts, attributes, Name ID formats, and SAML constants
//! - [`error`] - Error types for metadata operations
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use samlidp_metadata::{
//!     MetadataBuilder, MetadataConfiguration, SamlError, SignatureConfig, XmlSigner,
//! };
//!
//! # fn main() -> samlidp_metadata::SamlResult<()> {
//! let config = MetadataConfiguration::load("idp.toml")?;
//! let private_key = std::fs::read_to_string("idp_key.pem")
//!     .map_err(|e| SamlError::Configuration(format!("idp_key.pem: {e}")))?;
//! let signer = XmlSigner::from_pem(
//!     &private_key,
//!     &config.x509_certificate,
//!     SignatureConfig::with_algorithm(config.algorithm),
//! )?;
//!
//! let builder = MetadataBuilder::new(Arc::new(config), Arc::new(signer));
//! println!("{}", builder.build()?);
//! # Ok(())
//! # }
//! ```
//!
//! # Standards
//!
//! The document and its signature follow:
//!
//! - [SAML 2.0 Metadata](https://docs.oasis-open.org/security/saml/v2.0/saml-metadata-2.0-os.pdf)
//! - [XML Signature](https://www.w3.org/TR/xmldsig-core1/)
//! - [Exclusive XML Canonicalization](https://www.w3.org/TR/xml-exc-c14n/)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod metadata;
pub mod signature;
pub mod types;

pub use config::MetadataConfiguration;
pub use error::{SamlError, SamlResult};
pub use metadata::MetadataBuilder;
pub use signature::{
    SignatureAlgorithm, SignatureConfig, Signer, XmlSignature, XmlSignatureValidator, XmlSigner,
};
pub use types::*;
