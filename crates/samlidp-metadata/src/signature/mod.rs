//! Enveloped XML-DSig for metadata documents.
//!
//! [`XmlSigner`] places a `<ds:Signature>` inside the element it signs and
//! [`XmlSignatureValidator`] checks one. Both canonicalise with exclusive
//! C14N ([`c14n`]). RSA and ECDSA over SHA-256/384/512 are available;
//! RSA-SHA1 can be named in configuration or found in a document, but it is
//! never used to sign and never accepted.

pub mod c14n;
mod signer;
mod validator;

pub use signer::*;
pub use validator::*;

use serde::{Deserialize, Serialize};

use samlidp_crypto::SigningAlgorithm;

use crate::error::{SamlError, SamlResult};
use crate::types::{digest_algorithms, signature_algorithms};

/// Produces an enveloped signature over the element with a given ID.
///
/// The metadata builder only depends on this trait so that signing keys can
/// live wherever the host keeps them.
pub trait Signer: Send + Sync {
    /// Signs `xml`, inserting a `<ds:Signature>` as the first child of the
    /// element whose `ID` attribute equals `reference_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the element cannot be found or signing fails.
    fn sign(&self, xml: &str, reference_id: &str) -> SamlResult<String>;
}

/// `SignatureMethod` of the metadata signature.
///
/// Configured as `rsa-sha256`, `ecdsa-sha384`, ...; the bare digest names
/// (`sha256`, `sha1`, ...) select RSA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignatureAlgorithm {
    /// RSASSA-PKCS1-v1_5 with SHA-256.
    #[default]
    #[serde(alias = "sha256")]
    RsaSha256,
    /// RSASSA-PKCS1-v1_5 with SHA-384.
    #[serde(alias = "sha384")]
    RsaSha384,
    /// RSASSA-PKCS1-v1_5 with SHA-512.
    #[serde(alias = "sha512")]
    RsaSha512,
    /// ECDSA on P-256.
    EcdsaSha256,
    /// ECDSA on P-384.
    EcdsaSha384,
    /// ECDSA on P-521.
    EcdsaSha512,
    /// RSA with SHA-1; never signs or verifies.
    #[serde(alias = "sha1")]
    RsaSha1,
}

impl SignatureAlgorithm {
    /// Every algorithm, usable ones first.
    pub const ALL: [Self; 7] = [
        Self::RsaSha256,
        Self::RsaSha384,
        Self::RsaSha512,
        Self::EcdsaSha256,
        Self::EcdsaSha384,
        Self::EcdsaSha512,
        Self::RsaSha1,
    ];

    /// `SignatureMethod/@Algorithm` URI.
    #[must_use]
    pub const fn uri(&self) -> &'static str {
        match self {
            Self::RsaSha256 => signature_algorithms::RSA_SHA256,
            Self::RsaSha384 => signature_algorithms::RSA_SHA384,
            Self::RsaSha512 => signature_algorithms::RSA_SHA512,
            Self::EcdsaSha256 => signature_algorithms::ECDSA_SHA256,
            Self::EcdsaSha384 => signature_algorithms::ECDSA_SHA384,
            Self::EcdsaSha512 => signature_algorithms::ECDSA_SHA512,
            Self::RsaSha1 => signature_algorithms::RSA_SHA1,
        }
    }

    /// `DigestMethod/@Algorithm` URI paired with this algorithm.
    #[must_use]
    pub const fn digest_uri(&self) -> &'static str {
        match self {
            Self::RsaSha256 | Self::EcdsaSha256 => digest_algorithms::SHA256,
            Self::RsaSha384 | Self::EcdsaSha384 => digest_algorithms::SHA384,
            Self::RsaSha512 | Self::EcdsaSha512 => digest_algorithms::SHA512,
            Self::RsaSha1 => digest_algorithms::SHA1,
        }
    }

    /// Looks an algorithm up by its `SignatureMethod` URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|alg| alg.uri() == uri)
    }

    /// RSA key family.
    #[must_use]
    pub const fn is_rsa(&self) -> bool {
        !self.is_ecdsa()
    }

    /// Elliptic-curve key family.
    #[must_use]
    pub const fn is_ecdsa(&self) -> bool {
        matches!(
            self,
            Self::EcdsaSha256 | Self::EcdsaSha384 | Self::EcdsaSha512
        )
    }

    /// SHA-1 based.
    #[must_use]
    pub const fn is_deprecated(&self) -> bool {
        matches!(self, Self::RsaSha1)
    }

    /// Maps to the primitive used for signing and verification.
    ///
    /// # Errors
    ///
    /// Returns an error for SHA-1, which has no primitive.
    pub fn signing_algorithm(&self) -> SamlResult<SigningAlgorithm> {
        match self {
            Self::RsaSha256 => Ok(SigningAlgorithm::RsaPkcs1Sha256),
            Self::RsaSha384 => Ok(SigningAlgorithm::RsaPkcs1Sha384),
            Self::RsaSha512 => Ok(SigningAlgorithm::RsaPkcs1Sha512),
            Self::EcdsaSha256 => Ok(SigningAlgorithm::EcdsaP256Sha256),
            Self::EcdsaSha384 => Ok(SigningAlgorithm::EcdsaP384Sha384),
            Self::EcdsaSha512 => Ok(SigningAlgorithm::EcdsaP521Sha512),
            Self::RsaSha1 => Err(SamlError::SignatureCreation(
                "RSA-SHA1 is not supported".to_string(),
            )),
        }
    }
}

/// The parts of a verified `<ds:Signature>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlSignature {
    /// From `SignatureMethod`.
    pub algorithm: SignatureAlgorithm,
    /// `Reference/@URI`, i.e. `#` and the signed element's ID.
    pub reference_uri: String,
    /// Base64 `DigestValue`.
    pub digest_value: String,
    /// Base64 `SignatureValue`.
    pub signature_value: String,
    /// Base64 DER certificate from `KeyInfo`, when embedded.
    pub x509_certificate: Option<String>,
}

impl XmlSignature {
    /// Returns the referenced ID without the leading `#`.
    #[must_use]
    pub fn reference_id(&self) -> &str {
        self.reference_uri
            .strip_prefix('#')
            .unwrap_or(&self.reference_uri)
    }
}

/// How [`XmlSigner`] signs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureConfig {
    /// Algorithm pair written into `SignedInfo`.
    pub algorithm: SignatureAlgorithm,
    /// Embed the signing certificate in `ds:KeyInfo`.
    pub include_certificate: bool,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self::with_algorithm(SignatureAlgorithm::RsaSha256)
    }
}

impl SignatureConfig {
    /// Signs with `algorithm` and embeds the certificate.
    #[must_use]
    pub const fn with_algorithm(algorithm: SignatureAlgorithm) -> Self {
        Self {
            algorithm,
            include_certificate: true,
        }
    }
}
