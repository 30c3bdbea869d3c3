//! Signature verification and the shared error type.

use aws_lc_rs::signature::{
    self, UnparsedPublicKey, ECDSA_P256_SHA256_FIXED, ECDSA_P384_SHA384_FIXED,
    ECDSA_P521_SHA512_FIXED, RSA_PKCS1_2048_8192_SHA256, RSA_PKCS1_2048_8192_SHA384,
    RSA_PKCS1_2048_8192_SHA512,
};
use thiserror::Error;
use x509_parser::prelude::{FromDer, X509Certificate};

use crate::algorithm::SigningAlgorithm;

/// Error type for signature operations.
#[derive(Debug, Error)]
pub enum SignatureError {
    /// Signing failed.
    #[error("signing failed: {0}")]
    Signing(String),

    /// Verification failed.
    #[error("signature verification failed")]
    Verification,

    /// Invalid key format.
    #[error("invalid key format: {0}")]
    InvalidKey(String),

    /// Invalid certificate.
    #[error("invalid certificate: {0}")]
    InvalidCertificate(String),

    /// Algorithm not supported for the given key.
    #[error("algorithm not supported: {0}")]
    UnsupportedAlgorithm(String),
}

/// Extracts the public key bytes from a DER-encoded X.509 certificate.
///
/// For RSA this is the PKCS#1 `RSAPublicKey`, for ECDSA the uncompressed
/// curve point; both are what [`verify`] expects.
///
/// # Errors
///
/// Returns an error if the certificate cannot be parsed.
pub fn public_key_from_certificate(cert_der: &[u8]) -> Result<Vec<u8>, SignatureError> {
    let (_, cert) = X509Certificate::from_der(cert_der)
        .map_err(|e| SignatureError::InvalidCertificate(format!("failed to parse: {e}")))?;

    Ok(cert.public_key().subject_public_key.data.to_vec())
}

/// Verifies a signature over `data` with the given public key.
///
/// # Errors
///
/// Returns [`SignatureError::Verification`] if the signature does not match.
pub fn verify(
    algorithm: SigningAlgorithm,
    public_key: &[u8],
    data: &[u8],
    sig: &[u8],
) -> Result<(), SignatureError> {
    let verification_alg: &'static dyn signature::VerificationAlgorithm = match algorithm {
        SigningAlgorithm::RsaPkcs1Sha256 => &RSA_PKCS1_2048_8192_SHA256,
        SigningAlgorithm::RsaPkcs1Sha384 => &RSA_PKCS1_2048_8192_SHA384,
        SigningAlgorithm::RsaPkcs1Sha512 => &RSA_PKCS1_2048_8192_SHA512,
        SigningAlgorithm::EcdsaP256Sha256 => &ECDSA_P256_SHA256_FIXED,
        SigningAlgorithm::EcdsaP384Sha384 => &ECDSA_P384_SHA384_FIXED,
        SigningAlgorithm::EcdsaP521Sha512 => &ECDSA_P521_SHA512_FIXED,
    };

    UnparsedPublicKey::new(verification_alg, public_key)
        .verify(data, sig)
        .map_err(|_| SignatureError::Verification)
}
