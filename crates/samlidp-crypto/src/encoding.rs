//! PEM decoding for keys and certificates.

use crate::signature::SignatureError;

/// PEM labels accepted for private keys, in preference order.
const PRIVATE_KEY_LABELS: [&str; 3] = ["PRIVATE KEY", "RSA PRIVATE KEY", "EC PRIVATE KEY"];

/// Decoded private key material together with its PEM label.
#[derive(Debug, Clone)]
pub struct PrivateKeyDer {
    /// The PEM label, e.g. `PRIVATE KEY` for PKCS#8.
    pub label: String,
    /// The DER bytes.
    pub der: Vec<u8>,
}

impl PrivateKeyDer {
    /// Returns true if the key is PKCS#8 encoded.
    #[must_use]
    pub fn is_pkcs8(&self) -> bool {
        self.label == "PRIVATE KEY"
    }
}

/// Extracts the first private key block from PEM text.
///
/// # Errors
///
/// Returns [`SignatureError::InvalidKey`] if no private key block is present
/// or the PEM cannot be decoded.
pub fn private_key_der_from_pem(text: &str) -> Result<PrivateKeyDer, SignatureError> {
    let blocks = pem::parse_many(text)
        .map_err(|e| SignatureError::InvalidKey(format!("invalid PEM: {e}")))?;

    blocks
        .into_iter()
        .find(|block| PRIVATE_KEY_LABELS.contains(&block.tag()))
        .map(|block| PrivateKeyDer {
            label: block.tag().to_string(),
            der: block.contents().to_vec(),
        })
        .ok_or_else(|| SignatureError::InvalidKey("no private key block found".to_string()))
}

/// Extracts the first certificate block from PEM text as DER.
///
/// # Errors
///
/// Returns [`SignatureError::InvalidCertificate`] if no certificate block is
/// present or the PEM cannot be decoded.
pub fn certificate_der_from_pem(text: &str) -> Result<Vec<u8>, SignatureError> {
    let blocks = pem::parse_many(text)
        .map_err(|e| SignatureError::InvalidCertificate(format!("invalid PEM: {e}")))?;

    blocks
        .into_iter()
        .find(|block| block.tag() == "CERTIFICATE")
        .map(|block| block.contents().to_vec())
        .ok_or_else(|| {
            SignatureError::InvalidCertificate("no certificate block found".to_string())
        })
}
