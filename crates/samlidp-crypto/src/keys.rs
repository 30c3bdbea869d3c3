//! Private key loading and signing.
//!
//! RSA keys are accepted in PKCS#8 or PKCS#1 form; ECDSA keys must be PKCS#8.
//! ECDSA signatures are produced in the fixed-width `r || s` form required
//! by XML-DSig rather than ASN.1 DER.

use aws_lc_rs::{
    rand::SystemRandom,
    signature::{
        self, EcdsaKeyPair, EcdsaSigningAlgorithm, KeyPair, RsaKeyPair,
        ECDSA_P256_SHA256_FIXED_SIGNING, ECDSA_P384_SHA384_FIXED_SIGNING,
        ECDSA_P521_SHA512_FIXED_SIGNING,
    },
};

use crate::algorithm::SigningAlgorithm;
use crate::encoding::private_key_der_from_pem;
use crate::signature::SignatureError;

enum KeyMaterial {
    Rsa(RsaKeyPair),
    Ecdsa(EcdsaKeyPair),
}

/// A private key bound to the algorithm it signs with.
pub struct SigningKey {
    material: KeyMaterial,
    algorithm: SigningAlgorithm,
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl SigningKey {
    /// Loads a signing key from PEM text.
    ///
    /// # Errors
    ///
    /// Returns an error if the PEM holds no usable key or the key type does
    /// not match `algorithm`.
    pub fn from_pem(pem: &str, algorithm: SigningAlgorithm) -> Result<Self, SignatureError> {
        let key = private_key_der_from_pem(pem)?;
        if key.is_pkcs8() {
            Self::from_pkcs8(&key.der, algorithm)
        } else if algorithm.is_rsa() {
            Self::from_rsa_der(&key.der, algorithm)
        } else {
            Err(SignatureError::InvalidKey(format!(
                "{} keys are not supported for {algorithm:?}; use PKCS#8",
                key.label
            )))
        }
    }

    /// Loads a signing key from PKCS#8 DER.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid for `algorithm`.
    pub fn from_pkcs8(pkcs8_der: &[u8], algorithm: SigningAlgorithm) -> Result<Self, SignatureError> {
        let material = if algorithm.is_rsa() {
            let key_pair = RsaKeyPair::from_pkcs8(pkcs8_der).map_err(|e| {
                SignatureError::InvalidKey(format!("invalid RSA PKCS#8 key for {algorithm:?}: {e}"))
            })?;
            KeyMaterial::Rsa(key_pair)
        } else {
            let key_pair = EcdsaKeyPair::from_pkcs8(ecdsa_signing_algorithm(algorithm), pkcs8_der)
                .map_err(|e| {
                    SignatureError::InvalidKey(format!(
                        "invalid ECDSA PKCS#8 key for {algorithm:?}: {e}"
                    ))
                })?;
            KeyMaterial::Ecdsa(key_pair)
        };

        Ok(Self {
            material,
            algorithm,
        })
    }

    /// Loads an RSA signing key from PKCS#1 `RSAPrivateKey` DER.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or `algorithm` is not RSA.
    pub fn from_rsa_der(der: &[u8], algorithm: SigningAlgorithm) -> Result<Self, SignatureError> {
        if !algorithm.is_rsa() {
            return Err(SignatureError::UnsupportedAlgorithm(format!(
                "{algorithm:?} is not an RSA algorithm"
            )));
        }

        let key_pair = RsaKeyPair::from_der(der)
            .map_err(|e| SignatureError::InvalidKey(format!("invalid RSA DER key: {e}")))?;

        Ok(Self {
            material: KeyMaterial::Rsa(key_pair),
            algorithm,
        })
    }

    /// Returns the signature algorithm.
    #[must_use]
    pub const fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    /// Returns the public key bytes (PKCS#1 for RSA, curve point for ECDSA).
    #[must_use]
    pub fn public_key(&self) -> Vec<u8> {
        match &self.material {
            KeyMaterial::Rsa(key_pair) => key_pair.public_key().as_ref().to_vec(),
            KeyMaterial::Ecdsa(key_pair) => key_pair.public_key().as_ref().to_vec(),
        }
    }

    /// Signs the given data.
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails.
    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>, SignatureError> {
        let rng = SystemRandom::new();

        match &self.material {
            KeyMaterial::Rsa(key_pair) => {
                let padding: &'static dyn signature::RsaEncoding = match self.algorithm {
                    SigningAlgorithm::RsaPkcs1Sha256 => &signature::RSA_PKCS1_SHA256,
                    SigningAlgorithm::RsaPkcs1Sha384 => &signature::RSA_PKCS1_SHA384,
                    SigningAlgorithm::RsaPkcs1Sha512 => &signature::RSA_PKCS1_SHA512,
                    other => {
                        return Err(SignatureError::UnsupportedAlgorithm(format!(
                            "{other:?} not supported for RSA signing"
                        )));
                    }
                };

                let mut sig = vec![0u8; key_pair.public_modulus_len()];
                key_pair
                    .sign(padding, &rng, data, &mut sig)
                    .map_err(|e| SignatureError::Signing(format!("RSA signing failed: {e}")))?;
                Ok(sig)
            }
            KeyMaterial::Ecdsa(key_pair) => {
                let sig = key_pair
                    .sign(&rng, data)
                    .map_err(|e| SignatureError::Signing(format!("ECDSA signing failed: {e}")))?;
                Ok(sig.as_ref().to_vec())
            }
        }
    }
}

fn ecdsa_signing_algorithm(algorithm: SigningAlgorithm) -> &'static EcdsaSigningAlgorithm {
    match algorithm {
        SigningAlgorithm::EcdsaP384Sha384 => &ECDSA_P384_SHA384_FIXED_SIGNING,
        SigningAlgorithm::EcdsaP521Sha512 => &ECDSA_P521_SHA512_FIXED_SIGNING,
        _ => &ECDSA_P256_SHA256_FIXED_SIGNING,
    }
}
