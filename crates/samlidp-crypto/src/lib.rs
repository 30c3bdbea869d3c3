//! # samlidp-crypto
//!
//! Cryptographic operations for the SAML identity provider using aws-lc-rs.
//!
//! XML-DSig over SAML metadata still relies on SHA-256 based algorithms for
//! interoperability, so unlike a greenfield protocol crate this one offers
//! RSA PKCS#1 v1.5 and ECDSA (fixed-width `r || s`) with SHA-256, SHA-384
//! and SHA-512. SHA-1 is intentionally absent.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod algorithm;
pub mod encoding;
pub mod hash;
pub mod keys;
pub mod random;
pub mod signature;

pub use algorithm::{DigestAlgorithm, SigningAlgorithm};
pub use encoding::{certificate_der_from_pem, private_key_der_from_pem};
pub use hash::{digest, sha256, sha384, sha512};
pub use keys::SigningKey;
pub use random::generate_reference_id;
pub use signature::{public_key_from_certificate, verify, SignatureError};
