//! XML Signature creation.
//!
//! Produces enveloped signatures: the `<ds:Signature>` becomes the first
//! child of the signed element and references it by `ID`.

use base64::Engine;
use quick_xml::escape::escape;

use samlidp_crypto::{certificate_der_from_pem, public_key_from_certificate, SigningKey};

use crate::error::{SamlError, SamlResult};
use crate::types::{canonicalization_algorithms, ENVELOPED_SIGNATURE_TRANSFORM, XMLDSIG_NS};

use super::c14n::{self, Element, ElementIndex};
use super::{SignatureConfig, Signer};

/// XML document signer.
///
/// Signs documents with a private key whose public half is certified by the
/// configured X.509 certificate.
pub struct XmlSigner {
    key: SigningKey,
    /// The X.509 certificate in DER format.
    certificate_der: Vec<u8>,
    config: SignatureConfig,
}

impl std::fmt::Debug for XmlSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlSigner")
            .field("algorithm", &self.config.algorithm)
            .field("include_certificate", &self.config.include_certificate)
            .finish_non_exhaustive()
    }
}

impl XmlSigner {
    /// Creates a signer from a loaded key and a DER certificate.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::Configuration`] if the key was loaded for a
    /// different algorithm or does not match the certificate.
    pub fn new(key: SigningKey, certificate_der: Vec<u8>, config: SignatureConfig) -> SamlResult<Self> {
        let expected = config.algorithm.signing_algorithm()?;
        if key.algorithm() != expected {
            return Err(SamlError::Configuration(format!(
                "signing key is for {:?}, configuration requires {:?}",
                key.algorithm(),
                config.algorithm
            )));
        }

        let certified = public_key_from_certificate(&certificate_der)
            .map_err(|e| SamlError::Configuration(e.to_string()))?;
        if certified != key.public_key() {
            return Err(SamlError::Configuration(
                "certificate does not certify the signing key".to_string(),
            ));
        }

        Ok(Self {
            key,
            certificate_der,
            config,
        })
    }

    /// Creates a new signer from PEM-encoded key and certificate.
    ///
    /// The key may be PKCS#8 (`PRIVATE KEY`) or, for RSA, PKCS#1
    /// (`RSA PRIVATE KEY`).
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::SignatureCreation`] for SHA-1 and
    /// [`SamlError::Configuration`] if the key or certificate is unusable.
    pub fn from_pem(
        private_key_pem: &str,
        certificate_pem: &str,
        config: SignatureConfig,
    ) -> SamlResult<Self> {
        let algorithm = config.algorithm.signing_algorithm()?;

        let key = SigningKey::from_pem(private_key_pem, algorithm)
            .map_err(|e| SamlError::Configuration(format!("signing key: {e}")))?;
        let certificate_der = certificate_der_from_pem(certificate_pem)
            .map_err(|e| SamlError::Configuration(format!("signing certificate: {e}")))?;

        Self::new(key, certificate_der, config)
    }

    fn signature_element(&self, canonical_signed_info: &str, signature_b64: &str) -> String {
        let mut signature = format!(
            r#"<ds:Signature xmlns:ds="{XMLDSIG_NS}">{canonical_signed_info}<ds:SignatureValue>{signature_b64}</ds:SignatureValue>"#
        );

        if self.config.include_certificate {
            let cert_b64 = base64::engine::general_purpose::STANDARD.encode(&self.certificate_der);
            signature.push_str(&format!(
                "<ds:KeyInfo><ds:X509Data><ds:X509Certificate>{cert_b64}</ds:X509Certificate></ds:X509Data></ds:KeyInfo>"
            ));
        }

        signature.push_str("</ds:Signature>");
        signature
    }
}

impl Signer for XmlSigner {
    fn sign(&self, xml: &str, reference_id: &str) -> SamlResult<String> {
        let index = ElementIndex::parse(xml)?;
        let target = index.find_id(reference_id).ok_or_else(|| {
            SamlError::SignatureCreation(format!("element with ID '{reference_id}' not found"))
        })?;

        let canonical = c14n::canonicalize(&index.standalone(xml, target, None)?)?;
        let digest = samlidp_crypto::digest(self.key.algorithm().digest(), canonical.as_bytes());
        let digest_b64 = base64::engine::general_purpose::STANDARD.encode(digest);

        let signed_info = build_signed_info(reference_id, &digest_b64, &self.config);
        let canonical_signed_info = c14n::canonicalize(&signed_info)?;

        let signature_value = self
            .key
            .sign(canonical_signed_info.as_bytes())
            .map_err(|e| SamlError::SignatureCreation(e.to_string()))?;
        let signature_b64 = base64::engine::general_purpose::STANDARD.encode(signature_value);

        let element = self.signature_element(&canonical_signed_info, &signature_b64);

        tracing::debug!(
            reference_id,
            algorithm = ?self.config.algorithm,
            "signed XML element"
        );

        Ok(insert(xml, &index.elements()[target], &element))
    }
}

/// Places `signature` as the first child of `target`.
fn insert(xml: &str, target: &Element, signature: &str) -> String {
    if target.self_closing {
        // `/>` becomes `>` + signature + end tag
        let close = target.end - 2;
        format!(
            "{}>{}</{}>{}",
            &xml[..close],
            signature,
            target.qname,
            &xml[target.end..]
        )
    } else {
        format!(
            "{}{}{}",
            &xml[..target.content],
            signature,
            &xml[target.content..]
        )
    }
}

/// Builds a standalone `SignedInfo` element.
fn build_signed_info(reference_id: &str, digest_b64: &str, config: &SignatureConfig) -> String {
    let exc_c14n = canonicalization_algorithms::EXCLUSIVE_C14N;
    format!(
        concat!(
            r#"<ds:SignedInfo xmlns:ds="{ns}">"#,
            r#"<ds:CanonicalizationMethod Algorithm="{c14n}"/>"#,
            r#"<ds:SignatureMethod Algorithm="{sig}"/>"#,
            r##"<ds:Reference URI="#{id}">"##,
            r#"<ds:Transforms>"#,
            r#"<ds:Transform Algorithm="{enveloped}"/>"#,
            r#"<ds:Transform Algorithm="{c14n}"/>"#,
            r#"</ds:Transforms>"#,
            r#"<ds:DigestMethod Algorithm="{digest}"/>"#,
            r#"<ds:DigestValue>{value}</ds:DigestValue>"#,
            r#"</ds:Reference>"#,
            r#"</ds:SignedInfo>"#,
        ),
        ns = XMLDSIG_NS,
        c14n = exc_c14n,
        sig = config.algorithm.uri(),
        id = escape(reference_id),
        enveloped = ENVELOPED_SIGNATURE_TRANSFORM,
        digest = config.algorithm.digest_uri(),
        value = digest_b64,
    )
}
