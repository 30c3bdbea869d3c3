//! XML Signature validation.
//!
//! Provides functionality for validating enveloped signatures on metadata
//! documents.

use base64::Engine;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use samlidp_crypto::{certificate_der_from_pem, public_key_from_certificate};

use crate::error::{SamlError, SamlResult};
use crate::types::{canonicalization_algorithms, ENVELOPED_SIGNATURE_TRANSFORM, XMLDSIG_NS};

use super::c14n::{self, ElementIndex};
use super::{SignatureAlgorithm, XmlSignature};

/// XML signature validator.
///
/// Validates signatures on documents using configured trusted certificates.
/// With no trusted certificates the certificate embedded in the signature is
/// used, which proves integrity but not origin.
#[derive(Debug, Clone, Default)]
pub struct XmlSignatureValidator {
    /// Trusted certificates for signature validation (DER format).
    trusted_certificates: Vec<Vec<u8>>,
}

impl XmlSignatureValidator {
    /// Creates a new validator with the given trusted certificates.
    #[must_use]
    pub fn new(trusted_certificates: Vec<Vec<u8>>) -> Self {
        Self {
            trusted_certificates,
        }
    }

    /// Creates a validator from PEM-encoded certificates.
    ///
    /// # Errors
    ///
    /// Returns an error if any certificate is not valid PEM.
    pub fn from_pem(certificates_pem: &[&str]) -> SamlResult<Self> {
        let certs = certificates_pem
            .iter()
            .map(|pem| {
                certificate_der_from_pem(pem)
                    .map_err(|e| SamlError::Configuration(format!("trusted certificate: {e}")))
            })
            .collect::<SamlResult<Vec<_>>>()?;
        Ok(Self::new(certs))
    }

    /// Validates the enveloped signature of a document.
    ///
    /// The document must hold exactly one `ds:Signature`, a direct child
    /// of the document element that references it by `ID`, whose first
    /// child is the document's only `ds:SignedInfo`.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::SignatureInvalid`] if the signature is missing,
    /// malformed, or does not verify.
    pub fn validate(&self, xml: &str) -> SamlResult<XmlSignature> {
        let index = ElementIndex::parse(xml)?;
        let located = locate(&index)?;
        let signature = read_signature(xml, &index, &located)?;

        if signature.algorithm.is_deprecated() {
            return Err(SamlError::SignatureInvalid(
                "SHA-1 signatures are not allowed".to_string(),
            ));
        }

        self.verify_digest(xml, &index, &located, &signature)?;

        let canonical_signed_info = index
            .standalone(xml, located.signed_info, None)
            .and_then(|signed_info| c14n::canonicalize(&signed_info))
            .map_err(|e| SamlError::SignatureInvalid(e.to_string()))?;
        let signature_bytes = decode(&signature.signature_value, "signature")?;

        for cert_der in self.candidate_certificates(&signature)? {
            if verify_with_certificate(
                canonical_signed_info.as_bytes(),
                &signature_bytes,
                &cert_der,
                signature.algorithm,
            )
            .is_ok()
            {
                tracing::debug!(reference = %signature.reference_uri, "signature verified");
                return Ok(signature);
            }
        }

        Err(SamlError::SignatureInvalid(
            "signature verification failed".to_string(),
        ))
    }

    /// Certificates to try, in order.
    fn candidate_certificates(&self, signature: &XmlSignature) -> SamlResult<Vec<Vec<u8>>> {
        let embedded = signature
            .x509_certificate
            .as_deref()
            .map(|cert_b64| decode(cert_b64, "certificate"))
            .transpose()?;

        if self.trusted_certificates.is_empty() {
            return embedded.map(|cert| vec![cert]).ok_or_else(|| {
                SamlError::SignatureInvalid("no certificate available".to_string())
            });
        }

        // An embedded certificate only narrows the search when it is trusted
        match embedded {
            Some(cert) if self.trusted_certificates.contains(&cert) => Ok(vec![cert]),
            _ => Ok(self.trusted_certificates.clone()),
        }
    }

    fn verify_digest(
        &self,
        xml: &str,
        index: &ElementIndex,
        located: &Located,
        signature: &XmlSignature,
    ) -> SamlResult<()> {
        let algorithm = signature
            .algorithm
            .signing_algorithm()
            .map_err(|e| SamlError::SignatureInvalid(e.to_string()))?;

        // Enveloped transform: the located signature and nothing else
        let canonical = index
            .standalone(xml, 0, Some(located.signature))
            .and_then(|document| c14n::canonicalize(&document))
            .map_err(|e| SamlError::SignatureInvalid(e.to_string()))?;
        let calculated = samlidp_crypto::digest(algorithm.digest(), canonical.as_bytes());

        if decode(&signature.digest_value, "digest")? != calculated {
            return Err(SamlError::SignatureInvalid(
                "digest value mismatch".to_string(),
            ));
        }
        Ok(())
    }
}

fn verify_with_certificate(
    data: &[u8],
    signature: &[u8],
    cert_der: &[u8],
    algorithm: SignatureAlgorithm,
) -> SamlResult<()> {
    let public_key = public_key_from_certificate(cert_der)?;
    let algorithm = algorithm.signing_algorithm()?;
    samlidp_crypto::verify(algorithm, &public_key, data, signature)?;
    Ok(())
}

fn decode(value: &str, what: &str) -> SamlResult<Vec<u8>> {
    base64::engine::general_purpose::STANDARD
        .decode(value)
        .map_err(|e| SamlError::SignatureInvalid(format!("invalid {what} encoding: {e}")))
}

fn invalid(message: &str) -> SamlError {
    SamlError::SignatureInvalid(message.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextField {
    DigestValue,
    SignatureValue,
    Certificate,
}

/// Pieces of the enveloped `ds:Signature` collected while reading.
#[derive(Debug, Default)]
struct SignatureParts {
    root_id: Option<String>,
    canonicalization: Option<String>,
    signature_method: Option<String>,
    reference_uri: Option<String>,
    references: usize,
    transforms: Vec<String>,
    digest_method: Option<String>,
    digest_value: String,
    signature_value: String,
    certificate: Option<String>,
}

impl SignatureParts {
    fn start(&mut self, element: &BytesStart<'_>) -> SamlResult<Option<TextField>> {
        let algorithm = || -> SamlResult<Option<String>> {
            Ok(element
                .try_get_attribute("Algorithm")?
                .map(|a| a.unescape_value().map(|v| v.into_owned()))
                .transpose()?)
        };

        let field = match element.local_name().as_ref() {
            b"CanonicalizationMethod" => {
                self.canonicalization = algorithm()?;
                None
            }
            b"SignatureMethod" => {
                self.signature_method = algorithm()?;
                None
            }
            b"Reference" => {
                self.references += 1;
                self.reference_uri = element
                    .try_get_attribute("URI")?
                    .map(|a| a.unescape_value().map(|v| v.into_owned()))
                    .transpose()?;
                None
            }
            b"Transform" => {
                self.transforms.extend(algorithm()?);
                None
            }
            b"DigestMethod" => {
                self.digest_method = algorithm()?;
                None
            }
            b"DigestValue" => Some(TextField::DigestValue),
            b"SignatureValue" => Some(TextField::SignatureValue),
            b"X509Certificate" if self.certificate.is_none() => {
                self.certificate = Some(String::new());
                Some(TextField::Certificate)
            }
            _ => None,
        };
        Ok(field)
    }

    fn text(&mut self, field: TextField, text: &str) {
        let target = match field {
            TextField::DigestValue => &mut self.digest_value,
            TextField::SignatureValue => &mut self.signature_value,
            TextField::Certificate => match self.certificate.as_mut() {
                Some(certificate) => certificate,
                None => return,
            },
        };
        target.extend(text.chars().filter(|c| !c.is_whitespace()));
    }

    fn into_signature(self) -> SamlResult<XmlSignature> {
        let algorithm = self
            .signature_method
            .as_deref()
            .and_then(SignatureAlgorithm::from_uri)
            .ok_or_else(|| invalid("unsupported signature method"))?;

        if self.canonicalization.as_deref() != Some(canonicalization_algorithms::EXCLUSIVE_C14N) {
            return Err(invalid("unsupported canonicalization method"));
        }
        if self.references != 1 {
            return Err(invalid("exactly one Reference is required"));
        }
        if self.transforms.iter().any(|t| {
            t != ENVELOPED_SIGNATURE_TRANSFORM && t != canonicalization_algorithms::EXCLUSIVE_C14N
        }) {
            return Err(invalid("unsupported transform"));
        }
        if self.digest_method.as_deref() != Some(algorithm.digest_uri()) {
            return Err(invalid("digest method does not match signature method"));
        }

        let reference_uri = self
            .reference_uri
            .ok_or_else(|| invalid("Reference has no URI"))?;
        let root_id = self
            .root_id
            .ok_or_else(|| invalid("document element has no ID"))?;
        if reference_uri.strip_prefix('#') != Some(root_id.as_str()) {
            return Err(invalid("signature does not reference the document element"));
        }

        if self.digest_value.is_empty() {
            return Err(invalid("no DigestValue found"));
        }
        if self.signature_value.is_empty() {
            return Err(invalid("no SignatureValue found"));
        }

        Ok(XmlSignature {
            algorithm,
            reference_uri,
            digest_value: self.digest_value,
            signature_value: self.signature_value,
            x509_certificate: self.certificate.filter(|c| !c.is_empty()),
        })
    }
}

/// Positions of the signature being validated within an [`ElementIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Located {
    signature: usize,
    signed_info: usize,
}

/// Finds the single enveloped signature and its `SignedInfo` by position.
fn locate(index: &ElementIndex) -> SamlResult<Located> {
    let signature = match index.positions(XMLDSIG_NS, "Signature").as_slice() {
        [] => return Err(invalid("no enveloped Signature element found")),
        [signature] => *signature,
        _ => return Err(invalid("document contains more than one Signature")),
    };
    if index.positions(XMLDSIG_NS, "SignedInfo").len() != 1 {
        return Err(invalid("document must contain exactly one SignedInfo"));
    }
    if index.elements()[signature].parent != Some(0) {
        return Err(invalid("Signature is not a child of the document element"));
    }

    let signed_info = signature + 1;
    match index.elements().get(signed_info) {
        Some(element)
            if element.parent == Some(signature) && element.is(XMLDSIG_NS, "SignedInfo") =>
        {
            Ok(Located {
                signature,
                signed_info,
            })
        }
        _ => Err(invalid("SignedInfo must be the first child of Signature")),
    }
}

/// Reads the located `ds:Signature`.
fn read_signature(xml: &str, index: &ElementIndex, located: &Located) -> SamlResult<XmlSignature> {
    let element = &index.elements()[located.signature];
    let mut reader = Reader::from_str(&xml[element.start..element.end]);
    let mut parts = SignatureParts {
        root_id: index.root().id.clone(),
        ..SignatureParts::default()
    };
    let mut field = None;

    loop {
        match reader.read_event()? {
            Event::Start(element) => field = parts.start(&element)?,
            Event::Empty(element) => {
                parts.start(&element)?;
            }
            Event::Text(text) => {
                if let Some(field) = field {
                    parts.text(field, &text.unescape()?);
                }
            }
            Event::End(_) => field = None,
            Event::Eof => break,
            _ => {}
        }
    }

    parts.into_signature()
}
