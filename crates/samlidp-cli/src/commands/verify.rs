//! Signature verification command.

use samlidp_metadata::{XmlSignature, XmlSignatureValidator};

use super::read_file;
use crate::cli::VerifyArgs;
use crate::output::{success, warning};

/// Runs the verify command.
pub fn run_verify(args: &VerifyArgs) -> crate::CliResult<()> {
    let signature = verify_document(args)?;
    success(&format!(
        "{}: signature over {} is valid ({:?})",
        args.document.display(),
        signature.reference_uri,
        signature.algorithm
    ));
    Ok(())
}

/// Validates the document named in `args`.
pub fn verify_document(args: &VerifyArgs) -> crate::CliResult<XmlSignature> {
    let document = read_file(&args.document, "document")?;

    let certificates = args
        .certificates
        .iter()
        .map(|path| read_file(path, "certificate"))
        .collect::<crate::CliResult<Vec<_>>>()?;
    if certificates.is_empty() {
        warning("no trusted certificate given; checking against the embedded certificate");
    }

    let pems: Vec<&str> = certificates.iter().map(String::as_str).collect();
    let validator = XmlSignatureValidator::from_pem(&pems)?;
    Ok(validator.validate(&document)?)
}
