//! Metadata rendering command.

use std::sync::Arc;

use samlidp_metadata::{
    MetadataBuilder, MetadataConfiguration, SignatureConfig, XmlSignatureValidator, XmlSigner,
};

use super::read_file;
use crate::cli::MetadataArgs;
use crate::output::{success, write_document};

/// Runs the metadata command.
pub fn run_metadata(args: &MetadataArgs) -> crate::CliResult<()> {
    let document = render_metadata(args)?;
    write_document(&document, args.output.as_deref())
}

/// Loads configuration and key, then builds the signed document.
pub fn render_metadata(args: &MetadataArgs) -> crate::CliResult<String> {
    let mut config = MetadataConfiguration::load(&args.config)?;
    if let Some(path) = &args.certificate {
        config.x509_certificate = read_file(path, "certificate")?;
    }

    let key_pem = read_file(&args.key, "signing key")?;
    let signer = XmlSigner::from_pem(
        &key_pem,
        &config.x509_certificate,
        SignatureConfig::with_algorithm(config.algorithm),
    )?;

    let certificate_pem = config.x509_certificate.clone();
    let builder = MetadataBuilder::new(Arc::new(config), Arc::new(signer));
    let document = builder.build()?;
    tracing::info!(
        entity_id = builder.configuration().resolved_entity_id(),
        algorithm = ?builder.configuration().algorithm,
        "rendered IdP metadata"
    );

    if args.verify {
        let validator = XmlSignatureValidator::from_pem(&[certificate_pem.as_str()])?;
        let signature = validator.validate(&document)?;
        success(&format!(
            "signature over {} verified ({:?})",
            signature.reference_uri, signature.algorithm
        ));
    }

    Ok(document)
}
