//! Command-line rendering and verification against fixture files.

use std::path::PathBuf;

use samlidp_cli::cli::{MetadataArgs, VerifyArgs};
use samlidp_cli::commands::{render_metadata, run_metadata, verify_document};
use samlidp_cli::error::CliError;

use crate::common::{fixture_path, parse};

const CONFIG: &str = r#"
base_saml_location = "https://idp.example.com/saml"
algorithm = "rsa-sha256"
single_service_post_location = "https://idp.example.com/saml/auth"
single_logout_service_redirect_location = "https://idp.example.com/saml/logout"
name_id_formats = ["email_address", "persistent"]

[technical_contact]
company = "Example"
email_address = "ops@example.com"

[[attributes]]
key = "email"
name = "urn:oid:0.9.2342.19200300.100.1.3"
"#;

fn metadata_args(dir: &tempfile::TempDir) -> anyhow::Result<MetadataArgs> {
    let config = dir.path().join("idp.toml");
    std::fs::write(&config, CONFIG)?;
    Ok(MetadataArgs {
        config,
        key: fixture_path("idp_key.pem"),
        certificate: Some(fixture_path("idp_cert.pem")),
        output: None,
        verify: true,
    })
}

/// Tests rendering from a TOML file with the certificate supplied separately.
#[test]
fn test_render_metadata_from_files() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let xml = render_metadata(&metadata_args(&dir)?)?;

    let root = parse(&xml)?;
    assert_eq!(root.attr("entityID"), Some("https://idp.example.com/saml"));
    let descriptor = root
        .child("IDPSSODescriptor")
        .ok_or_else(|| anyhow::anyhow!("descriptor missing"))?;
    assert_eq!(
        descriptor.child_names(),
        [
            "KeyDescriptor",
            "NameIDFormat",
            "NameIDFormat",
            "SingleSignOnService",
            "SingleLogoutService",
            "Attribute",
        ]
    );
    assert_eq!(
        root.path(&["ContactPerson", "EmailAddress"])
            .map(|e| e.text.as_str()),
        Some("mailto:ops@example.com")
    );
    Ok(())
}

/// Tests writing a document and verifying it from disk.
#[test]
fn test_written_document_verifies() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let output = dir.path().join("metadata.xml");
    let args = MetadataArgs {
        output: Some(output.clone()),
        ..metadata_args(&dir)?
    };
    run_metadata(&args)?;

    let pinned = verify_document(&VerifyArgs {
        document: output.clone(),
        certificates: vec![fixture_path("idp_cert.pem")],
    })?;
    let embedded = verify_document(&VerifyArgs {
        document: output,
        certificates: Vec::new(),
    })?;
    assert_eq!(pinned.reference_uri, embedded.reference_uri);
    Ok(())
}

/// Tests that a missing configuration file is reported as such.
#[test]
fn test_missing_configuration_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let args = MetadataArgs {
        config: dir.path().join("absent.toml"),
        ..metadata_args(&dir)?
    };

    let err = render_metadata(&args).expect_err("missing config must fail");
    assert!(
        matches!(&err, CliError::Saml(e) if e.is_configuration()),
        "unexpected error: {err}"
    );
    Ok(())
}

/// Tests that a missing document is reported before any validation.
#[test]
fn test_missing_document() {
    let err = verify_document(&VerifyArgs {
        document: PathBuf::from("/nonexistent/metadata.xml"),
        certificates: Vec::new(),
    })
    .expect_err("missing document must fail");
    assert!(matches!(err, CliError::Config(_)), "unexpected error: {err}");
}
