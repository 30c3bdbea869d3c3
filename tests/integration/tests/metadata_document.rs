//! Metadata document structure tests.
//!
//! The document layout is checked on the parsed tree so that attribute
//! quoting and whitespace do not matter.

use samlidp_metadata::{
    AttributeDeclaration, ContactInfo, NameIdFormats, SignatureAlgorithm, METADATA_NS, SAMLP_NS,
    XMLDSIG_NS,
};

use crate::common::{
    base_config, builder, ecdsa_material, init_tracing, parse, rsa_material, without_signature,
    BASE_LOCATION,
};

const POST: &str = "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST";
const REDIRECT: &str = "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect";

/// Tests the root element, its namespaces, and the child order.
#[test]
fn test_root_element_layout() -> anyhow::Result<()> {
    init_tracing();
    let material = rsa_material()?;
    let xml = builder(base_config(&material, SignatureAlgorithm::RsaSha256), &material)?.build()?;

    assert!(
        xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"),
        "document should start with an XML declaration"
    );

    let root = parse(&xml)?;
    assert_eq!(root.name, "EntityDescriptor");
    assert_eq!(root.attr("xmlns"), Some(METADATA_NS));
    assert_eq!(root.attr("xmlns:md"), Some(METADATA_NS));
    assert_eq!(root.attr("xmlns:ds"), Some(XMLDSIG_NS));
    assert_eq!(root.attr("entityID"), Some(BASE_LOCATION));

    let id = root.attr("ID").unwrap_or_default();
    assert!(id.starts_with('_') && id.len() > 1, "unexpected ID {id:?}");

    assert_eq!(
        root.child_names(),
        ["ds:Signature", "IDPSSODescriptor", "ContactPerson"],
        "signature must be the first child of the root"
    );
    Ok(())
}

/// Tests the descriptor for a configuration with only a certificate.
#[test]
fn test_minimal_descriptor() -> anyhow::Result<()> {
    let material = rsa_material()?;
    let config = base_config(&material, SignatureAlgorithm::RsaSha256);
    let payload = config.certificate_payload();
    let root = parse(&builder(config, &material)?.build()?)?;

    let descriptor = root
        .child("IDPSSODescriptor")
        .ok_or_else(|| anyhow::anyhow!("descriptor missing"))?;
    assert_eq!(descriptor.attr("protocolSupportEnumeration"), Some(SAMLP_NS));
    assert_eq!(descriptor.attr("WantAuthnRequestsSigned"), Some("false"));
    assert_eq!(descriptor.child_names(), ["KeyDescriptor"]);

    let key_descriptor = descriptor.path(&["KeyDescriptor"]).unwrap();
    assert_eq!(key_descriptor.attr("use"), Some("signing"));
    let key_info = key_descriptor.path(&["KeyInfo"]).unwrap();
    assert_eq!(key_info.attr("xmlns"), Some(XMLDSIG_NS));

    let certificate = key_info.path(&["X509Data", "X509Certificate"]).unwrap();
    assert_eq!(certificate.text, payload);
    assert!(!certificate.text.contains('\n') && !certificate.text.contains("BEGIN"));

    let contact = root.child("ContactPerson").unwrap();
    assert_eq!(contact.attr("contactType"), Some("technical"));
    assert!(contact.children.is_empty(), "empty contact should have no children");
    Ok(())
}

/// Tests that the certificate element is published even with no certificate.
#[test]
fn test_empty_certificate_still_published() -> anyhow::Result<()> {
    let material = rsa_material()?;
    let config = base_config(&material, SignatureAlgorithm::RsaSha256).with_certificate("");
    let xml = builder(config, &material)?.build()?;

    let certificate = parse(&xml)?
        .path(&[
            "IDPSSODescriptor",
            "KeyDescriptor",
            "KeyInfo",
            "X509Data",
            "X509Certificate",
        ])
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("X509Certificate missing"))?;
    assert!(certificate.text.is_empty());
    Ok(())
}

/// Tests WantAuthnRequestsSigned and the explicit entity ID.
#[test]
fn test_signed_requests_and_entity_id() -> anyhow::Result<()> {
    let material = ecdsa_material()?;
    let config = base_config(&material, SignatureAlgorithm::EcdsaSha256)
        .with_signed_auth_requests(true)
        .with_entity_id("urn:example:idp");
    let root = parse(&builder(config, &material)?.build()?)?;

    assert_eq!(root.attr("entityID"), Some("urn:example:idp"));
    assert_eq!(
        root.child("IDPSSODescriptor")
            .and_then(|d| d.attr("WantAuthnRequestsSigned")),
        Some("true")
    );
    Ok(())
}

/// Tests single sign-on endpoints: POST then Redirect, only when set.
#[test]
fn test_single_sign_on_services() -> anyhow::Result<()> {
    let material = rsa_material()?;

    let both = base_config(&material, SignatureAlgorithm::RsaSha256)
        .with_sso_redirect_location("https://idp.example.com/saml/redirect")
        .with_sso_post_location("https://idp.example.com/saml/post");
    let root = parse(&builder(both, &material)?.build()?)?;
    let descriptor = root.child("IDPSSODescriptor").unwrap();
    let services: Vec<_> = descriptor
        .children_named("SingleSignOnService")
        .map(|s| (s.attr("Binding"), s.attr("Location")))
        .collect();
    assert_eq!(
        services,
        [
            (Some(POST), Some("https://idp.example.com/saml/post")),
            (Some(REDIRECT), Some("https://idp.example.com/saml/redirect")),
        ]
    );
    assert_eq!(descriptor.children_named("SingleLogoutService").count(), 0);

    let redirect_only = base_config(&material, SignatureAlgorithm::RsaSha256)
        .with_sso_redirect_location("https://idp.example.com/saml/redirect");
    let root = parse(&builder(redirect_only, &material)?.build()?)?;
    let bindings: Vec<_> = root
        .child("IDPSSODescriptor")
        .unwrap()
        .children_named("SingleSignOnService")
        .map(|s| s.attr("Binding"))
        .collect();
    assert_eq!(bindings, [Some(REDIRECT)]);
    Ok(())
}

/// Tests single logout endpoints independently of single sign-on.
#[test]
fn test_single_logout_services() -> anyhow::Result<()> {
    let material = rsa_material()?;

    let config = base_config(&material, SignatureAlgorithm::RsaSha256)
        .with_slo_post_location("https://idp.example.com/saml/logout")
        .with_slo_redirect_location(" ");
    let root = parse(&builder(config, &material)?.build()?)?;
    let descriptor = root.child("IDPSSODescriptor").unwrap();

    let logout: Vec<_> = descriptor
        .children_named("SingleLogoutService")
        .map(|s| (s.attr("Binding"), s.attr("Location")))
        .collect();
    assert_eq!(logout, [(Some(POST), Some("https://idp.example.com/saml/logout"))]);
    assert_eq!(descriptor.children_named("SingleSignOnService").count(), 0);
    Ok(())
}

/// Tests the full descriptor child order.
#[test]
fn test_descriptor_child_order() -> anyhow::Result<()> {
    let material = rsa_material()?;
    let config = base_config(&material, SignatureAlgorithm::RsaSha256)
        .with_name_id_formats(NameIdFormats::Versioned {
            v1_1: vec!["email_address".to_string()],
            v2_0: vec!["transient".to_string()],
        })
        .with_sso_post_location("https://idp.example.com/saml/auth")
        .with_slo_redirect_location("https://idp.example.com/saml/logout")
        .with_attribute(AttributeDeclaration::new("email").with_value("x@example.com"));
    let root = parse(&builder(config, &material)?.build()?)?;
    let descriptor = root.child("IDPSSODescriptor").unwrap();

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
    let formats: Vec<_> = descriptor
        .children_named("NameIDFormat")
        .map(|f| f.text.as_str())
        .collect();
    assert_eq!(
        formats,
        [
            "urn:oasis:names:tc:SAML:1.1:nameid-format:emailAddress",
            "urn:oasis:names:tc:SAML:2.0:nameid-format:transient",
        ]
    );
    Ok(())
}

/// Tests attribute decoration and values, including an empty value list.
#[test]
fn test_attributes() -> anyhow::Result<()> {
    let material = rsa_material()?;
    let config = base_config(&material, SignatureAlgorithm::RsaSha256)
        .with_attribute(
            AttributeDeclaration::new("emailAddress")
                .with_name("urn:oid:0.9.2342.19200300.100.1.3")
                .with_format("urn:oasis:names:tc:SAML:2.0:attrname-format:basic")
                .with_value("one@example.com")
                .with_value("two@example.com"),
        )
        .with_attribute(AttributeDeclaration::new("groups"));
    let root = parse(&builder(config, &material)?.build()?)?;
    let attributes: Vec<_> = root
        .child("IDPSSODescriptor")
        .unwrap()
        .children_named("Attribute")
        .cloned()
        .collect();
    assert_eq!(attributes.len(), 2);

    let email = &attributes[0];
    assert_eq!(
        email.attr("NameFormat"),
        Some("urn:oasis:names:tc:SAML:2.0:attrname-format:basic")
    );
    assert_eq!(email.attr("Name"), Some("urn:oid:0.9.2342.19200300.100.1.3"));
    assert_eq!(email.attr("FriendlyName"), Some("emailAddress"));
    let values: Vec<_> = email
        .children_named("AttributeValue")
        .map(|v| v.text.as_str())
        .collect();
    assert_eq!(values, ["one@example.com", "two@example.com"]);

    let groups = &attributes[1];
    assert_eq!(groups.attr("Name"), Some("groups"));
    assert_eq!(groups.attr("FriendlyName"), Some("groups"));
    assert!(groups.children.is_empty(), "no values means no AttributeValue");
    Ok(())
}

/// Tests that every contact field is published in order when present.
#[test]
fn test_contact_all_fields() -> anyhow::Result<()> {
    let material = rsa_material()?;
    let contact = ContactInfo::new()
        .with_company("Acme Inc")
        .with_given_name("Wile")
        .with_sur_name("Coyote")
        .with_email_address("wile@example.com")
        .with_telephone("1-800-555-5555");
    let config = base_config(&material, SignatureAlgorithm::RsaSha256).with_technical_contact(contact);
    let root = parse(&builder(config, &material)?.build()?)?;

    let contact = root.child("ContactPerson").unwrap();
    let fields: Vec<_> = contact
        .children
        .iter()
        .map(|c| (c.name.as_str(), c.text.as_str()))
        .collect();
    assert_eq!(
        fields,
        [
            ("Company", "Acme Inc"),
            ("GivenName", "Wile"),
            ("SurName", "Coyote"),
            ("EmailAddress", "mailto:wile@example.com"),
            ("TelephoneNumber", "1-800-555-5555"),
        ]
    );
    Ok(())
}

/// Tests that blank contact fields are left out.
#[test]
fn test_contact_partial_fields() -> anyhow::Result<()> {
    let material = rsa_material()?;
    let contact = ContactInfo::new()
        .with_company("")
        .with_sur_name("Coyote")
        .with_email_address("  ");
    let config = base_config(&material, SignatureAlgorithm::RsaSha256).with_technical_contact(contact);
    let root = parse(&builder(config, &material)?.build()?)?;

    assert_eq!(root.child("ContactPerson").unwrap().child_names(), ["SurName"]);
    Ok(())
}

/// Tests a technical contact that only has an email address.
#[test]
fn test_contact_email_only() -> anyhow::Result<()> {
    let material = rsa_material()?;
    let contact = ContactInfo::new().with_email_address("acme@example.com");
    let config = base_config(&material, SignatureAlgorithm::RsaSha256).with_technical_contact(contact);
    let root = parse(&builder(config, &material)?.build()?)?;

    let contact = root
        .child("ContactPerson")
        .ok_or_else(|| anyhow::anyhow!("contact missing"))?;
    assert_eq!(contact.child_names(), ["EmailAddress"]);
    assert_eq!(
        contact.child("EmailAddress").map(|e| e.text.as_str()),
        Some("mailto:acme@example.com")
    );
    Ok(())
}

/// Tests that independent builds differ only in reference ID and signature.
#[test]
fn test_builds_are_structurally_equal() -> anyhow::Result<()> {
    let material = rsa_material()?;
    let config = base_config(&material, SignatureAlgorithm::RsaSha256)
        .with_sso_post_location("https://idp.example.com/saml/auth")
        .with_attribute(AttributeDeclaration::new("email"));
    let builder = builder(config, &material)?;

    let first = builder.build()?;
    let second = builder.build()?;
    let first_root = parse(&first)?;
    let second_root = parse(&second)?;

    assert_ne!(
        first_root.attr("ID"),
        second_root.attr("ID"),
        "each build needs a fresh reference ID"
    );
    assert_eq!(without_signature(first_root), without_signature(second_root));
    Ok(())
}
