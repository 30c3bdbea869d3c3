//! Identity provider metadata document assembly.
//!
//! [`MetadataBuilder`] renders the `EntityDescriptor` for the configured IdP
//! and hands it to a [`Signer`] for an enveloped signature over the root
//! element. Optional children are described as ordered tables and emitted
//! by the same rule: present and non-blank values only, in table order.

use std::sync::Arc;

use quick_xml::escape::escape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::{debug, warn};

use samlidp_crypto::generate_reference_id;

use crate::config::MetadataConfiguration;
use crate::error::{SamlError, SamlResult};
use crate::signature::Signer;
use crate::types::{
    non_blank, AttributeDecorator, ContactInfo, NameIdFormatter, SamlBinding, METADATA_NS,
    SAMLP_NS, XMLDSIG_NS,
};

type XmlWriter = Writer<Vec<u8>>;

/// Builds signed SAML 2.0 IdP metadata.
///
/// The builder holds no per-document state; every call reads the shared
/// configuration and produces a fresh document with a new reference ID.
#[derive(Clone)]
pub struct MetadataBuilder {
    configuration: Arc<MetadataConfiguration>,
    signer: Arc<dyn Signer>,
}

impl std::fmt::Debug for MetadataBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataBuilder")
            .field("entity_id", &self.configuration.resolved_entity_id())
            .finish_non_exhaustive()
    }
}

impl MetadataBuilder {
    /// Creates a builder over a shared configuration and signer.
    #[must_use]
    pub fn new(configuration: Arc<MetadataConfiguration>, signer: Arc<dyn Signer>) -> Self {
        Self {
            configuration,
            signer,
        }
    }

    /// Replaces the configuration used by this builder.
    #[must_use]
    pub fn with_configuration(mut self, configuration: Arc<MetadataConfiguration>) -> Self {
        self.configuration = configuration;
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn configuration(&self) -> &MetadataConfiguration {
        &self.configuration
    }

    /// Builds the signed metadata document.
    ///
    /// # Errors
    ///
    /// Propagates errors from the signer unchanged.
    pub fn build(&self) -> SamlResult<String> {
        self.build_with_reference_id(&generate_reference_id())
    }

    /// Alias for [`build`](Self::build).
    ///
    /// # Errors
    ///
    /// See [`build`](Self::build).
    pub fn signed(&self) -> SamlResult<String> {
        self.build()
    }

    /// Builds the signed metadata document with a caller-chosen reference ID.
    ///
    /// # Errors
    ///
    /// Propagates errors from the signer unchanged.
    pub fn build_with_reference_id(&self, reference_id: &str) -> SamlResult<String> {
        let unsigned = self.render(reference_id)?;
        self.signer.sign(&unsigned, reference_id)
    }

    /// Renders the document without a signature.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::XmlWrite`] if serialisation fails.
    pub fn unsigned(&self) -> SamlResult<String> {
        self.render(&generate_reference_id())
    }

    fn render(&self, reference_id: &str) -> SamlResult<String> {
        let config = &*self.configuration;
        let entity_id = config.resolved_entity_id();
        debug!(
            entity_id,
            reference_id,
            attributes = config.attributes.len(),
            "building IdP metadata"
        );

        let mut writer = Writer::new(Vec::new());
        emit(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
        )?;

        emit(
            &mut writer,
            Event::Start(tag(
                "EntityDescriptor",
                &[
                    ("ID", reference_id),
                    ("xmlns", METADATA_NS),
                    ("xmlns:md", METADATA_NS),
                    ("xmlns:ds", XMLDSIG_NS),
                    ("entityID", entity_id),
                ],
            )),
        )?;

        write_descriptor(&mut writer, config)?;
        write_contact(&mut writer, &config.technical_contact)?;

        emit(&mut writer, Event::End(BytesEnd::new("EntityDescriptor")))?;

        String::from_utf8(writer.into_inner()).map_err(|e| SamlError::XmlWrite(e.to_string()))
    }
}

fn write_descriptor(writer: &mut XmlWriter, config: &MetadataConfiguration) -> SamlResult<()> {
    let want_signed = if config.signed_auth_requests {
        "true"
    } else {
        "false"
    };
    emit(
        writer,
        Event::Start(tag(
            "IDPSSODescriptor",
            &[
                ("protocolSupportEnumeration", SAMLP_NS),
                ("WantAuthnRequestsSigned", want_signed),
            ],
        )),
    )?;

    write_key_descriptor(writer, config)?;

    for format in NameIdFormatter::new(&config.name_id_formats).all() {
        write_text_element(writer, "NameIDFormat", &format)?;
    }

    let endpoints = [
        (
            "SingleSignOnService",
            SamlBinding::HttpPost,
            &config.single_service_post_location,
        ),
        (
            "SingleSignOnService",
            SamlBinding::HttpRedirect,
            &config.single_service_redirect_location,
        ),
        (
            "SingleLogoutService",
            SamlBinding::HttpPost,
            &config.single_logout_service_post_location,
        ),
        (
            "SingleLogoutService",
            SamlBinding::HttpRedirect,
            &config.single_logout_service_redirect_location,
        ),
    ];
    for (element, binding, location) in endpoints {
        if let Some(location) = non_blank(location.as_deref()) {
            emit(
                writer,
                Event::Empty(tag(
                    element,
                    &[("Binding", binding.uri()), ("Location", location)],
                )),
            )?;
        }
    }

    for attribute in AttributeDecorator::decorate_all(&config.attributes) {
        emit(
            writer,
            Event::Start(tag(
                "Attribute",
                &[
                    ("NameFormat", attribute.name_format.as_str()),
                    ("Name", attribute.name.as_str()),
                    ("FriendlyName", attribute.friendly_name.as_str()),
                ],
            )),
        )?;
        for value in &attribute.values {
            write_text_element(writer, "AttributeValue", value)?;
        }
        emit(writer, Event::End(BytesEnd::new("Attribute")))?;
    }

    emit(writer, Event::End(BytesEnd::new("IDPSSODescriptor")))
}

fn write_key_descriptor(writer: &mut XmlWriter, config: &MetadataConfiguration) -> SamlResult<()> {
    let payload = config.certificate_payload();
    if payload.trim().is_empty() {
        warn!("no signing certificate configured; publishing an empty X509Certificate");
    }

    emit(
        writer,
        Event::Start(tag("KeyDescriptor", &[("use", "signing")])),
    )?;
    emit(writer, Event::Start(tag("KeyInfo", &[("xmlns", XMLDSIG_NS)])))?;
    emit(writer, Event::Start(BytesStart::new("X509Data")))?;
    write_text_element(writer, "X509Certificate", &payload)?;
    emit(writer, Event::End(BytesEnd::new("X509Data")))?;
    emit(writer, Event::End(BytesEnd::new("KeyInfo")))?;
    emit(writer, Event::End(BytesEnd::new("KeyDescriptor")))
}

fn write_contact(writer: &mut XmlWriter, contact: &ContactInfo) -> SamlResult<()> {
    let mail_to = contact.mail_to_string();
    let children = [
        ("Company", contact.company.as_deref()),
        ("GivenName", contact.given_name.as_deref()),
        ("SurName", contact.sur_name.as_deref()),
        ("EmailAddress", mail_to.as_deref()),
        ("TelephoneNumber", contact.telephone.as_deref()),
    ];

    emit(
        writer,
        Event::Start(tag("ContactPerson", &[("contactType", "technical")])),
    )?;
    for (element, value) in children {
        if let Some(value) = non_blank(value) {
            write_text_element(writer, element, value)?;
        }
    }
    emit(writer, Event::End(BytesEnd::new("ContactPerson")))
}

fn write_text_element(writer: &mut XmlWriter, name: &str, text: &str) -> SamlResult<()> {
    emit(writer, Event::Start(BytesStart::new(name)))?;
    emit(writer, Event::Text(BytesText::from_escaped(escape_value(text))))?;
    emit(writer, Event::End(BytesEnd::new(name)))
}

/// Start tag whose attribute values read back exactly as given.
fn tag<'a>(name: &'a str, attributes: &[(&str, &str)]) -> BytesStart<'a> {
    let mut start = BytesStart::new(name);
    for (key, value) in attributes {
        let value = escape_value(value);
        start.push_attribute(Attribute::from((key.as_bytes(), value.as_bytes())));
    }
    start
}

/// Escapes markup, plus the whitespace characters a parser would normalise.
fn escape_value(value: &str) -> String {
    escape(value)
        .replace('\t', "&#x9;")
        .replace('\n', "&#xA;")
        .replace('\r', "&#xD;")
}

fn emit<W: std::io::Write>(writer: &mut Writer<W>, event: Event<'_>) -> SamlResult<()> {
    writer
        .write_event(event)
        .map_err(|e| SamlError::XmlWrite(e.to_string()))
}
