//! Common test utilities and fixtures.

use std::path::PathBuf;
use std::sync::Arc;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use samlidp_metadata::{
    MetadataBuilder, MetadataConfiguration, SignatureAlgorithm, SignatureConfig, XmlSigner,
};

/// Base location used by the test IdP.
pub const BASE_LOCATION: &str = "https://idp.example.com/saml";

/// Installs a test subscriber once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("samlidp_metadata=debug")
        .with_test_writer()
        .try_init();
}

/// Path of a file under `fixtures/`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name)
}

/// Contents of a file under `fixtures/`.
pub fn fixture(name: &str) -> anyhow::Result<String> {
    Ok(std::fs::read_to_string(fixture_path(name))?)
}

/// Key and certificate PEM for an IdP.
pub struct KeyMaterial {
    /// Private key PEM.
    pub key_pem: String,
    /// Certificate PEM.
    pub certificate_pem: String,
}

/// The RSA fixture key and certificate.
pub fn rsa_material() -> anyhow::Result<KeyMaterial> {
    Ok(KeyMaterial {
        key_pem: fixture("idp_key.pem")?,
        certificate_pem: fixture("idp_cert.pem")?,
    })
}

/// A freshly generated P-256 key and self-signed certificate.
pub fn ecdsa_material() -> anyhow::Result<KeyMaterial> {
    let certified = rcgen::generate_simple_self_signed(vec!["idp.example.com".to_string()])?;
    Ok(KeyMaterial {
        key_pem: certified.key_pair.serialize_pem(),
        certificate_pem: certified.cert.pem(),
    })
}

/// A configuration with the given certificate and algorithm, nothing else.
pub fn base_config(material: &KeyMaterial, algorithm: SignatureAlgorithm) -> MetadataConfiguration {
    MetadataConfiguration::new(BASE_LOCATION)
        .with_certificate(material.certificate_pem.clone())
        .with_algorithm(algorithm)
}

/// A builder signing with `material`.
pub fn builder(
    config: MetadataConfiguration,
    material: &KeyMaterial,
) -> anyhow::Result<MetadataBuilder> {
    let signer = XmlSigner::from_pem(
        &material.key_pem,
        &material.certificate_pem,
        SignatureConfig::with_algorithm(config.algorithm),
    )?;
    Ok(MetadataBuilder::new(Arc::new(config), Arc::new(signer)))
}

/// A parsed XML element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Qualified name.
    pub name: String,
    /// Attributes in document order.
    pub attributes: Vec<(String, String)>,
    /// Child elements.
    pub children: Vec<Node>,
    /// Concatenated text content.
    pub text: String,
}

impl Node {
    fn from_start(start: &BytesStart<'_>) -> anyhow::Result<Self> {
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            attributes.push((
                String::from_utf8(attr.key.as_ref().to_vec())?,
                attr.unescape_value()?.into_owned(),
            ));
        }
        Ok(Self {
            name: String::from_utf8(start.name().as_ref().to_vec())?,
            attributes,
            children: Vec::new(),
            text: String::new(),
        })
    }

    /// Returns an attribute value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns the first child with the given name.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Returns all children with the given name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Returns the names of the children, in order.
    pub fn child_names(&self) -> Vec<&str> {
        self.children.iter().map(|child| child.name.as_str()).collect()
    }

    /// Follows a path of first-matching child names.
    pub fn path(&self, names: &[&str]) -> Option<&Node> {
        names.iter().try_fold(self, |node, name| node.child(name))
    }
}

/// Parses a document into its root element.
pub fn parse(xml: &str) -> anyhow::Result<Node> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Node> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(Node::from_start(&start)?),
            Event::Empty(start) => {
                let node = Node::from_start(&start)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => return Ok(node),
                }
            }
            Event::Text(text) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&text.unescape()?);
                }
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| anyhow::anyhow!("unbalanced end tag"))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => return Ok(node),
                }
            }
            Event::Eof => anyhow::bail!("document has no root element"),
            _ => {}
        }
    }
}

/// The document with its reference ID and signature removed, for comparing
/// the structure of independently built documents.
pub fn without_signature(mut root: Node) -> Node {
    root.attributes.retain(|(key, _)| key != "ID");
    root.children.retain(|child| child.name != "ds:Signature");
    root
}
