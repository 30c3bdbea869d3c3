//! Exclusive XML canonicalization for enveloped signatures.
//!
//! Canonical bytes come from `xml_canonicalization`, which works on whole
//! documents. [`ElementIndex`] turns one element of a larger document into
//! such a document: the element's own bytes, minus at most one enveloped
//! descendant, with the namespace declarations it inherits and uses copied
//! onto its start tag.

use std::collections::BTreeSet;

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use xml_canonicalization::Canonicalizer;

use crate::error::{SamlError, SamlResult};

/// Canonicalizes a standalone XML document, without comments.
///
/// # Errors
///
/// Returns [`SamlError::XmlParse`] if the document is not well-formed.
pub fn canonicalize(xml: &str) -> SamlResult<String> {
    let mut output = Vec::new();
    Canonicalizer::read_from_str(xml)
        .write_to_writer(&mut output)
        .canonicalize(false)
        .map_err(|e| SamlError::XmlParse(format!("XML canonicalization failed: {e}")))?;
    String::from_utf8(output)
        .map_err(|e| SamlError::XmlParse(format!("canonical XML is not UTF-8: {e}")))
}

/// One element of an indexed document, located by byte offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Element {
    /// Index of the parent element; `None` for the document element.
    pub(crate) parent: Option<usize>,
    /// Offset of the `<` opening the start tag.
    pub(crate) start: usize,
    /// Offset just past the start tag.
    pub(crate) content: usize,
    /// Offset just past the end tag (or the `/>` of an empty element).
    pub(crate) end: usize,
    pub(crate) self_closing: bool,
    pub(crate) qname: String,
    pub(crate) namespace: String,
    pub(crate) local_name: String,
    /// Value of the `ID` (or `Id`) attribute.
    pub(crate) id: Option<String>,
    declarations: Vec<(String, String)>,
    prefixes: Vec<String>,
}

impl Element {
    pub(crate) fn is(&self, namespace: &str, local_name: &str) -> bool {
        self.namespace == namespace && self.local_name == local_name
    }

    fn declares(&self, prefix: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(declared, _)| declared == prefix)
            .map(|(_, uri)| uri.as_str())
    }
}

/// Every element of a document in document order.
#[derive(Debug, Clone)]
pub(crate) struct ElementIndex {
    elements: Vec<Element>,
}

impl ElementIndex {
    /// Indexes `xml`.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::XmlParse`] for malformed documents, documents
    /// carrying a DTD, and undeclared element prefixes.
    pub(crate) fn parse(xml: &str) -> SamlResult<Self> {
        let mut reader = Reader::from_str(xml);
        let mut elements: Vec<Element> = Vec::new();
        let mut open: Vec<usize> = Vec::new();

        loop {
            let before = offset(&reader)?;
            match reader.read_event()? {
                Event::Start(start) => {
                    let after = offset(&reader)?;
                    let parent = open.last().copied();
                    let element = read_element(&start, &elements, parent, before, after, false)?;
                    open.push(elements.len());
                    elements.push(element);
                }
                Event::Empty(start) => {
                    let after = offset(&reader)?;
                    let parent = open.last().copied();
                    let element = read_element(&start, &elements, parent, before, after, true)?;
                    elements.push(element);
                }
                Event::End(_) => {
                    let index = open
                        .pop()
                        .ok_or_else(|| SamlError::XmlParse("unexpected end tag".to_string()))?;
                    elements[index].end = offset(&reader)?;
                }
                Event::DocType(_) => {
                    return Err(SamlError::XmlParse(
                        "documents with a DTD are not accepted".to_string(),
                    ));
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !open.is_empty() {
            return Err(SamlError::XmlParse("unclosed element".to_string()));
        }
        if elements.is_empty() {
            return Err(SamlError::XmlParse(
                "document has no root element".to_string(),
            ));
        }
        Ok(Self { elements })
    }

    pub(crate) fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub(crate) fn root(&self) -> &Element {
        &self.elements[0]
    }

    /// Positions of every element with this expanded name.
    pub(crate) fn positions(&self, namespace: &str, local_name: &str) -> Vec<usize> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, element)| element.is(namespace, local_name))
            .map(|(index, _)| index)
            .collect()
    }

    /// Position of the first element whose `ID` is `id`.
    pub(crate) fn find_id(&self, id: &str) -> Option<usize> {
        self.elements
            .iter()
            .position(|element| element.id.as_deref() == Some(id))
    }

    /// The element at `index` as a standalone document.
    ///
    /// The subtree at `omit`, which must lie inside the element, is left
    /// out. Inherited namespace declarations are added for the prefixes the
    /// remaining elements and attributes use.
    pub(crate) fn standalone(
        &self,
        xml: &str,
        index: usize,
        omit: Option<usize>,
    ) -> SamlResult<String> {
        let element = &self.elements[index];
        let omitted = match omit {
            Some(position) => {
                let inner = &self.elements[position];
                if position <= index || inner.start < element.content || inner.end > element.end {
                    return Err(SamlError::XmlParse(
                        "omitted element lies outside the canonicalized element".to_string(),
                    ));
                }
                Some(inner)
            }
            None => None,
        };

        let used: BTreeSet<&str> = self
            .subtree(index)
            .filter(|inner| omitted.map_or(true, |o| inner.start < o.start || inner.start >= o.end))
            .flat_map(|inner| inner.prefixes.iter().map(String::as_str))
            .collect();

        let mut declarations = String::new();
        for prefix in used {
            if prefix == "xml" || element.declares(prefix).is_some() {
                continue;
            }
            let Some(uri) = self.resolve(element.parent, prefix) else {
                continue;
            };
            if prefix.is_empty() {
                if !uri.is_empty() {
                    declarations.push_str(&format!(" xmlns=\"{}\"", escape(uri)));
                }
            } else {
                declarations.push_str(&format!(" xmlns:{prefix}=\"{}\"", escape(uri)));
            }
        }

        let name_end = element.start + 1 + element.qname.len();
        let mut document =
            String::with_capacity(element.end - element.start + declarations.len());
        document.push_str(&xml[element.start..name_end]);
        document.push_str(&declarations);
        match omitted {
            Some(inner) => {
                document.push_str(&xml[name_end..inner.start]);
                document.push_str(&xml[inner.end..element.end]);
            }
            None => document.push_str(&xml[name_end..element.end]),
        }
        Ok(document)
    }

    /// The element at `index` and its descendants.
    fn subtree(&self, index: usize) -> impl Iterator<Item = &Element> {
        let end = self.elements[index].end;
        self.elements[index..]
            .iter()
            .take_while(move |element| element.start < end)
    }

    /// Namespace bound to `prefix` at `from` or one of its ancestors.
    fn resolve(&self, from: Option<usize>, prefix: &str) -> Option<&str> {
        let mut from = from;
        while let Some(index) = from {
            let element = &self.elements[index];
            if let Some(uri) = element.declares(prefix) {
                return Some(uri);
            }
            from = element.parent;
        }
        None
    }
}

fn read_element(
    start: &BytesStart<'_>,
    elements: &[Element],
    parent: Option<usize>,
    offset: usize,
    content: usize,
    self_closing: bool,
) -> SamlResult<Element> {
    let qname = utf8(start.name().into_inner())?.to_string();
    let mut declarations = Vec::new();
    let mut prefixes = vec![prefix_of(&qname).to_string()];
    let mut id = None;

    for attr in start.attributes() {
        let attr = attr?;
        let key = utf8(attr.key.as_ref())?;
        let value = attr.unescape_value()?;
        if key == "xmlns" {
            declarations.push((String::new(), value.into_owned()));
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            declarations.push((prefix.to_string(), value.into_owned()));
        } else {
            if let Some((prefix, _)) = key.split_once(':') {
                prefixes.push(prefix.to_string());
            }
            if matches!(key, "ID" | "Id") && id.is_none() {
                id = Some(value.into_owned());
            }
        }
    }

    let prefix = prefix_of(&qname);
    let own = declarations
        .iter()
        .find(|(declared, _)| declared == prefix)
        .map(|(_, uri)| uri.clone());
    let namespace = match own.or_else(|| inherited(elements, parent, prefix)) {
        Some(uri) => uri,
        None if prefix.is_empty() => String::new(),
        None => {
            return Err(SamlError::XmlParse(format!(
                "undeclared namespace prefix '{prefix}'"
            )));
        }
    };
    let local_name = qname.rsplit(':').next().unwrap_or_default().to_string();

    Ok(Element {
        parent,
        start: offset,
        content,
        end: if self_closing { content } else { 0 },
        self_closing,
        qname,
        namespace,
        local_name,
        id,
        declarations,
        prefixes,
    })
}

fn inherited(elements: &[Element], from: Option<usize>, prefix: &str) -> Option<String> {
    let mut from = from;
    while let Some(index) = from {
        if let Some(uri) = elements[index].declares(prefix) {
            return Some(uri.to_string());
        }
        from = elements[index].parent;
    }
    None
}

fn prefix_of(qname: &str) -> &str {
    qname.split_once(':').map_or("", |(prefix, _)| prefix)
}

fn offset(reader: &Reader<&[u8]>) -> SamlResult<usize> {
    usize::try_from(reader.buffer_position()).map_err(|e| SamlError::XmlParse(e.to_string()))
}

fn utf8(bytes: &[u8]) -> SamlResult<&str> {
    std::str::from_utf8(bytes).map_err(|e| SamlError::XmlParse(e.to_string()))
}
