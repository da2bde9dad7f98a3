//! Minimal XML tree for the markup handlers
//!
//! The XML-family handlers only need element names, attributes, text and
//! start lines, so documents are read with quick-xml into a small owned
//! tree instead of a full DOM.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Unbalanced element nesting")]
    Unbalanced,

    #[error("Document has no root element")]
    Empty,
}

/// One element with its attributes and direct text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    /// Local name, without namespace prefix
    pub name: String,
    /// Attributes keyed by qualified name (`x:Name`, `Include`)
    pub attributes: Vec<(String, String)>,
    /// Concatenated text content of this element (children excluded)
    pub text: String,
    /// 1-based line of the opening `<`
    pub line: u32,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    /// Value of the attribute with this qualified name
    #[must_use]
    pub fn attribute(&self, qualified: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == qualified)
            .map(|(_, value)| value.as_str())
    }

    /// Direct children with the given local name
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// All elements below this one, depth first
    #[must_use]
    pub fn descendants(&self) -> Vec<&XmlNode> {
        let mut out = Vec::new();
        let mut stack: Vec<&XmlNode> = self.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }
}

/// Parse a document and return its root element.
///
/// # Errors
/// Returns an error for malformed XML, mismatched tags, or a document
/// without a root element.
pub fn parse_document(content: &str) -> Result<XmlNode, MarkupError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        let event = reader.read_event()?;
        let offset = usize::try_from(reader.buffer_position()).unwrap_or(content.len());

        match event {
            Event::Start(start) => {
                stack.push(open(&start, content, offset)?);
            }
            Event::Empty(start) => {
                let node = open(&start, content, offset)?;
                close(&mut stack, &mut root, node);
            }
            Event::End(_) => {
                let node = stack.pop().ok_or(MarkupError::Unbalanced)?;
                close(&mut stack, &mut root, node);
            }
            Event::Text(text) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(MarkupError::Unbalanced);
    }
    root.ok_or(MarkupError::Empty)
}

fn open(start: &BytesStart<'_>, content: &str, end_offset: usize) -> Result<XmlNode, MarkupError> {
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attributes.push((key, value));
    }

    let prefix = content.get(..end_offset).unwrap_or(content);
    let tag_start = prefix.rfind('<').unwrap_or(0);
    let newlines = prefix[..tag_start].bytes().filter(|b| *b == b'\n').count();

    Ok(XmlNode {
        name: String::from_utf8_lossy(start.local_name().as_ref()).into_owned(),
        attributes,
        text: String::new(),
        line: u32::try_from(newlines + 1).unwrap_or(u32::MAX),
        children: Vec::new(),
    })
}

fn close(stack: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => {
            if root.is_none() {
                *root = Some(node);
            }
        }
    }
}
