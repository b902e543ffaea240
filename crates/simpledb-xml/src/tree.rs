//! Parsed response trees.
//!
//! [`ParseNode`] is the neutral shape handed to the flattener: a name, ordered
//! attributes, ordered children and a text payload. [`parse_document`] builds
//! one from raw XML bytes using quick-xml.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::XmlError;
use crate::flatten::DEFAULT_MAX_DEPTH;

/// One element of a parsed XML document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseNode {
    /// Qualified element name.
    pub name: String,
    /// Attributes in document order.
    pub attributes: Vec<(String, String)>,
    /// Child elements in document order.
    pub children: Vec<ParseNode>,
    /// Concatenated text and CDATA content; empty when the element only holds
    /// whitespace.
    pub text: String,
}

impl ParseNode {
    /// An element with no attributes, children or text.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// A leaf element holding `text`.
    pub fn leaf(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name).with_text(text)
    }

    /// Append an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Append a child element.
    #[must_use]
    pub fn with_child(mut self, child: ParseNode) -> Self {
        self.children.push(child);
        self
    }

    /// Replace the text payload.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// The first child with the given name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&ParseNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// The value of the first attribute with the given name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Parse an XML document into its root [`ParseNode`].
///
/// The declaration, comments, processing instructions and doctype are
/// skipped. Entity and character references are resolved, CDATA is kept
/// verbatim, and an element whose text is only whitespace gets empty text.
/// Nesting is limited to [`DEFAULT_MAX_DEPTH`] levels; see
/// [`parse_document_with_max_depth`].
///
/// # Errors
///
/// Returns [`XmlError::MissingElement`] when there is no root element,
/// [`XmlError::UnexpectedElement`] for truncated input or content after the
/// root, [`XmlError::MalformedTree`] when nesting exceeds the limit, and a
/// quick-xml error for malformed markup.
///
/// # Examples
///
/// ```
/// use simpledb_xml::parse_document;
///
/// let root = parse_document(b"<Root a=\"1\"><Child>x &amp; y</Child></Root>").unwrap();
/// assert_eq!(root.name, "Root");
/// assert_eq!(root.attribute("a"), Some("1"));
/// assert_eq!(root.children[0].text, "x & y");
/// ```
pub fn parse_document(xml: &[u8]) -> Result<ParseNode, XmlError> {
    parse_document_with_max_depth(xml, DEFAULT_MAX_DEPTH)
}

/// Parse an XML document, refusing elements nested deeper than `max_depth`
/// (the root is depth 1).
///
/// Parsing stops at the first element past the limit, so an oversized tree
/// is never built.
///
/// # Errors
///
/// Same as [`parse_document`].
pub fn parse_document_with_max_depth(xml: &[u8], max_depth: usize) -> Result<ParseNode, XmlError> {
    let mut reader = Reader::from_reader(xml);
    let mut stack: Vec<ParseNode> = Vec::new();
    let mut root: Option<ParseNode> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if root.is_some() {
                    return Err(XmlError::UnexpectedElement(
                        "content after root element".to_string(),
                    ));
                }
                check_depth(stack.len() + 1, max_depth)?;
                stack.push(start_node(&e)?);
            }
            Event::Empty(e) => {
                check_depth(stack.len() + 1, max_depth)?;
                let node = start_node(&e)?;
                close_node(node, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                let node = stack.pop().ok_or_else(|| {
                    XmlError::UnexpectedElement("end tag without start tag".to_string())
                })?;
                close_node(node, &mut stack, &mut root)?;
            }
            Event::Text(e) => {
                let decoded = e
                    .decode()
                    .map_err(|err| XmlError::ParseError(err.to_string()))?;
                let unescaped = quick_xml::escape::unescape(&decoded)
                    .map_err(|err| XmlError::ParseError(err.to_string()))?;
                push_text(&mut stack, &unescaped);
            }
            Event::CData(e) => {
                let text =
                    std::str::from_utf8(&e).map_err(|err| XmlError::ParseError(err.to_string()))?;
                push_text(&mut stack, text);
            }
            Event::GeneralRef(e) => {
                let name =
                    std::str::from_utf8(&e).map_err(|err| XmlError::ParseError(err.to_string()))?;
                let entity = format!("&{name};");
                let resolved = quick_xml::escape::unescape(&entity)
                    .map_err(|err| XmlError::ParseError(err.to_string()))?;
                push_text(&mut stack, &resolved);
            }
            Event::Eof => break,
            // Skip declaration, comments, processing instructions, doctype.
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(XmlError::UnexpectedElement(format!(
            "unexpected EOF inside <{}>",
            open.name
        )));
    }

    root.ok_or_else(|| XmlError::MissingElement("root element".to_string()))
}

fn check_depth(depth: usize, max_depth: usize) -> Result<(), XmlError> {
    if depth > max_depth {
        return Err(XmlError::MalformedTree { depth: max_depth });
    }
    Ok(())
}

/// Build a node from a start (or empty) tag, attributes included.
fn start_node(e: &BytesStart<'_>) -> Result<ParseNode, XmlError> {
    let name = e.name();
    let tag_name =
        std::str::from_utf8(name.as_ref()).map_err(|err| XmlError::ParseError(err.to_string()))?;
    let mut node = ParseNode::new(tag_name);

    for attr in e.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|err| XmlError::ParseError(err.to_string()))?;
        let raw =
            std::str::from_utf8(&attr.value).map_err(|err| XmlError::ParseError(err.to_string()))?;
        let value = quick_xml::escape::unescape(raw)
            .map_err(|err| XmlError::ParseError(err.to_string()))?;
        node.attributes.push((key.to_owned(), value.into_owned()));
    }

    Ok(node)
}

/// Attach a finished node to its parent, or make it the root.
fn close_node(
    mut node: ParseNode,
    stack: &mut [ParseNode],
    root: &mut Option<ParseNode>,
) -> Result<(), XmlError> {
    if node.text.trim().is_empty() {
        node.text.clear();
    }

    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_some() => {
            return Err(XmlError::UnexpectedElement(format!(
                "second root element <{}>",
                node.name
            )));
        }
        None => *root = Some(node),
    }
    Ok(())
}

/// Text outside the root element is ignored.
fn push_text(stack: &mut [ParseNode], text: &str) {
    if let Some(node) = stack.last_mut() {
        node.text.push_str(text);
    }
}
