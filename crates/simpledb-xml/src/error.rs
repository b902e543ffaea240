//! Error types for XML parsing and flattening.

/// Errors that can occur while parsing or flattening a response document.
#[derive(Debug, thiserror::Error)]
pub enum XmlError {
    /// An error from the underlying quick-xml library.
    #[error("XML processing error: {0}")]
    QuickXml(#[from] quick_xml::Error),

    /// An error from quick-xml attribute handling.
    #[error("XML attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// A required XML element was missing.
    #[error("missing required XML element: {0}")]
    MissingElement(String),

    /// An unexpected XML element or end of input was encountered.
    #[error("unexpected XML element: {0}")]
    UnexpectedElement(String),

    /// Text or a name could not be decoded.
    #[error("failed to parse value: {0}")]
    ParseError(String),

    /// The tree is deeper than the flattener allows.
    #[error("malformed tree: nesting exceeds {depth} levels")]
    MalformedTree {
        /// The configured depth limit that was exceeded.
        depth: usize,
    },
}
