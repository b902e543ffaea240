//! Flattening parsed trees into plain nested objects.
//!
//! Rules, applied per node:
//!
//! - A node with attributes or children becomes an object. Attributes are
//!   copied as text fields, children are inserted under their tag names, and
//!   any non-empty text is stored under [`TEXT_FIELD`].
//! - A node with only text becomes that text.
//! - A node with nothing becomes an empty object.
//!
//! Sibling fields sharing a name fold into a list in document order, starting
//! at the second occurrence; a field seen once is never wrapped in a list.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::Serialize;
use tracing::trace;

use crate::error::XmlError;
use crate::tree::{ParseNode, parse_document_with_max_depth};

/// Field holding the text of a node that also has attributes or children.
pub const TEXT_FIELD: &str = "#text";

/// Default nesting limit for [`Flattener`].
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// A flattened object: field name to value, ordered by field name.
pub type FlatObject = BTreeMap<String, FlatValue>;

/// A flattened value.
///
/// Serializes as a JSON string, object or array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FlatValue {
    /// Text content of a leaf element, or an attribute value.
    Text(String),
    /// An element with attributes or children.
    Object(FlatObject),
    /// Repeated sibling fields, in document order.
    List(Vec<FlatValue>),
}

impl FlatValue {
    /// The text, if this is a `Text` value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The object, if this is an `Object` value.
    #[must_use]
    pub fn as_object(&self) -> Option<&FlatObject> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// The items, if this is a `List` value.
    #[must_use]
    pub fn as_list(&self) -> Option<&[FlatValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a field of an `Object` value.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FlatValue> {
        self.as_object().and_then(|obj| obj.get(field))
    }

    /// Every occurrence of this field: the items of a `List`, or the value
    /// itself otherwise.
    ///
    /// Useful where the schema says a field may repeat but a single
    /// occurrence is not folded into a list.
    #[must_use]
    pub fn occurrences(&self) -> Vec<&FlatValue> {
        match self {
            Self::List(items) => items.iter().collect(),
            other => vec![other],
        }
    }
}

impl From<String> for FlatValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for FlatValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<FlatObject> for FlatValue {
    fn from(obj: FlatObject) -> Self {
        Self::Object(obj)
    }
}

/// Insert `value` under `name`, folding repeats into a list.
///
/// Absent: assigned directly. Present and not a list: replaced by
/// `[existing, value]`. Already a list: appended.
///
/// # Examples
///
/// ```
/// use simpledb_xml::{FlatObject, FlatValue, insert_folded};
///
/// let mut obj = FlatObject::new();
/// insert_folded(&mut obj, "Name", "a".into());
/// assert_eq!(obj["Name"], FlatValue::from("a"));
///
/// insert_folded(&mut obj, "Name", "b".into());
/// insert_folded(&mut obj, "Name", "c".into());
/// assert_eq!(
///     obj["Name"],
///     FlatValue::List(vec!["a".into(), "b".into(), "c".into()])
/// );
/// ```
pub fn insert_folded(obj: &mut FlatObject, name: &str, value: FlatValue) {
    match obj.entry(name.to_owned()) {
        Entry::Vacant(slot) => {
            slot.insert(value);
        }
        Entry::Occupied(mut slot) => match slot.get_mut() {
            FlatValue::List(items) => items.push(value),
            existing => {
                let first = std::mem::replace(existing, FlatValue::List(Vec::with_capacity(2)));
                *existing = FlatValue::List(vec![first, value]);
            }
        },
    }
}

/// Flattens [`ParseNode`] trees, refusing trees nested deeper than a limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flattener {
    max_depth: usize,
}

impl Default for Flattener {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Flattener {
    /// A flattener with the given nesting limit (the root is depth 1).
    #[must_use]
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// The nesting limit.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Flatten one node.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError::MalformedTree`] if the tree is deeper than the
    /// limit. Nothing partial is returned.
    pub fn flatten(&self, node: &ParseNode) -> Result<FlatValue, XmlError> {
        self.flatten_at(node, 1)
    }

    /// Flatten a document root, returning the value the root element
    /// resolves to rather than a `{root_name: value}` wrapper.
    ///
    /// # Errors
    ///
    /// Same as [`Flattener::flatten`].
    pub fn flatten_document(&self, root: &ParseNode) -> Result<FlatValue, XmlError> {
        trace!(root = %root.name, "Flattening document");
        let mut wrapper = FlatObject::new();
        insert_folded(&mut wrapper, &root.name, self.flatten(root)?);
        wrapper
            .remove(&root.name)
            .ok_or_else(|| XmlError::MissingElement(root.name.clone()))
    }

    /// Parse and flatten an XML document, applying the nesting limit to the
    /// parse as well.
    ///
    /// # Errors
    ///
    /// Returns any parse error from
    /// [`parse_document_with_max_depth`](crate::parse_document_with_max_depth)
    /// or flatten error from [`Flattener::flatten_document`].
    pub fn read_object(&self, xml: &[u8]) -> Result<FlatValue, XmlError> {
        let root = parse_document_with_max_depth(xml, self.max_depth)?;
        self.flatten_document(&root)
    }

    fn flatten_at(&self, node: &ParseNode, depth: usize) -> Result<FlatValue, XmlError> {
        if depth > self.max_depth {
            return Err(XmlError::MalformedTree {
                depth: self.max_depth,
            });
        }

        let is_object = !node.attributes.is_empty() || !node.children.is_empty();
        if !is_object {
            return Ok(if node.text.is_empty() {
                FlatValue::Object(FlatObject::new())
            } else {
                FlatValue::Text(node.text.clone())
            });
        }

        let mut out = FlatObject::new();
        for (name, value) in &node.attributes {
            out.insert(name.clone(), FlatValue::Text(value.clone()));
        }
        for child in &node.children {
            let value = self.flatten_at(child, depth + 1)?;
            insert_folded(&mut out, &child.name, value);
        }
        // A real field literally named `#text` takes precedence.
        if !node.text.is_empty() {
            out.entry(TEXT_FIELD.to_owned())
                .or_insert_with(|| FlatValue::Text(node.text.clone()));
        }

        Ok(FlatValue::Object(out))
    }
}

/// Flatten one node with the default depth limit.
///
/// # Errors
///
/// See [`Flattener::flatten`].
pub fn flatten(node: &ParseNode) -> Result<FlatValue, XmlError> {
    Flattener::default().flatten(node)
}

/// Flatten a document root with the default depth limit.
///
/// # Errors
///
/// See [`Flattener::flatten_document`].
pub fn flatten_document(root: &ParseNode) -> Result<FlatValue, XmlError> {
    Flattener::default().flatten_document(root)
}

/// Parse and flatten an XML document in one step.
///
/// # Errors
///
/// See [`Flattener::read_object`].
///
/// # Examples
///
/// ```
/// use simpledb_xml::read_object;
///
/// let value = read_object(b"<R><Name>a</Name><Name>b</Name></R>").unwrap();
/// assert_eq!(value.get("Name").unwrap().as_list().unwrap().len(), 2);
/// ```
pub fn read_object(xml: &[u8]) -> Result<FlatValue, XmlError> {
    Flattener::default().read_object(xml)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(pairs: &[(&str, FlatValue)]) -> FlatValue {
        FlatValue::Object(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_owned(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn test_should_fold_repeated_leaves_into_ordered_list() {
        let node = ParseNode::new("Item")
            .with_child(ParseNode::leaf("Attribute", "a"))
            .with_child(ParseNode::leaf("Attribute", "b"))
            .with_child(ParseNode::leaf("Attribute", "c"));

        assert_eq!(
            flatten(&node).unwrap(),
            object(&[(
                "Attribute",
                FlatValue::List(vec!["a".into(), "b".into(), "c".into()])
            )])
        );
    }

    #[test]
    fn test_should_keep_single_occurrence_scalar() {
        let node = ParseNode::new("Item").with_child(ParseNode::leaf("Attribute", "a"));
        assert_eq!(flatten(&node).unwrap(), object(&[("Attribute", "a".into())]));
    }

    #[test]
    fn test_should_fold_repeated_objects() {
        let attr = |n: &str, v: &str| {
            ParseNode::new("Attribute")
                .with_child(ParseNode::leaf("Name", n))
                .with_child(ParseNode::leaf("Value", v))
        };
        let node = ParseNode::new("Item")
            .with_child(attr("color", "red"))
            .with_child(attr("size", "L"));

        let flat = flatten(&node).unwrap();
        let items = flat.get("Attribute").unwrap().as_list().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].get("Name"), Some(&"color".into()));
        assert_eq!(items[1].get("Value"), Some(&"L".into()));
    }

    #[test]
    fn test_should_store_mixed_text_under_sentinel() {
        let node = ParseNode::new("Node")
            .with_attribute("id", "1")
            .with_text("hello");
        assert_eq!(
            flatten(&node).unwrap(),
            object(&[("id", "1".into()), ("#text", "hello".into())])
        );
    }

    #[test]
    fn test_should_not_overwrite_real_field_named_like_sentinel() {
        let node = ParseNode::new("Node")
            .with_attribute("#text", "real")
            .with_text("mixed");
        assert_eq!(flatten(&node).unwrap(), object(&[("#text", "real".into())]));
    }

    #[test]
    fn test_should_resolve_empty_element_to_empty_object() {
        let node = ParseNode::new("Parent").with_child(ParseNode::new("Empty"));
        assert_eq!(
            flatten(&node).unwrap(),
            object(&[("Empty", FlatValue::Object(FlatObject::new()))])
        );
    }

    #[test]
    fn test_should_let_later_duplicate_attribute_win() {
        let node = ParseNode::new("N")
            .with_attribute("a", "1")
            .with_attribute("a", "2");
        assert_eq!(flatten(&node).unwrap(), object(&[("a", "2".into())]));
    }

    #[test]
    fn test_should_return_root_value_from_document() {
        let root = ParseNode::new("Response").with_child(ParseNode::leaf("RequestId", "r-1"));
        assert_eq!(
            flatten_document(&root).unwrap(),
            object(&[("RequestId", "r-1".into())])
        );

        let leaf = ParseNode::leaf("Only", "text");
        assert_eq!(flatten_document(&leaf).unwrap(), "text".into());
    }

    #[test]
    fn test_should_reject_tree_deeper_than_limit() {
        let mut node = ParseNode::leaf("L", "x");
        for _ in 0..5 {
            node = ParseNode::new("N").with_child(node);
        }

        assert!(Flattener::with_max_depth(6).flatten(&node).is_ok());
        assert!(matches!(
            Flattener::with_max_depth(5).flatten(&node),
            Err(XmlError::MalformedTree { depth: 5 })
        ));
    }

    #[test]
    fn test_should_list_occurrences_of_single_and_repeated_fields() {
        let single = FlatValue::from("a");
        assert_eq!(single.occurrences(), vec![&single]);

        let list = FlatValue::List(vec!["a".into(), "b".into()]);
        assert_eq!(list.occurrences().len(), 2);
    }
}
