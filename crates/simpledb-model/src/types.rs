//! SimpleDB request and result records.
//!
//! Boolean flags are `Option<bool>`: `None` means the flag is not sent at all,
//! which is distinct from sending `false`.

use serde::{Deserialize, Serialize};

/// A name/value pair as returned by `GetAttributes` and `Select`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Attribute {
    /// Attribute name.
    pub name: String,
    /// Attribute value.
    pub value: String,
}

impl Attribute {
    /// Create an attribute.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One attribute record or a sequence of them.
///
/// A result holding a single attribute is not folded into a list, so the
/// single case is kept as its own variant instead of being guessed from the
/// container shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeRecords {
    /// Exactly one record.
    One(Attribute),
    /// Zero or more records, in document order.
    Many(Vec<Attribute>),
}

impl AttributeRecords {
    /// Iterate over the records.
    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        match self {
            Self::One(attr) => std::slice::from_ref(attr).iter(),
            Self::Many(attrs) => attrs.iter(),
        }
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(attrs) => attrs.len(),
        }
    }

    /// Whether there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for AttributeRecords {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl From<Attribute> for AttributeRecords {
    fn from(attr: Attribute) -> Self {
        Self::One(attr)
    }
}

impl From<Vec<Attribute>> for AttributeRecords {
    fn from(attrs: Vec<Attribute>) -> Self {
        Self::Many(attrs)
    }
}

impl<A: Into<Attribute>> FromIterator<A> for AttributeRecords {
    fn from_iter<I: IntoIterator<Item = A>>(iter: I) -> Self {
        Self::Many(iter.into_iter().map(Into::into).collect())
    }
}

/// A named item and its attributes, as returned by `Select`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Item name.
    pub name: String,
    /// The item's attributes.
    pub attributes: AttributeRecords,
}

/// An attribute to write with `PutAttributes` / `BatchPutAttributes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReplaceableAttribute {
    /// Attribute name.
    pub name: String,
    /// Attribute value.
    pub value: String,
    /// Replace existing values of this attribute instead of adding one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replace: Option<bool>,
}

impl ReplaceableAttribute {
    /// An attribute that is added alongside existing values.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            replace: None,
        }
    }

    /// An attribute that replaces existing values.
    pub fn replacing(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            replace: Some(true),
            ..Self::new(name, value)
        }
    }
}

/// Drops the replace flag.
impl From<ReplaceableAttribute> for Attribute {
    fn from(attr: ReplaceableAttribute) -> Self {
        Self {
            name: attr.name,
            value: attr.value,
        }
    }
}

/// A precondition on an attribute for conditional puts and deletes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateCondition {
    /// Attribute name.
    pub name: String,
    /// Expected current value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Whether the attribute is expected to exist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exists: Option<bool>,
}

impl UpdateCondition {
    /// Require the attribute to currently hold `value`.
    pub fn equals(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            exists: None,
        }
    }

    /// Require the attribute to exist (`true`) or to be absent (`false`).
    pub fn exists(name: impl Into<String>, exists: bool) -> Self {
        Self {
            name: name.into(),
            value: None,
            exists: Some(exists),
        }
    }
}

/// An attribute to remove with `DeleteAttributes`.
///
/// Without a value, every value of the attribute is removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeletableAttribute {
    /// Attribute name.
    pub name: String,
    /// Specific value to remove.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Encoding of the name (e.g. `base64`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_encoding: Option<String>,
    /// Encoding of the value (e.g. `base64`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_encoding: Option<String>,
}

impl DeletableAttribute {
    /// Remove every value of `name`.
    pub fn all(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            name_encoding: None,
            value_encoding: None,
        }
    }

    /// Remove one specific value of `name`.
    pub fn single(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::all(name)
        }
    }
}

/// One item of a `BatchPutAttributes` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReplaceableItem {
    /// Item name.
    pub item_name: String,
    /// Attributes to write.
    #[serde(default)]
    pub attributes: Vec<ReplaceableAttribute>,
}

impl ReplaceableItem {
    /// Create an item.
    pub fn new(item_name: impl Into<String>, attributes: Vec<ReplaceableAttribute>) -> Self {
        Self {
            item_name: item_name.into(),
            attributes,
        }
    }
}
