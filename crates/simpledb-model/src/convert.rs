//! Conversions between attribute records and plain objects.
//!
//! Results come back as flattened XML ([`FlatValue`]); writes go out as
//! [`ReplaceableAttribute`] lists. The helpers here bridge those shapes and a
//! simple `name -> value` object.

use std::collections::BTreeMap;

use simpledb_xml::{FlatObject, FlatValue, TEXT_FIELD, XmlError, insert_folded};

use crate::types::{Attribute, AttributeRecords, Item, ReplaceableAttribute};

/// Whether written attributes replace existing values or add to them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReplaceMode {
    /// Add values next to existing ones; no `Replace` flag is sent.
    #[default]
    Keep,
    /// Replace existing values (`Replace=true` on every attribute).
    Replace,
}

/// Fold attribute records into an object keyed by attribute name.
///
/// A name that occurs more than once becomes a list of its values in record
/// order.
///
/// # Examples
///
/// ```
/// use simpledb_model::{Attribute, AttributeRecords, convert::attributes_to_object};
/// use simpledb_xml::FlatValue;
///
/// let records = AttributeRecords::from(vec![
///     Attribute::new("tag", "a"),
///     Attribute::new("tag", "b"),
///     Attribute::new("size", "L"),
/// ]);
/// let obj = attributes_to_object(&records);
/// assert_eq!(obj["size"], FlatValue::from("L"));
/// assert_eq!(obj["tag"], FlatValue::List(vec!["a".into(), "b".into()]));
/// ```
#[must_use]
pub fn attributes_to_object(records: &AttributeRecords) -> FlatObject {
    let mut out = FlatObject::new();
    for attr in records.iter() {
        insert_folded(&mut out, &attr.name, FlatValue::Text(attr.value.clone()));
    }
    out
}

/// Map each item name to its attribute object.
///
/// Items sharing a name overwrite each other; the last one wins.
#[must_use]
pub fn items_to_object(items: &[Item]) -> BTreeMap<String, FlatObject> {
    items
        .iter()
        .map(|item| (item.name.clone(), attributes_to_object(&item.attributes)))
        .collect()
}

/// Turn a `name -> value` object into attributes to write, in name order.
///
/// Collecting the result into [`AttributeRecords`] and passing it to
/// [`attributes_to_object`] gives back `obj`.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
///
/// use simpledb_model::convert::{ReplaceMode, attributes_to_object, object_to_attributes};
/// use simpledb_model::AttributeRecords;
/// use simpledb_xml::FlatValue;
///
/// let obj = BTreeMap::from([("color".to_owned(), "red".to_owned())]);
/// let records: AttributeRecords = object_to_attributes(&obj, ReplaceMode::Replace)
///     .into_iter()
///     .collect();
/// assert_eq!(attributes_to_object(&records)["color"], FlatValue::from("red"));
/// ```
#[must_use]
pub fn object_to_attributes(
    obj: &BTreeMap<String, String>,
    mode: ReplaceMode,
) -> Vec<ReplaceableAttribute> {
    let replace = match mode {
        ReplaceMode::Keep => None,
        ReplaceMode::Replace => Some(true),
    };
    obj.iter()
        .map(|(name, value)| ReplaceableAttribute {
            name: name.clone(),
            value: value.clone(),
            replace,
        })
        .collect()
}

impl Attribute {
    /// Lift a flattened `<Attribute><Name/><Value/></Attribute>` element.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError::MissingElement`] when `Name` or `Value` is absent
    /// and [`XmlError::UnexpectedElement`] when the value is not an object.
    pub fn from_flat(value: &FlatValue) -> Result<Self, XmlError> {
        let obj = expect_object(value, "Attribute")?;
        Ok(Self {
            name: text_field(obj, "Name")?,
            value: text_field(obj, "Value")?,
        })
    }
}

impl AttributeRecords {
    /// Lift the flattened `Attribute` field of a result.
    ///
    /// A single object becomes [`AttributeRecords::One`], a list becomes
    /// [`AttributeRecords::Many`].
    ///
    /// # Errors
    ///
    /// Returns an error if any record is malformed (see
    /// [`Attribute::from_flat`]).
    pub fn from_flat(value: &FlatValue) -> Result<Self, XmlError> {
        match value {
            FlatValue::List(items) => items
                .iter()
                .map(Attribute::from_flat)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Many),
            other => Attribute::from_flat(other).map(Self::One),
        }
    }
}

impl Item {
    /// Lift one flattened `<Item>` element of a `Select` result.
    ///
    /// # Errors
    ///
    /// Returns [`XmlError::MissingElement`] when the item has no `Name`, or
    /// any error from [`AttributeRecords::from_flat`].
    pub fn from_flat(value: &FlatValue) -> Result<Self, XmlError> {
        let obj = expect_object(value, "Item")?;
        let attributes = match obj.get("Attribute") {
            Some(attrs) => AttributeRecords::from_flat(attrs)?,
            None => AttributeRecords::default(),
        };
        Ok(Self {
            name: text_field(obj, "Name")?,
            attributes,
        })
    }
}

/// Lift the attributes of a flattened `GetAttributesResult`.
///
/// An empty result element yields no records.
///
/// # Errors
///
/// See [`AttributeRecords::from_flat`].
pub fn attributes_from_result(result: &FlatValue) -> Result<AttributeRecords, XmlError> {
    match result.get("Attribute") {
        Some(attrs) => AttributeRecords::from_flat(attrs),
        None => Ok(AttributeRecords::default()),
    }
}

/// Lift the items of a flattened `SelectResult`.
///
/// # Errors
///
/// See [`Item::from_flat`].
pub fn items_from_result(result: &FlatValue) -> Result<Vec<Item>, XmlError> {
    match result.get("Item") {
        Some(items) => items.occurrences().into_iter().map(Item::from_flat).collect(),
        None => Ok(Vec::new()),
    }
}

fn expect_object<'a>(value: &'a FlatValue, element: &str) -> Result<&'a FlatObject, XmlError> {
    value
        .as_object()
        .ok_or_else(|| XmlError::UnexpectedElement(format!("{element} is not an element group")))
}

/// Text of a leaf field.
///
/// An empty element reads as `""`; an element carrying an `encoding`
/// attribute reads its text from the sentinel field.
fn text_field(obj: &FlatObject, field: &str) -> Result<String, XmlError> {
    match obj.get(field) {
        Some(FlatValue::Text(text)) => Ok(text.clone()),
        Some(FlatValue::Object(inner)) => match inner.get(TEXT_FIELD) {
            Some(FlatValue::Text(text)) => Ok(text.clone()),
            _ => Ok(String::new()),
        },
        Some(FlatValue::List(_)) => Err(XmlError::UnexpectedElement(format!(
            "{field} occurs more than once"
        ))),
        None => Err(XmlError::MissingElement(field.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use simpledb_xml::read_object;

    use super::*;

    #[test]
    fn test_should_invert_scalar_object() {
        let obj: BTreeMap<String, String> = [("color", "red"), ("size", "L"), ("empty", "")]
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        let expected: FlatObject = obj
            .iter()
            .map(|(k, v)| (k.clone(), FlatValue::Text(v.clone())))
            .collect();

        for mode in [ReplaceMode::Keep, ReplaceMode::Replace] {
            let records: AttributeRecords =
                object_to_attributes(&obj, mode).into_iter().collect();
            assert_eq!(attributes_to_object(&records), expected);
        }
    }

    #[test]
    fn test_should_set_replace_flag_only_in_replace_mode() {
        let obj = BTreeMap::from([("a".to_owned(), "1".to_owned())]);
        assert_eq!(object_to_attributes(&obj, ReplaceMode::Keep)[0].replace, None);
        assert_eq!(
            object_to_attributes(&obj, ReplaceMode::Replace)[0].replace,
            Some(true)
        );
    }

    #[test]
    fn test_should_fold_single_record_as_scalar() {
        let obj = attributes_to_object(&AttributeRecords::One(Attribute::new("a", "1")));
        assert_eq!(obj["a"], FlatValue::from("1"));
    }

    #[test]
    fn test_should_let_last_duplicate_item_win() {
        let items = vec![
            Item {
                name: "u1".to_owned(),
                attributes: Attribute::new("v", "old").into(),
            },
            Item {
                name: "u1".to_owned(),
                attributes: Attribute::new("v", "new").into(),
            },
        ];
        let map = items_to_object(&items);
        assert_eq!(map.len(), 1);
        assert_eq!(map["u1"]["v"], FlatValue::from("new"));
    }

    #[test]
    fn test_should_lift_single_and_repeated_attributes() {
        let single = read_object(
            b"<GetAttributesResult><Attribute><Name>a</Name><Value>1</Value></Attribute></GetAttributesResult>",
        )
        .unwrap();
        assert_eq!(
            attributes_from_result(&single).unwrap(),
            AttributeRecords::One(Attribute::new("a", "1"))
        );

        let many = read_object(
            b"<GetAttributesResult>\
              <Attribute><Name>a</Name><Value>1</Value></Attribute>\
              <Attribute><Name>a</Name><Value/></Attribute>\
              </GetAttributesResult>",
        )
        .unwrap();
        assert_eq!(
            attributes_from_result(&many).unwrap(),
            AttributeRecords::Many(vec![Attribute::new("a", "1"), Attribute::new("a", "")])
        );
    }

    #[test]
    fn test_should_lift_empty_result_to_no_records() {
        let empty = read_object(b"<GetAttributesResult/>").unwrap();
        assert!(attributes_from_result(&empty).unwrap().is_empty());

        let empty = read_object(b"<SelectResult/>").unwrap();
        assert!(items_from_result(&empty).unwrap().is_empty());
    }

    #[test]
    fn test_should_read_encoded_attribute_text() {
        let value = read_object(
            br#"<Attribute><Name encoding="base64">Y29sb3I=</Name><Value>red</Value></Attribute>"#,
        )
        .unwrap();
        assert_eq!(
            Attribute::from_flat(&value).unwrap(),
            Attribute::new("Y29sb3I=", "red")
        );
    }

    #[test]
    fn test_should_reject_attribute_without_name() {
        let value = read_object(b"<Attribute><Value>red</Value></Attribute>").unwrap();
        assert!(matches!(
            Attribute::from_flat(&value),
            Err(XmlError::MissingElement(field)) if field == "Name"
        ));
    }

    #[test]
    fn test_should_lift_select_items() {
        let result = read_object(
            b"<SelectResult>\
              <Item><Name>u1</Name><Attribute><Name>a</Name><Value>1</Value></Attribute></Item>\
              <Item><Name>u2</Name></Item>\
              <NextToken>abc</NextToken>\
              </SelectResult>",
        )
        .unwrap();

        let items = items_from_result(&result).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "u1");
        assert_eq!(items[0].attributes.len(), 1);
        assert_eq!(items[1].name, "u2");
        assert!(items[1].attributes.is_empty());
    }
}
