//! SimpleDB operation inputs.
//!
//! Each input marshals itself into a [`ParameterMap`] of indexed query keys
//! (`Attribute.1.Name`, `Item.2.Attribute.3.Value`, ...). Indices are
//! 1-based. Flags that are `None` and booleans that are `false` by default
//! are left out of the request.

use simpledb_auth::ParameterMap;
use typed_builder::TypedBuilder;

use crate::operations::SimpleDbOperation;
use crate::types::{DeletableAttribute, ReplaceableAttribute, ReplaceableItem, UpdateCondition};

/// A request that can be signed and sent.
pub trait SimpleDbRequest {
    /// The operation this request invokes.
    fn operation(&self) -> SimpleDbOperation;

    /// The operation-specific parameters, without `Action`/`Version` or any
    /// signing parameters.
    fn to_params(&self) -> ParameterMap;
}

fn bool_param(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

fn push_replaceable_attributes(
    params: &mut ParameterMap,
    prefix: &str,
    attributes: &[ReplaceableAttribute],
) {
    for (i, attr) in attributes.iter().enumerate() {
        let n = i + 1;
        params.insert(format!("{prefix}Attribute.{n}.Name"), attr.name.as_str());
        params.insert(format!("{prefix}Attribute.{n}.Value"), attr.value.as_str());
        params.insert_opt(
            format!("{prefix}Attribute.{n}.Replace"),
            attr.replace.map(bool_param),
        );
    }
}

fn push_expected(params: &mut ParameterMap, expected: &[UpdateCondition]) {
    for (i, cond) in expected.iter().enumerate() {
        let n = i + 1;
        params.insert(format!("Expected.{n}.Name"), cond.name.as_str());
        params.insert_opt(format!("Expected.{n}.Value"), cond.value.as_deref());
        params.insert_opt(format!("Expected.{n}.Exists"), cond.exists.map(bool_param));
    }
}

// ---------------------------------------------------------------------------
// Domain management
// ---------------------------------------------------------------------------

/// Input for the `CreateDomain` operation.
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct CreateDomainInput {
    /// Name of the domain to create.
    #[builder(setter(into))]
    pub domain_name: String,
}

impl SimpleDbRequest for CreateDomainInput {
    fn operation(&self) -> SimpleDbOperation {
        SimpleDbOperation::CreateDomain
    }

    fn to_params(&self) -> ParameterMap {
        [("DomainName", self.domain_name.as_str())]
            .into_iter()
            .collect()
    }
}

/// Input for the `DeleteDomain` operation.
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct DeleteDomainInput {
    /// Name of the domain to delete.
    #[builder(setter(into))]
    pub domain_name: String,
}

impl SimpleDbRequest for DeleteDomainInput {
    fn operation(&self) -> SimpleDbOperation {
        SimpleDbOperation::DeleteDomain
    }

    fn to_params(&self) -> ParameterMap {
        [("DomainName", self.domain_name.as_str())]
            .into_iter()
            .collect()
    }
}

/// Input for the `ListDomains` operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, TypedBuilder)]
pub struct ListDomainsInput {
    /// Page size (the service caps it at 100).
    #[builder(default, setter(strip_option))]
    pub max_number_of_domains: Option<u32>,
    /// Continuation token from a previous page.
    #[builder(default, setter(strip_option, into))]
    pub next_token: Option<String>,
}

impl SimpleDbRequest for ListDomainsInput {
    fn operation(&self) -> SimpleDbOperation {
        SimpleDbOperation::ListDomains
    }

    fn to_params(&self) -> ParameterMap {
        let mut params = ParameterMap::new();
        params.insert_opt(
            "MaxNumberOfDomains",
            self.max_number_of_domains.map(|n| n.to_string()),
        );
        params.insert_opt("NextToken", self.next_token.as_deref());
        params
    }
}

/// Input for the `DomainMetadata` operation.
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct DomainMetadataInput {
    /// Name of the domain to describe.
    #[builder(setter(into))]
    pub domain_name: String,
}

impl SimpleDbRequest for DomainMetadataInput {
    fn operation(&self) -> SimpleDbOperation {
        SimpleDbOperation::DomainMetadata
    }

    fn to_params(&self) -> ParameterMap {
        [("DomainName", self.domain_name.as_str())]
            .into_iter()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// Input for the `Select` operation.
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct SelectInput {
    /// The select expression, e.g. ``select * from `users` where age > '30'``.
    #[builder(setter(into))]
    pub select_expression: String,
    /// Continuation token from a previous page.
    #[builder(default, setter(strip_option, into))]
    pub next_token: Option<String>,
    /// Read the latest committed data instead of an eventually consistent view.
    #[builder(default)]
    pub consistent_read: bool,
}

impl SimpleDbRequest for SelectInput {
    fn operation(&self) -> SimpleDbOperation {
        SimpleDbOperation::Select
    }

    fn to_params(&self) -> ParameterMap {
        let mut params = ParameterMap::new();
        params.insert("SelectExpression", self.select_expression.as_str());
        params.insert_opt("NextToken", self.next_token.as_deref());
        if self.consistent_read {
            params.insert("ConsistentRead", "true");
        }
        params
    }
}

// ---------------------------------------------------------------------------
// Item CRUD
// ---------------------------------------------------------------------------

/// Input for the `PutAttributes` operation.
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct PutAttributesInput {
    /// Target domain.
    #[builder(setter(into))]
    pub domain_name: String,
    /// Target item.
    #[builder(setter(into))]
    pub item_name: String,
    /// Attributes to write.
    #[builder(default)]
    pub attributes: Vec<ReplaceableAttribute>,
    /// Preconditions that must hold for the write to happen.
    #[builder(default)]
    pub expected: Vec<UpdateCondition>,
}

impl SimpleDbRequest for PutAttributesInput {
    fn operation(&self) -> SimpleDbOperation {
        SimpleDbOperation::PutAttributes
    }

    fn to_params(&self) -> ParameterMap {
        let mut params = ParameterMap::new();
        params.insert("DomainName", self.domain_name.as_str());
        params.insert("ItemName", self.item_name.as_str());
        push_replaceable_attributes(&mut params, "", &self.attributes);
        push_expected(&mut params, &self.expected);
        params
    }
}

/// Input for the `BatchPutAttributes` operation.
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct BatchPutAttributesInput {
    /// Target domain.
    #[builder(setter(into))]
    pub domain_name: String,
    /// Items to write (the service accepts at most 25).
    #[builder(default)]
    pub items: Vec<ReplaceableItem>,
}

impl SimpleDbRequest for BatchPutAttributesInput {
    fn operation(&self) -> SimpleDbOperation {
        SimpleDbOperation::BatchPutAttributes
    }

    fn to_params(&self) -> ParameterMap {
        let mut params = ParameterMap::new();
        params.insert("DomainName", self.domain_name.as_str());
        for (i, item) in self.items.iter().enumerate() {
            let prefix = format!("Item.{}.", i + 1);
            params.insert(format!("{prefix}ItemName"), item.item_name.as_str());
            push_replaceable_attributes(&mut params, &prefix, &item.attributes);
        }
        params
    }
}

/// Input for the `GetAttributes` operation.
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct GetAttributesInput {
    /// Source domain.
    #[builder(setter(into))]
    pub domain_name: String,
    /// Item to read.
    #[builder(setter(into))]
    pub item_name: String,
    /// Attributes to return; empty means all of them.
    #[builder(default)]
    pub attribute_names: Vec<String>,
    /// Read the latest committed data instead of an eventually consistent view.
    #[builder(default)]
    pub consistent_read: bool,
}

impl SimpleDbRequest for GetAttributesInput {
    fn operation(&self) -> SimpleDbOperation {
        SimpleDbOperation::GetAttributes
    }

    fn to_params(&self) -> ParameterMap {
        let mut params = ParameterMap::new();
        params.insert("DomainName", self.domain_name.as_str());
        params.insert("ItemName", self.item_name.as_str());
        for (i, name) in self.attribute_names.iter().enumerate() {
            params.insert(format!("AttributeName.{}", i + 1), name.as_str());
        }
        if self.consistent_read {
            params.insert("ConsistentRead", "true");
        }
        params
    }
}

/// Input for the `DeleteAttributes` operation.
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct DeleteAttributesInput {
    /// Target domain.
    #[builder(setter(into))]
    pub domain_name: String,
    /// Target item.
    #[builder(setter(into))]
    pub item_name: String,
    /// Attributes to remove; empty removes the whole item.
    #[builder(default)]
    pub attributes: Vec<DeletableAttribute>,
    /// Preconditions that must hold for the delete to happen.
    #[builder(default)]
    pub expected: Vec<UpdateCondition>,
}

impl SimpleDbRequest for DeleteAttributesInput {
    fn operation(&self) -> SimpleDbOperation {
        SimpleDbOperation::DeleteAttributes
    }

    fn to_params(&self) -> ParameterMap {
        let mut params = ParameterMap::new();
        params.insert("DomainName", self.domain_name.as_str());
        params.insert("ItemName", self.item_name.as_str());
        for (i, attr) in self.attributes.iter().enumerate() {
            let n = i + 1;
            params.insert(format!("Attribute.{n}.Name"), attr.name.as_str());
            params.insert_opt(format!("Attribute.{n}.Value"), attr.value.as_deref());
            params.insert_opt(
                format!("Attribute.{n}.NameEncoding"),
                attr.name_encoding.as_deref(),
            );
            params.insert_opt(
                format!("Attribute.{n}.ValueEncoding"),
                attr.value_encoding.as_deref(),
            );
        }
        push_expected(&mut params, &self.expected);
        params
    }
}

/// An operation with caller-assembled parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawInput {
    /// The operation to invoke.
    pub operation: SimpleDbOperation,
    /// Parameters sent as-is.
    pub params: ParameterMap,
}

impl SimpleDbRequest for RawInput {
    fn operation(&self) -> SimpleDbOperation {
        self.operation
    }

    fn to_params(&self) -> ParameterMap {
        self.params.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(params: &ParameterMap) -> Vec<(&str, &str)> {
        params.iter().collect()
    }

    #[test]
    fn test_should_marshal_domain_name() {
        let input = CreateDomainInput::builder().domain_name("users").build();
        assert_eq!(pairs(&input.to_params()), vec![("DomainName", "users")]);
        assert_eq!(input.operation().as_str(), "CreateDomain");
    }

    #[test]
    fn test_should_omit_absent_list_domains_options() {
        assert!(ListDomainsInput::default().to_params().is_empty());

        let input = ListDomainsInput::builder()
            .max_number_of_domains(10)
            .next_token("tok")
            .build();
        assert_eq!(
            pairs(&input.to_params()),
            vec![("MaxNumberOfDomains", "10"), ("NextToken", "tok")]
        );
    }

    #[test]
    fn test_should_send_consistent_read_only_when_set() {
        let input = SelectInput::builder()
            .select_expression("select * from `users`")
            .build();
        assert!(!input.to_params().contains_key("ConsistentRead"));

        let input = SelectInput::builder()
            .select_expression("select * from `users`")
            .consistent_read(true)
            .build();
        assert_eq!(input.to_params().get("ConsistentRead"), Some("true"));
    }

    #[test]
    fn test_should_index_put_attributes_from_one() {
        let input = PutAttributesInput::builder()
            .domain_name("users")
            .item_name("u1")
            .attributes(vec![
                ReplaceableAttribute::new("color", "red"),
                ReplaceableAttribute::replacing("size", "L"),
            ])
            .expected(vec![UpdateCondition::exists("locked", false)])
            .build();

        assert_eq!(
            pairs(&input.to_params()),
            vec![
                ("DomainName", "users"),
                ("ItemName", "u1"),
                ("Attribute.1.Name", "color"),
                ("Attribute.1.Value", "red"),
                ("Attribute.2.Name", "size"),
                ("Attribute.2.Value", "L"),
                ("Attribute.2.Replace", "true"),
                ("Expected.1.Name", "locked"),
                ("Expected.1.Exists", "false"),
            ]
        );
    }

    #[test]
    fn test_should_nest_batch_put_item_indices() {
        let input = BatchPutAttributesInput::builder()
            .domain_name("users")
            .items(vec![
                ReplaceableItem::new("u1", vec![ReplaceableAttribute::new("a", "1")]),
                ReplaceableItem::new(
                    "u2",
                    vec![
                        ReplaceableAttribute::new("b", "2"),
                        ReplaceableAttribute::replacing("c", "3"),
                    ],
                ),
            ])
            .build();
        let params = input.to_params();

        assert_eq!(params.get("Item.1.ItemName"), Some("u1"));
        assert_eq!(params.get("Item.1.Attribute.1.Name"), Some("a"));
        assert_eq!(params.get("Item.2.ItemName"), Some("u2"));
        assert_eq!(params.get("Item.2.Attribute.2.Value"), Some("3"));
        assert_eq!(params.get("Item.2.Attribute.2.Replace"), Some("true"));
        assert!(!params.contains_key("Item.2.Attribute.1.Replace"));
    }

    #[test]
    fn test_should_marshal_attribute_names_without_positional_shifting() {
        let input = GetAttributesInput::builder()
            .domain_name("users")
            .item_name("u1")
            .consistent_read(true)
            .build();
        let params = input.to_params();
        assert!(!params.contains_key("AttributeName.1"));
        assert_eq!(params.get("ConsistentRead"), Some("true"));

        let input = GetAttributesInput::builder()
            .domain_name("users")
            .item_name("u1")
            .attribute_names(vec!["a".to_owned(), "b".to_owned()])
            .build();
        let params = input.to_params();
        assert_eq!(params.get("AttributeName.1"), Some("a"));
        assert_eq!(params.get("AttributeName.2"), Some("b"));
        assert!(!params.contains_key("ConsistentRead"));
    }

    #[test]
    fn test_should_marshal_delete_attributes_with_optional_value() {
        let input = DeleteAttributesInput::builder()
            .domain_name("users")
            .item_name("u1")
            .attributes(vec![
                DeletableAttribute::all("color"),
                DeletableAttribute::single("size", "L"),
                DeletableAttribute {
                    name_encoding: Some("base64".to_owned()),
                    value_encoding: Some("base64".to_owned()),
                    ..DeletableAttribute::single("dGFn", "bmV3")
                },
            ])
            .expected(vec![UpdateCondition::equals("version", "3")])
            .build();
        let params = input.to_params();

        assert_eq!(params.get("Attribute.1.Name"), Some("color"));
        assert!(!params.contains_key("Attribute.1.Value"));
        assert!(!params.contains_key("Attribute.1.NameEncoding"));
        assert!(!params.contains_key("Attribute.2.ValueEncoding"));
        assert_eq!(params.get("Attribute.2.Value"), Some("L"));
        assert_eq!(params.get("Attribute.3.Name"), Some("dGFn"));
        assert_eq!(params.get("Attribute.3.Value"), Some("bmV3"));
        assert_eq!(params.get("Attribute.3.NameEncoding"), Some("base64"));
        assert_eq!(params.get("Attribute.3.ValueEncoding"), Some("base64"));
        assert_eq!(params.get("Expected.1.Value"), Some("3"));
        assert!(!params.contains_key("Expected.1.Exists"));
    }
}
