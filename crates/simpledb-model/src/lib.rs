//! SimpleDB request model.
//!
//! - [`SimpleDbOperation`]: the operations the client can invoke
//! - [`input`]: one builder-constructed input per operation, each marshalling
//!   itself into indexed query parameters via [`SimpleDbRequest`]
//! - [`types`]: attribute and item records
//! - [`convert`]: adapters between records, flattened results and plain
//!   objects
//!
//! # Example
//!
//! ```
//! use simpledb_model::{PutAttributesInput, ReplaceableAttribute, SimpleDbRequest};
//!
//! let input = PutAttributesInput::builder()
//!     .domain_name("users")
//!     .item_name("u1")
//!     .attributes(vec![ReplaceableAttribute::replacing("color", "red")])
//!     .build();
//!
//! let params = input.to_params();
//! assert_eq!(params.get("Attribute.1.Name"), Some("color"));
//! assert_eq!(params.get("Attribute.1.Replace"), Some("true"));
//! ```

pub mod convert;
pub mod input;
pub mod operations;
pub mod types;

pub use convert::{
    ReplaceMode, attributes_from_result, attributes_to_object, items_from_result,
    items_to_object, object_to_attributes,
};
pub use input::{
    BatchPutAttributesInput, CreateDomainInput, DeleteAttributesInput, DeleteDomainInput,
    DomainMetadataInput, GetAttributesInput, ListDomainsInput, PutAttributesInput, RawInput,
    SelectInput, SimpleDbRequest,
};
pub use operations::SimpleDbOperation;
pub use types::{
    Attribute, AttributeRecords, DeletableAttribute, Item, ReplaceableAttribute, ReplaceableItem,
    UpdateCondition,
};
