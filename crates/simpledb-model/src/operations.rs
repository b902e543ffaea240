//! SimpleDB operation enum.

use std::fmt;

/// All supported SimpleDB operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimpleDbOperation {
    // Domain management
    /// Create a domain.
    CreateDomain,
    /// Delete a domain and everything in it.
    DeleteDomain,
    /// List the domains of the account.
    ListDomains,
    /// Describe a domain's size and timestamps.
    DomainMetadata,

    // Query
    /// Run a select expression.
    Select,

    // Item CRUD
    /// Create or update attributes of one item.
    PutAttributes,
    /// Create or update attributes of up to 25 items.
    BatchPutAttributes,
    /// Read attributes of one item.
    GetAttributes,
    /// Delete attributes, or a whole item.
    DeleteAttributes,
}

impl SimpleDbOperation {
    /// Every operation, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::CreateDomain,
        Self::DeleteDomain,
        Self::ListDomains,
        Self::DomainMetadata,
        Self::Select,
        Self::PutAttributes,
        Self::BatchPutAttributes,
        Self::GetAttributes,
        Self::DeleteAttributes,
    ];

    /// Returns the `Action` parameter value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateDomain => "CreateDomain",
            Self::DeleteDomain => "DeleteDomain",
            Self::ListDomains => "ListDomains",
            Self::DomainMetadata => "DomainMetadata",
            Self::Select => "Select",
            Self::PutAttributes => "PutAttributes",
            Self::BatchPutAttributes => "BatchPutAttributes",
            Self::GetAttributes => "GetAttributes",
            Self::DeleteAttributes => "DeleteAttributes",
        }
    }

    /// Parse an `Action` name into a `SimpleDbOperation`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == name)
    }
}

impl fmt::Display for SimpleDbOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
