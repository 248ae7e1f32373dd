//! Core operation kinds and their default GraphQL names

use crate::api::models::MetaData;
use crate::api::naming::{singularize, to_camel_case, to_pascal_case};
use crate::api::query::OperationType;

/// A CRUD operation the data provider can translate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// Paginated collection query (`orders`)
    List,
    /// Single item by id (`order`)
    GetOne,
    /// Several items by id through an `id_in` filter (`orders`)
    GetMany,
    /// `createOrder`
    Create,
    /// `updateOrder`
    Update,
    /// `deleteOrder`
    Delete,
}

impl OperationKind {
    /// Root field Strapi generates for this operation on `resource`
    pub fn default_name(&self, resource: &str) -> String {
        let singular = singularize(resource);
        match self {
            Self::List | Self::GetMany => to_camel_case(resource),
            Self::GetOne => to_camel_case(&singular),
            Self::Create => to_camel_case(&format!("create-{}", singular)),
            Self::Update => to_camel_case(&format!("update-{}", singular)),
            Self::Delete => to_camel_case(&format!("delete-{}", singular)),
        }
    }

    /// The caller's `meta.operation` if set, otherwise the default name
    pub fn resolve_name(&self, resource: &str, meta: Option<&MetaData>) -> String {
        meta.and_then(|m| m.operation.clone())
            .unwrap_or_else(|| self.default_name(resource))
    }

    /// Input object type of a single-argument mutation (`CreateOrderInput`)
    pub fn input_type(&self, resource: &str) -> String {
        format!("{}Input", to_pascal_case(&self.default_name(resource)))
    }

    /// Get the root operation type for this operation
    pub fn operation_type(&self) -> OperationType {
        match self {
            Self::List | Self::GetOne | Self::GetMany => OperationType::Query,
            Self::Create | Self::Update | Self::Delete => OperationType::Mutation,
        }
    }

    /// Get the operation kind as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::GetOne => "get_one",
            Self::GetMany => "get_many",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
