//! Strapi v4 GraphQL providers
//!
//! Translates the admin panel's generic CRUD and auth calls into GraphQL
//! documents following Strapi's schema conventions, sends them through a
//! [`Transport`] and reshapes the answers into uniform [`CrudResponse`]s.

pub mod auth;
pub mod error;
pub mod models;
pub mod naming;
pub mod operations;
pub mod provider;
pub mod query;
pub mod session;
pub mod transport;

#[cfg(test)]
pub(crate) mod mock;

pub use auth::{AuthProvider, DEFAULT_ALLOWED_ROLES};
pub use error::{ProviderError, Result};
pub use models::{CrudResponse, CustomRequest, MetaData, Method, Pagination, Role, UserIdentity};
pub use operations::OperationKind;
pub use provider::{DataProvider, ListParams};
pub use query::{CrudFilter, CrudSort, Field, QueryDocument, SortOrder, Variable, Variables};
pub use session::{FileTokenStore, MemoryTokenStore, Session, TokenStore};
pub use transport::{AuthContext, HttpTransport, Transport};
