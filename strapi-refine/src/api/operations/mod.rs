//! Strapi CRUD operations
//!
//! Maps each admin-panel operation onto the GraphQL root field Strapi
//! generates for a collection.

pub mod operation;

pub use operation::OperationKind;
