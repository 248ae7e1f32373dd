//! GraphQL query building
//!
//! Compiles admin-panel filters and sorts into Strapi's argument conventions
//! and renders query/mutation documents with typed variables.

pub mod builder;
pub mod filters;
pub mod sort;

pub use builder::{Field, OperationType, QueryDocument, Variable, Variables};
pub use filters::{CrudFilter, compile_filters};
pub use sort::{CrudSort, SortArg, SortOrder, compile_sort};
