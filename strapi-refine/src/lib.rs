//! Data and auth providers for admin panels backed by the Strapi v4 GraphQL API

pub mod api;
pub mod config;

pub use api::{AuthProvider, DataProvider, ProviderError};
pub use config::Config;
