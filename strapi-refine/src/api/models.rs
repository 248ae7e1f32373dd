//! Request and response value types shared by the providers

use crate::api::query::{Field, Variables};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Per-call override bag: operation name, field selection and extra variables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetaData {
    pub operation: Option<String>,
    pub fields: Option<Vec<Field>>,
    pub variables: Option<Variables>,
}

impl MetaData {
    pub fn with_operation(operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..Self::default()
        }
    }

    pub fn with_fields(fields: Vec<Field>) -> Self {
        Self {
            fields: Some(fields),
            ..Self::default()
        }
    }

    pub fn fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn variables(mut self, variables: Variables) -> Self {
        self.variables = Some(variables);
        self
    }
}

/// Requested page, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current: u32,
    pub page_size: u32,
}

impl Pagination {
    pub const DEFAULT_CURRENT: u32 = 1;
    pub const DEFAULT_PAGE_SIZE: u32 = 10;

    pub fn new(current: u32, page_size: u32) -> Self {
        Self { current, page_size }
    }

    /// Replace zero values with the defaults
    pub fn resolved(self) -> Self {
        Self {
            current: if self.current == 0 { Self::DEFAULT_CURRENT } else { self.current },
            page_size: if self.page_size == 0 { Self::DEFAULT_PAGE_SIZE } else { self.page_size },
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current: Self::DEFAULT_CURRENT,
            page_size: Self::DEFAULT_PAGE_SIZE,
        }
    }
}

/// Uniform envelope returned by every data provider call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrudResponse<T> {
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

impl<T> CrudResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data, total: None }
    }

    pub fn with_total(data: T, total: u64) -> Self {
        Self { data, total: Some(total) }
    }
}

/// HTTP-style method of a custom call; only `Get` maps to a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Get,
    #[default]
    Post,
    Put,
    Patch,
    Delete,
}

impl std::str::FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(Method::Get),
            "post" => Ok(Method::Post),
            "put" => Ok(Method::Put),
            "patch" => Ok(Method::Patch),
            "delete" => Ok(Method::Delete),
            other => Err(format!("unknown method '{}'", other)),
        }
    }
}

/// Arguments of a custom passthrough call
#[derive(Debug, Clone, Default)]
pub struct CustomRequest {
    /// Alternate endpoint; when set, the call goes through a fresh client
    pub url: Option<String>,
    pub method: Method,
    /// Headers for the alternate endpoint client
    pub headers: BTreeMap<String, String>,
    pub meta: Option<MetaData>,
}

impl CustomRequest {
    pub fn query(meta: MetaData) -> Self {
        Self {
            method: Method::Get,
            meta: Some(meta),
            ..Self::default()
        }
    }

    pub fn mutation(meta: MetaData) -> Self {
        Self {
            method: Method::Post,
            meta: Some(meta),
            ..Self::default()
        }
    }
}

/// Role attached to the signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    #[serde(default)]
    pub id: Option<Value>,
    pub name: String,
}

/// Display identity of the signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: Value,
    pub username: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pagination_defaults() {
        assert_eq!(Pagination::default(), Pagination::new(1, 10));
        assert_eq!(Pagination::new(0, 0).resolved(), Pagination::new(1, 10));
        assert_eq!(Pagination::new(3, 25).resolved(), Pagination::new(3, 25));
    }

    #[test]
    fn test_envelope_omits_missing_total() {
        let single = CrudResponse::new(json!({"id": 1}));
        assert_eq!(serde_json::to_value(&single).unwrap(), json!({"data": {"id": 1}}));

        let list = CrudResponse::with_total(vec![json!({"id": 1})], 1);
        assert_eq!(serde_json::to_value(&list).unwrap(), json!({"data": [{"id": 1}], "total": 1}));
    }

    #[test]
    fn test_parse_method() {
        assert_eq!("GET".parse::<Method>(), Ok(Method::Get));
        assert_eq!("post".parse::<Method>(), Ok(Method::Post));
        assert!("fetch".parse::<Method>().is_err());
    }
}
