//! Sort compilation into Strapi's `"field:order"` strings

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order '{}', expected asc or desc", other)),
        }
    }
}

/// A single sort directive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrudSort {
    pub field: String,
    pub order: SortOrder,
}

impl CrudSort {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Desc,
        }
    }
}

/// Compiled value of the `sort` variable
///
/// The `[String]` argument accepts either a string or nothing, so an empty
/// sort list is sent as an empty array rather than an empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortArg {
    Empty,
    Joined(String),
}

impl From<SortArg> for Value {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::Empty => Value::Array(Vec::new()),
            SortArg::Joined(joined) => Value::String(joined),
        }
    }
}

/// Join sort directives as `field:order` pairs separated by commas
pub fn compile_sort(sort: &[CrudSort]) -> SortArg {
    if sort.is_empty() {
        return SortArg::Empty;
    }

    let joined = sort
        .iter()
        .map(|s| format!("{}:{}", s.field, s.order.as_str()))
        .collect::<Vec<_>>()
        .join(",");

    SortArg::Joined(joined)
}
