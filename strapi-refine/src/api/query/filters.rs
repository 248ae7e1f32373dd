//! Filter compilation into Strapi's nested filter objects

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single `(field, operator, value)` filter as supplied by the admin panel
///
/// `field` may be a dotted path (`customer.address.city`) reaching into
/// relations; `operator` is passed through verbatim (`eq`, `containsi`, `in`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrudFilter {
    pub field: String,
    pub operator: String,
    pub value: Value,
}

impl CrudFilter {
    pub fn new(field: impl Into<String>, operator: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }
}

/// Compile filters into the object bound to the `filters` variable
///
/// `customer.name eq "Ann"` becomes `{"customer": {"name": {"eq": "Ann"}}}`.
/// Filters that share a top-level key do not merge: the last one replaces
/// everything the earlier ones put under that key.
pub fn compile_filters(filters: &[CrudFilter]) -> Map<String, Value> {
    let mut compiled = Map::new();

    for filter in filters {
        let (key, rest) = match filter.field.split_once('.') {
            Some((key, rest)) => (key, Some(rest)),
            None => (filter.field.as_str(), None),
        };

        let nested = match rest {
            None => {
                let mut condition = Map::new();
                condition.insert(filter.operator.clone(), filter.value.clone());
                condition
            }
            Some(rest) => compile_filters(&[CrudFilter {
                field: rest.to_string(),
                operator: filter.operator.clone(),
                value: filter.value.clone(),
            }]),
        };

        compiled.insert(key.to_string(), Value::Object(nested));
    }

    compiled
}
