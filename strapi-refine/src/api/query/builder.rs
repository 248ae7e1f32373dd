//! GraphQL document builder
//!
//! Assembles query and mutation documents from an operation name, typed
//! variables and a field selection. The assembly is purely syntactic: field
//! names are never checked against the backend schema.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A variable bound to the operation, with its declared GraphQL type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub value: Value,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub required: bool,
}

impl Variable {
    pub fn new(value: impl Into<Value>, type_name: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            type_name: type_name.into(),
            required: false,
        }
    }

    /// Mark the variable as non-null (`Type!`)
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Type as written in the document header
    pub fn declared_type(&self) -> String {
        if self.required && !self.type_name.ends_with('!') {
            format!("{}!", self.type_name)
        } else {
            self.type_name.clone()
        }
    }
}

/// Variables keyed by name; ordered so generated documents are stable
pub type Variables = BTreeMap<String, Variable>;

/// One entry of a selection set
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// A field name, or a raw selection such as `meta { pagination { total } }`
    Leaf(String),
    /// A field with a sub-selection
    Nested(String, Vec<Field>),
    /// A named sub-operation with its own arguments and selection
    Aliased {
        operation: String,
        fields: Vec<Field>,
        variables: Variables,
    },
}

impl Field {
    pub fn leaf(name: impl Into<String>) -> Self {
        Field::Leaf(name.into())
    }

    pub fn nested(name: impl Into<String>, children: Vec<Field>) -> Self {
        Field::Nested(name.into(), children)
    }

    /// Sub-operation without arguments
    pub fn aliased(operation: impl Into<String>, fields: Vec<Field>) -> Self {
        Field::Aliased {
            operation: operation.into(),
            fields,
            variables: Variables::new(),
        }
    }

    fn render(&self) -> Option<String> {
        match self {
            Field::Leaf(name) => {
                let name = name.trim();
                (!name.is_empty()).then(|| name.to_string())
            }
            Field::Nested(name, children) => Some(with_selection(name, children)),
            Field::Aliased {
                operation,
                fields,
                variables,
            } => Some(with_selection(&format!("{}{}", operation, arguments(variables)), fields)),
        }
    }

    fn collect_variables<'a>(&'a self, out: &mut BTreeMap<&'a str, &'a Variable>) {
        match self {
            Field::Leaf(_) => {}
            Field::Nested(_, children) => children.iter().for_each(|c| c.collect_variables(out)),
            Field::Aliased { fields, variables, .. } => {
                for (name, variable) in variables {
                    out.entry(name.as_str()).or_insert(variable);
                }
                fields.iter().for_each(|c| c.collect_variables(out));
            }
        }
    }
}

impl From<&str> for Field {
    fn from(name: &str) -> Self {
        Field::Leaf(name.to_string())
    }
}

impl From<String> for Field {
    fn from(name: String) -> Self {
        Field::Leaf(name)
    }
}

/// Root operation type of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    Query,
    Mutation,
}

impl OperationType {
    pub fn keyword(&self) -> &'static str {
        match self {
            OperationType::Query => "query",
            OperationType::Mutation => "mutation",
        }
    }
}

/// A compiled document plus the values bound to its variables
///
/// Serializes to the `{"query": ..., "variables": ...}` request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryDocument {
    pub query: String,
    pub variables: Map<String, Value>,
}

impl QueryDocument {
    pub fn query(operation: &str, variables: &Variables, fields: &[Field]) -> Self {
        Self::build(OperationType::Query, operation, variables, fields)
    }

    pub fn mutation(operation: &str, variables: &Variables, fields: &[Field]) -> Self {
        Self::build(OperationType::Mutation, operation, variables, fields)
    }

    pub fn build(kind: OperationType, operation: &str, variables: &Variables, fields: &[Field]) -> Self {
        // Top-level variables first, then those hoisted from sub-operations
        let mut declared: BTreeMap<&str, &Variable> =
            variables.iter().map(|(name, variable)| (name.as_str(), variable)).collect();
        fields.iter().for_each(|f| f.collect_variables(&mut declared));

        let header = if declared.is_empty() {
            kind.keyword().to_string()
        } else {
            let declarations = declared
                .iter()
                .map(|(name, variable)| format!("${}: {}", name, variable.declared_type()))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{} ({})", kind.keyword(), declarations)
        };

        let root = with_selection(&format!("{}{}", operation, arguments(variables)), fields);

        let values = declared
            .into_iter()
            .map(|(name, variable)| (name.to_string(), variable.value.clone()))
            .collect();

        Self {
            query: format!("{} {{ {} }}", header, root),
            variables: values,
        }
    }
}

/// ` (a: $a, b: $b)` or nothing
fn arguments(variables: &Variables) -> String {
    if variables.is_empty() {
        return String::new();
    }
    let args = variables
        .keys()
        .map(|name| format!("{}: ${}", name, name))
        .collect::<Vec<_>>()
        .join(", ");
    format!(" ({})", args)
}

/// `name { a, b }`, or just `name` when nothing is selected
fn with_selection(name: &str, fields: &[Field]) -> String {
    let rendered: Vec<String> = fields.iter().filter_map(Field::render).collect();
    if rendered.is_empty() {
        name.to_string()
    } else {
        format!("{} {{ {} }}", name, rendered.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_without_variables() {
        let doc = QueryDocument::query("me", &Variables::new(), &["id".into(), "username".into()]);
        assert_eq!(doc.query, "query { me { id, username } }");
        assert!(doc.variables.is_empty());
    }

    #[test]
    fn test_query_with_required_variable() {
        let mut variables = Variables::new();
        variables.insert("id".into(), Variable::new("7", "ID").required());

        let doc = QueryDocument::query(
            "order",
            &variables,
            &[Field::nested("data", vec!["id".into(), Field::nested("attributes", vec!["total".into()])])],
        );

        assert_eq!(
            doc.query,
            "query ($id: ID!) { order (id: $id) { data { id, attributes { total } } } }"
        );
        assert_eq!(Value::Object(doc.variables), json!({"id": "7"}));
    }

    #[test]
    fn test_required_type_is_not_doubled() {
        assert_eq!(Variable::new(1, "ID!").required().declared_type(), "ID!");
        assert_eq!(Variable::new(1, "ID!").declared_type(), "ID!");
        assert_eq!(Variable::new(1, "Int").declared_type(), "Int");
    }

    #[test]
    fn test_mutation_with_aliased_field() {
        let mut variables = Variables::new();
        variables.insert(
            "input".into(),
            Variable::new(json!({"data": {"name": "x"}}), "CreateOrderInput"),
        );

        let doc = QueryDocument::mutation("createOrder", &variables, &[Field::aliased("order", vec!["id".into()])]);

        assert_eq!(
            doc.query,
            "mutation ($input: CreateOrderInput) { createOrder (input: $input) { order { id } } }"
        );
        assert_eq!(Value::Object(doc.variables), json!({"input": {"data": {"name": "x"}}}));
    }

    #[test]
    fn test_aliased_variables_are_hoisted() {
        let mut nested = Variables::new();
        nested.insert("limit".into(), Variable::new(5, "Int"));

        let doc = QueryDocument::query(
            "me",
            &Variables::new(),
            &[Field::Aliased {
                operation: "orders".into(),
                fields: vec!["id".into()],
                variables: nested,
            }],
        );

        assert_eq!(doc.query, "query ($limit: Int) { me { orders (limit: $limit) { id } } }");
        assert_eq!(Value::Object(doc.variables), json!({"limit": 5}));
    }

    #[test]
    fn test_empty_leaves_and_selections_are_skipped() {
        let doc = QueryDocument::query(
            "orders",
            &Variables::new(),
            &[Field::nested("data", vec!["id".into(), "".into()]), Field::nested("meta", vec![])],
        );
        assert_eq!(doc.query, "query { orders { data { id }, meta } }");

        let bare = QueryDocument::mutation("logout", &Variables::new(), &[]);
        assert_eq!(bare.query, "mutation { logout }");
    }

    #[test]
    fn test_request_body_shape() {
        let mut variables = Variables::new();
        variables.insert("id".into(), Variable::new(1, "ID").required());
        let doc = QueryDocument::query("order", &variables, &["id".into()]);

        let body = serde_json::to_value(&doc).unwrap();
        assert_eq!(body["variables"], json!({"id": 1}));
        assert!(body["query"].as_str().unwrap().starts_with("query ($id: ID!)"));
    }
}
