//! Parsing of command-line arguments into provider types

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;

use strapi_refine::api::{CrudFilter, CrudSort, Field, MetaData, SortOrder, Variables};

use crate::cli::MetaArgs;

/// `createdAt:desc` -> `CrudSort`; a bare field sorts ascending
pub fn parse_sort(arg: &str) -> Result<CrudSort> {
    let (field, order) = match arg.rsplit_once(':') {
        Some((field, order)) => (field, order.parse::<SortOrder>().map_err(anyhow::Error::msg)?),
        None => (arg, SortOrder::Asc),
    };
    if field.is_empty() {
        anyhow::bail!("Sort directive '{}' has no field", arg);
    }
    Ok(CrudSort {
        field: field.to_string(),
        order,
    })
}

/// `customer.name:containsi=ann` -> `CrudFilter`
///
/// The value is parsed as JSON when possible (`total:gte=1000`,
/// `id:in=["1","2"]`), otherwise taken as a plain string.
pub fn parse_filter(arg: &str) -> Result<CrudFilter> {
    let (target, raw_value) = arg
        .split_once('=')
        .with_context(|| format!("Filter '{}' must look like field:operator=value", arg))?;
    let (field, operator) = target
        .split_once(':')
        .with_context(|| format!("Filter '{}' must look like field:operator=value", arg))?;
    if field.is_empty() || operator.is_empty() {
        anyhow::bail!("Filter '{}' must look like field:operator=value", arg);
    }

    Ok(CrudFilter::new(field, operator, parse_value(raw_value)))
}

/// JSON if it parses, a string otherwise
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Parse a JSON object argument
pub fn parse_object(raw: &str, what: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(raw).with_context(|| format!("{} is not valid JSON", what))?;
    if !value.is_object() {
        anyhow::bail!("{} must be a JSON object", what);
    }
    Ok(value)
}

/// `{"input": {"value": {...}, "type": "X", "required": true}}` -> `Variables`
pub fn parse_variables(raw: &str) -> Result<Variables> {
    serde_json::from_str(raw).context("Variables must be a JSON object of {name: {value, type, required}}")
}

/// `x-api-key:secret` -> (`x-api-key`, `secret`)
pub fn parse_headers(args: &[String]) -> Result<BTreeMap<String, String>> {
    args.iter()
        .map(|arg| {
            let (name, value) = arg
                .split_once(':')
                .with_context(|| format!("Header '{}' must look like name:value", arg))?;
            Ok::<_, anyhow::Error>((name.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

pub fn parse_fields(args: &[String]) -> Vec<Field> {
    args.iter().map(|f| Field::leaf(f.as_str())).collect()
}

/// `None` when no override was given, so provider defaults apply
pub fn meta_from_args(args: MetaArgs) -> Option<MetaData> {
    if args.operation.is_none() && args.fields.is_empty() {
        return None;
    }
    Some(MetaData {
        operation: args.operation,
        fields: (!args.fields.is_empty()).then(|| parse_fields(&args.fields)),
        variables: None,
    })
}

/// Ids are sent as strings, matching Strapi's `ID` scalar
pub fn parse_ids(ids: Vec<String>) -> Vec<Value> {
    ids.into_iter().map(Value::String).collect()
}
