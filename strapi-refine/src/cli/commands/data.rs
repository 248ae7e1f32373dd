//! CRUD and custom command handlers

use anyhow::{Context, Result};
use log::debug;

use strapi_refine::api::{CustomRequest, ListParams, Method, MetaData, Pagination};

use super::App;
use super::parse::{
    meta_from_args, parse_fields, parse_filter, parse_headers, parse_ids, parse_object, parse_sort, parse_variables,
};
use crate::cli::MetaArgs;

pub async fn list(
    app: &App,
    resource: &str,
    page: u32,
    page_size: u32,
    sort: &[String],
    filters: &[String],
    meta: MetaArgs,
) -> Result<()> {
    let params = ListParams {
        pagination: Some(Pagination::new(page, page_size)),
        sort: sort.iter().map(|s| parse_sort(s)).collect::<Result<_>>()?,
        filters: filters.iter().map(|f| parse_filter(f)).collect::<Result<_>>()?,
        meta: meta_from_args(meta),
    };
    debug!("Listing {} with {:?}", resource, params);

    let response = app
        .data
        .get_list(resource, params)
        .await
        .with_context(|| format!("Failed to list {}", resource))?;
    app.print(&response)
}

pub async fn get(app: &App, resource: &str, id: &str, meta: MetaArgs) -> Result<()> {
    let meta = meta_from_args(meta);
    let response = app
        .data
        .get_one(resource, id, meta.as_ref())
        .await
        .with_context(|| format!("Failed to fetch {} {}", resource, id))?;
    app.print(&response)
}

pub async fn get_many(app: &App, resource: &str, ids: Vec<String>, meta: MetaArgs) -> Result<()> {
    let meta = meta_from_args(meta);
    let response = app
        .data
        .get_many(resource, parse_ids(ids), meta.as_ref())
        .await
        .with_context(|| format!("Failed to fetch {}", resource))?;
    app.print(&response)
}

pub async fn create(app: &App, resource: &str, data: &[String], meta: MetaArgs) -> Result<()> {
    let mut items = data
        .iter()
        .map(|d| parse_object(d, "--data"))
        .collect::<Result<Vec<_>>>()?;
    let meta = meta_from_args(meta);

    if items.len() == 1 {
        let response = app
            .data
            .create(resource, items.remove(0), meta.as_ref())
            .await
            .with_context(|| format!("Failed to create {}", resource))?;
        app.print(&response)
    } else {
        let response = app
            .data
            .create_many(resource, items, meta.as_ref())
            .await
            .with_context(|| format!("Failed to create {}", resource))?;
        app.print(&response)
    }
}

pub async fn update(app: &App, resource: &str, ids: Vec<String>, data: &str, meta: MetaArgs) -> Result<()> {
    let variables = parse_object(data, "--data")?;
    let meta = meta_from_args(meta);
    let mut ids = parse_ids(ids);

    if ids.len() == 1 {
        let response = app
            .data
            .update(resource, ids.remove(0), variables, meta.as_ref())
            .await
            .with_context(|| format!("Failed to update {}", resource))?;
        app.print(&response)
    } else {
        let response = app
            .data
            .update_many(resource, ids, variables, meta.as_ref())
            .await
            .with_context(|| format!("Failed to update {}", resource))?;
        app.print(&response)
    }
}

pub async fn delete(app: &App, resource: &str, ids: Vec<String>, meta: MetaArgs) -> Result<()> {
    let meta = meta_from_args(meta);
    let mut ids = parse_ids(ids);

    if ids.len() == 1 {
        let response = app
            .data
            .delete_one(resource, ids.remove(0), meta.as_ref())
            .await
            .with_context(|| format!("Failed to delete {}", resource))?;
        app.print(&response)
    } else {
        let response = app
            .data
            .delete_many(resource, ids, meta.as_ref())
            .await
            .with_context(|| format!("Failed to delete {}", resource))?;
        app.print(&response)
    }
}

pub async fn custom(
    app: &App,
    operation: String,
    method: &str,
    fields: Vec<String>,
    variables: Option<&str>,
    url: Option<String>,
    headers: &[String],
) -> Result<()> {
    let method = method.parse::<Method>().map_err(anyhow::Error::msg)?;
    let meta = MetaData {
        operation: Some(operation.clone()),
        fields: Some(parse_fields(&fields)),
        variables: variables.map(parse_variables).transpose()?,
    };
    let request = CustomRequest {
        url,
        method,
        headers: parse_headers(headers)?,
        meta: Some(meta),
    };

    let response = app
        .data
        .custom(request)
        .await
        .with_context(|| format!("Custom operation {} failed", operation))?;
    app.print(&response)
}
