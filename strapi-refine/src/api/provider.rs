//! Strapi v4 data provider
//!
//! Translates admin-panel CRUD calls into GraphQL documents following
//! Strapi's conventions and reshapes the answers into [`CrudResponse`]s:
//! list items arrive as `{id, attributes: {...}}` and leave as
//! `{id, ...attributes}`.

use crate::api::error::{ProviderError, Result};
use crate::api::models::{CrudResponse, CustomRequest, Method, MetaData, Pagination};
use crate::api::naming::{filters_input_type, singularize, to_pascal_case};
use crate::api::operations::OperationKind;
use crate::api::query::{
    CrudFilter, CrudSort, Field, QueryDocument, Variable, Variables, compile_filters, compile_sort,
};
use crate::api::session::Session;
use crate::api::transport::{AuthContext, Transport};
use futures::future::try_join_all;
use log::debug;
use serde_json::{Map, Value, json};
use std::sync::Arc;

/// Selection fetching Strapi's pagination metadata
const PAGINATION_FIELDS: &str = "meta { pagination { page pageSize pageCount total } }";

/// Arguments of [`DataProvider::get_list`]
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub pagination: Option<Pagination>,
    pub sort: Vec<CrudSort>,
    pub filters: Vec<CrudFilter>,
    pub meta: Option<MetaData>,
}

/// GraphQL data provider for one Strapi backend
#[derive(Clone)]
pub struct DataProvider {
    transport: Arc<dyn Transport>,
    session: Session,
}

impl DataProvider {
    pub fn new(transport: Arc<dyn Transport>, session: Session) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The GraphQL endpoint requests go to
    pub fn get_api_url(&self) -> &str {
        self.transport.endpoint()
    }

    async fn request(&self, document: &QueryDocument) -> Result<Value> {
        self.transport.execute(document, &self.session.auth_context()).await
    }

    /// Paginated, sorted and filtered collection query
    pub async fn get_list(&self, resource: &str, params: ListParams) -> Result<CrudResponse<Vec<Value>>> {
        let pagination = params.pagination.unwrap_or_default().resolved();
        let meta = params.meta.as_ref();
        let operation = OperationKind::List.resolve_name(resource, meta);
        debug!("{} {} -> {}", OperationKind::List, resource, operation);

        let mut variables = meta_variables(meta);
        variables.insert("sort".into(), Variable::new(compile_sort(&params.sort), "[String]"));
        variables.insert(
            "filters".into(),
            Variable::new(Value::Object(compile_filters(&params.filters)), filters_input_type(resource)),
        );
        variables.insert(
            "pagination".into(),
            Variable::new(
                json!({"page": pagination.current, "pageSize": pagination.page_size}),
                "PaginationArg",
            ),
        );

        let fields = vec![
            Field::nested("data", item_fields(meta)),
            Field::leaf(PAGINATION_FIELDS),
        ];

        let document = QueryDocument::build(OperationKind::List.operation_type(), &operation, &variables, &fields);
        let root = take_root(self.request(&document).await?, &operation)?;

        let items = root
            .get("data")
            .and_then(Value::as_array)
            .ok_or_else(|| ProviderError::not_found(format!("{}.data", operation)))?;
        let data = items.iter().map(flatten_item).collect();

        let total = root
            .pointer("/meta/pagination/total")
            .and_then(Value::as_u64)
            .ok_or_else(|| ProviderError::not_found(format!("{}.meta.pagination.total", operation)))?;

        Ok(CrudResponse::with_total(data, total))
    }

    /// Single item by id
    pub async fn get_one(
        &self,
        resource: &str,
        id: impl Into<Value>,
        meta: Option<&MetaData>,
    ) -> Result<CrudResponse<Value>> {
        let operation = OperationKind::GetOne.resolve_name(resource, meta);
        debug!("{} {} -> {}", OperationKind::GetOne, resource, operation);

        let mut variables = meta_variables(meta);
        variables.insert("id".into(), Variable::new(id, "ID").required());

        let fields = vec![Field::nested("data", item_fields(meta))];
        let document = QueryDocument::build(OperationKind::GetOne.operation_type(), &operation, &variables, &fields);
        let root = take_root(self.request(&document).await?, &operation)?;

        // Strapi wraps the entity in `data`; a bare `{id, attributes}` is accepted as well
        let item = match root.get("data") {
            Some(Value::Object(_)) => &root["data"],
            Some(Value::Null) => return Err(ProviderError::not_found(format!("{}.data", operation))),
            _ => &root,
        };

        Ok(CrudResponse::new(flatten_item(item)))
    }

    /// Several items through an `id_in` filter; the answer is not reshaped
    pub async fn get_many(
        &self,
        resource: &str,
        ids: Vec<Value>,
        meta: Option<&MetaData>,
    ) -> Result<CrudResponse<Value>> {
        let operation = OperationKind::GetMany.resolve_name(resource, meta);
        debug!("{} {} ({} ids) -> {}", OperationKind::GetMany, resource, ids.len(), operation);

        let mut variables = meta_variables(meta);
        variables.insert("where".into(), Variable::new(json!({"id_in": ids}), "JSON"));

        let fields = meta.and_then(|m| m.fields.clone()).unwrap_or_default();
        let document = QueryDocument::build(OperationKind::GetMany.operation_type(), &operation, &variables, &fields);
        let root = take_root(self.request(&document).await?, &operation)?;

        Ok(CrudResponse::new(root))
    }

    /// `create<Singular>(input: {data})`, answered at `response[op][singular]`
    pub async fn create(&self, resource: &str, variables: Value, meta: Option<&MetaData>) -> Result<CrudResponse<Value>> {
        let singular = singularize(resource);
        let operation = OperationKind::Create.resolve_name(resource, meta);
        debug!("{} {} -> {}", OperationKind::Create, resource, operation);

        let mut gql_variables = meta_variables(meta);
        gql_variables.insert(
            "input".into(),
            Variable::new(json!({"data": variables}), OperationKind::Create.input_type(resource)),
        );

        let fields = entity_fields(&singular, meta);
        let document = QueryDocument::build(OperationKind::Create.operation_type(), &operation, &gql_variables, &fields);
        let root = take_root(self.request(&document).await?, &operation)?;

        Ok(CrudResponse::new(take_path(root, &operation, &singular)?))
    }

    /// One `create` per item, issued concurrently; results keep input order
    pub async fn create_many(
        &self,
        resource: &str,
        variables: Vec<Value>,
        meta: Option<&MetaData>,
    ) -> Result<CrudResponse<Vec<Value>>> {
        debug!("create_many {} ({} items)", resource, variables.len());
        let results = try_join_all(variables.into_iter().map(|item| self.create(resource, item, meta))).await?;
        Ok(CrudResponse::new(results.into_iter().map(|r| r.data).collect()))
    }

    /// `update<Singular>(id, data)`, answered at `response[op].data`
    ///
    /// Unlike create and delete, Strapi takes the id and the payload as two
    /// arguments here and answers with the `data` entity wrapper.
    pub async fn update(
        &self,
        resource: &str,
        id: impl Into<Value>,
        variables: Value,
        meta: Option<&MetaData>,
    ) -> Result<CrudResponse<Value>> {
        let singular = singularize(resource);
        let operation = OperationKind::Update.resolve_name(resource, meta);
        debug!("{} {} -> {}", OperationKind::Update, resource, operation);

        let mut gql_variables = meta_variables(meta);
        gql_variables.insert("id".into(), Variable::new(id, "ID!"));
        gql_variables.insert(
            "data".into(),
            Variable::new(variables, format!("{}Input!", to_pascal_case(&singular))),
        );

        let fields = vec![Field::aliased("data", item_fields(meta))];
        let document = QueryDocument::build(OperationKind::Update.operation_type(), &operation, &gql_variables, &fields);
        let root = take_root(self.request(&document).await?, &operation)?;
        let item = take_path(root, &operation, "data")?;

        Ok(CrudResponse::new(flatten_item(&item)))
    }

    /// One `update` per id, issued concurrently; results keep input order
    pub async fn update_many(
        &self,
        resource: &str,
        ids: Vec<Value>,
        variables: Value,
        meta: Option<&MetaData>,
    ) -> Result<CrudResponse<Vec<Value>>> {
        debug!("update_many {} ({} ids)", resource, ids.len());
        let results = try_join_all(
            ids.into_iter()
                .map(|id| self.update(resource, id, variables.clone(), meta)),
        )
        .await?;
        Ok(CrudResponse::new(results.into_iter().map(|r| r.data).collect()))
    }

    /// `delete<Singular>(input: {where: {id}})`, answered at `response[op][singular]`
    pub async fn delete_one(
        &self,
        resource: &str,
        id: impl Into<Value>,
        meta: Option<&MetaData>,
    ) -> Result<CrudResponse<Value>> {
        let singular = singularize(resource);
        let operation = OperationKind::Delete.resolve_name(resource, meta);
        debug!("{} {} -> {}", OperationKind::Delete, resource, operation);

        let mut variables = meta_variables(meta);
        variables.insert(
            "input".into(),
            Variable::new(
                json!({"where": {"id": id.into()}}),
                OperationKind::Delete.input_type(resource),
            ),
        );

        let fields = entity_fields(&singular, meta);
        let document = QueryDocument::build(OperationKind::Delete.operation_type(), &operation, &variables, &fields);
        let root = take_root(self.request(&document).await?, &operation)?;

        Ok(CrudResponse::new(take_path(root, &operation, &singular)?))
    }

    /// One `delete_one` per id, issued concurrently; results keep input order
    pub async fn delete_many(
        &self,
        resource: &str,
        ids: Vec<Value>,
        meta: Option<&MetaData>,
    ) -> Result<CrudResponse<Vec<Value>>> {
        debug!("delete_many {} ({} ids)", resource, ids.len());
        let results = try_join_all(ids.into_iter().map(|id| self.delete_one(resource, id, meta))).await?;
        Ok(CrudResponse::new(results.into_iter().map(|r| r.data).collect()))
    }

    /// Run an arbitrary named query (`Method::Get`) or mutation
    pub async fn custom(&self, request: CustomRequest) -> Result<CrudResponse<Value>> {
        self.custom_as(request, self.session.auth_context()).await
    }

    /// [`custom`](Self::custom) with an explicit authorization
    pub(crate) async fn custom_as(&self, request: CustomRequest, auth: AuthContext) -> Result<CrudResponse<Value>> {
        let meta = request.meta.as_ref().ok_or_else(|| {
            ProviderError::configuration("GraphQL needs operation, fields and variables values in the meta object")
        })?;
        let operation = meta
            .operation
            .as_deref()
            .ok_or_else(|| ProviderError::configuration("GraphQL operation name required"))?;

        let variables = meta.variables.clone().unwrap_or_default();
        let fields = meta.fields.clone().unwrap_or_default();
        let document = match request.method {
            Method::Get => QueryDocument::query(operation, &variables, &fields),
            _ => QueryDocument::mutation(operation, &variables, &fields),
        };
        debug!("custom {:?} {}", request.method, operation);

        let response = match request.url.as_deref().filter(|url| !url.is_empty()) {
            Some(url) => {
                // The session token is not forwarded to other endpoints
                let transport = self.transport.with_endpoint(url, &request.headers)?;
                transport.execute(&document, &AuthContext::anonymous()).await?
            }
            None => self.transport.execute(&document, &auth).await?,
        };

        Ok(CrudResponse::new(take_root(response, operation)?))
    }
}

impl std::fmt::Debug for DataProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataProvider")
            .field("endpoint", &self.transport.endpoint())
            .field("session", &self.session)
            .finish()
    }
}

fn meta_variables(meta: Option<&MetaData>) -> Variables {
    meta.and_then(|m| m.variables.clone()).unwrap_or_default()
}

/// `id` plus `attributes { <meta fields> }` when the caller asked for any
fn item_fields(meta: Option<&MetaData>) -> Vec<Field> {
    let mut fields = vec![Field::leaf("id")];
    if let Some(requested) = meta.and_then(|m| m.fields.as_ref()).filter(|f| !f.is_empty()) {
        fields.push(Field::nested("attributes", requested.clone()));
    }
    fields
}

/// Caller fields, or `<singular> { id }`
fn entity_fields(singular: &str, meta: Option<&MetaData>) -> Vec<Field> {
    meta.and_then(|m| m.fields.clone())
        .unwrap_or_else(|| vec![Field::aliased(singular, vec![Field::leaf("id")])])
}

/// `response[operation]`, which must be present and non-null
fn take_root(mut response: Value, operation: &str) -> Result<Value> {
    match response.get_mut(operation).map(Value::take) {
        Some(Value::Null) | None => Err(ProviderError::not_found(operation)),
        Some(root) => Ok(root),
    }
}

fn take_path(mut root: Value, operation: &str, key: &str) -> Result<Value> {
    match root.get_mut(key).map(Value::take) {
        Some(Value::Null) | None => Err(ProviderError::not_found(format!("{}.{}", operation, key))),
        Some(value) => Ok(value),
    }
}

/// `{id, attributes: {a, b}}` -> `{id, a, b}`
fn flatten_item(item: &Value) -> Value {
    let Some(object) = item.as_object() else {
        return item.clone();
    };

    let mut flat = Map::new();
    flat.insert("id".into(), object.get("id").cloned().unwrap_or(Value::Null));
    if let Some(Value::Object(attributes)) = object.get("attributes") {
        for (key, value) in attributes {
            flat.insert(key.clone(), value.clone());
        }
    }
    Value::Object(flat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockTransport;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn provider(mock: &MockTransport) -> DataProvider {
        DataProvider::new(Arc::new(mock.clone()), Session::in_memory("token"))
    }

    fn list_response() -> Value {
        json!({
            "orders": {
                "data": [
                    {"id": "1", "attributes": {"number": "INV-1", "total": 1000}},
                    {"id": "2", "attributes": {"number": "INV-2", "total": 2500}}
                ],
                "meta": {"pagination": {"page": 1, "pageSize": 10, "pageCount": 1, "total": 2}}
            }
        })
    }

    #[tokio::test]
    async fn test_get_list_reshapes_items() {
        let mock = MockTransport::returning(json!({
            "orders": {
                "data": [{"id": 1, "attributes": {"x": 1}}],
                "meta": {"pagination": {"page": 1, "pageSize": 10, "pageCount": 1, "total": 1}}
            }
        }));

        let result = provider(&mock).get_list("orders", ListParams::default()).await.unwrap();

        assert_eq!(result.data, vec![json!({"id": 1, "x": 1})]);
        assert_eq!(result.total, Some(1));
    }

    #[tokio::test]
    async fn test_get_list_document() {
        let mock = MockTransport::returning(list_response());
        let params = ListParams {
            pagination: Some(Pagination::new(2, 25)),
            sort: vec![CrudSort::desc("createdAt")],
            filters: vec![CrudFilter::new("customer.name", "containsi", "ann")],
            meta: Some(MetaData::with_fields(vec!["number".into(), "total".into()])),
        };

        let result = provider(&mock).get_list("orders", params).await.unwrap();
        assert_eq!(result.data[1], json!({"id": "2", "number": "INV-2", "total": 2500}));
        assert_eq!(result.total, Some(2));

        let call = mock.last_call();
        assert_eq!(
            call.document.query,
            "query ($filters: OrderFiltersInput, $pagination: PaginationArg, $sort: [String]) { \
             orders (filters: $filters, pagination: $pagination, sort: $sort) { \
             data { id, attributes { number, total } }, \
             meta { pagination { page pageSize pageCount total } } } }"
        );
        assert_eq!(
            Value::Object(call.document.variables),
            json!({
                "filters": {"customer": {"name": {"containsi": "ann"}}},
                "pagination": {"page": 2, "pageSize": 25},
                "sort": "createdAt:desc"
            })
        );
    }

    #[tokio::test]
    async fn test_get_list_defaults() {
        let mock = MockTransport::returning(list_response());
        provider(&mock).get_list("orders", ListParams::default()).await.unwrap();

        let call = mock.last_call();
        assert_eq!(call.document.variables["pagination"], json!({"page": 1, "pageSize": 10}));
        assert_eq!(call.document.variables["sort"], json!([]));
        assert_eq!(call.document.variables["filters"], json!({}));
        assert!(call.document.query.contains("data { id }"));
    }

    #[tokio::test]
    async fn test_get_list_operation_override_and_extra_variables() {
        let mock = MockTransport::returning(json!({
            "sellerOrders": {"data": [], "meta": {"pagination": {"total": 0}}}
        }));
        let mut extra = Variables::new();
        extra.insert("locale".into(), Variable::new("id", "I18NLocaleCode"));
        let params = ListParams {
            meta: Some(MetaData::with_operation("sellerOrders").variables(extra)),
            ..ListParams::default()
        };

        let result = provider(&mock).get_list("orders", params).await.unwrap();
        assert!(result.data.is_empty());
        assert_eq!(result.total, Some(0));

        let call = mock.last_call();
        assert!(call.document.query.contains("sellerOrders ("));
        assert!(call.document.query.contains("$locale: I18NLocaleCode"));
        assert_eq!(call.document.variables["locale"], json!("id"));
    }

    #[tokio::test]
    async fn test_get_list_missing_root_is_not_found() {
        let mock = MockTransport::returning(json!({"orders": null}));
        let err = provider(&mock).get_list("orders", ListParams::default()).await.unwrap_err();
        assert_eq!(err, ProviderError::not_found("orders"));
    }

    #[tokio::test]
    async fn test_get_one() {
        let mock = MockTransport::returning(json!({
            "order": {"data": {"id": "5", "attributes": {"number": "INV-5"}}}
        }));
        let meta = MetaData::with_fields(vec!["number".into()]);

        let result = provider(&mock).get_one("orders", "5", Some(&meta)).await.unwrap();
        assert_eq!(result.data, json!({"id": "5", "number": "INV-5"}));
        assert_eq!(result.total, None);

        let call = mock.last_call();
        assert_eq!(
            call.document.query,
            "query ($id: ID!) { order (id: $id) { data { id, attributes { number } } } }"
        );
        assert_eq!(call.document.variables["id"], json!("5"));
    }

    #[tokio::test]
    async fn test_get_one_accepts_unwrapped_entity() {
        let mock = MockTransport::returning(json!({"order": {"id": "5", "attributes": {"number": "INV-5"}}}));
        let result = provider(&mock).get_one("orders", "5", None).await.unwrap();
        assert_eq!(result.data, json!({"id": "5", "number": "INV-5"}));
    }

    #[tokio::test]
    async fn test_get_one_missing_entity() {
        let mock = MockTransport::returning(json!({"order": {"data": null}}));
        let err = provider(&mock).get_one("orders", "404", None).await.unwrap_err();
        assert_eq!(err, ProviderError::not_found("order.data"));
    }

    #[tokio::test]
    async fn test_get_many_is_not_reshaped() {
        let raw = json!([{"id": "1", "number": "INV-1"}]);
        let mock = MockTransport::returning(json!({"orders": raw.clone()}));
        let meta = MetaData::with_fields(vec!["id".into(), "number".into()]);

        let result = provider(&mock)
            .get_many("orders", vec![json!("1"), json!("2")], Some(&meta))
            .await
            .unwrap();
        assert_eq!(result.data, raw);

        let call = mock.last_call();
        assert_eq!(call.document.query, "query ($where: JSON) { orders (where: $where) { id, number } }");
        assert_eq!(call.document.variables["where"], json!({"id_in": ["1", "2"]}));
    }

    #[tokio::test]
    async fn test_create() {
        let mock = MockTransport::returning(json!({"createOrder": {"order": {"id": "9"}}}));

        let result = provider(&mock)
            .create("orders", json!({"number": "INV-9"}), None)
            .await
            .unwrap();
        assert_eq!(result.data, json!({"id": "9"}));

        let call = mock.last_call();
        assert_eq!(
            call.document.query,
            "mutation ($input: CreateOrderInput) { createOrder (input: $input) { order { id } } }"
        );
        assert_eq!(call.document.variables["input"], json!({"data": {"number": "INV-9"}}));
    }

    #[tokio::test]
    async fn test_create_with_caller_fields() {
        let mock = MockTransport::returning(json!({"createOrder": {"order": {"id": "9", "number": "INV-9"}}}));
        let meta = MetaData::with_fields(vec![Field::nested("order", vec!["id".into(), "number".into()])]);

        let result = provider(&mock)
            .create("orders", json!({"number": "INV-9"}), Some(&meta))
            .await
            .unwrap();
        assert_eq!(result.data, json!({"id": "9", "number": "INV-9"}));
        assert!(mock.last_call().document.query.ends_with("{ order { id, number } } }"));
    }

    #[tokio::test]
    async fn test_create_many_fans_out_in_order() {
        let counter = Arc::new(AtomicUsize::new(0));
        let seen = counter.clone();
        let mock = MockTransport::new(move |doc| {
            seen.fetch_add(1, Ordering::SeqCst);
            let number = doc.variables["input"]["data"]["number"].clone();
            Ok(json!({"createOrder": {"order": {"id": number}}}))
        });

        let result = provider(&mock)
            .create_many(
                "orders",
                vec![json!({"number": 1}), json!({"number": 2}), json!({"number": 3})],
                None,
            )
            .await
            .unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_eq!(mock.call_count(), 3);
        assert_eq!(result.data, vec![json!({"id": 1}), json!({"id": 2}), json!({"id": 3})]);
    }

    #[tokio::test]
    async fn test_create_many_fails_when_one_item_fails() {
        let mock = MockTransport::new(|doc| {
            if doc.variables["input"]["data"]["number"] == json!(2) {
                Err(ProviderError::Graphql(vec!["duplicate number".into()]))
            } else {
                Ok(json!({"createOrder": {"order": {"id": "x"}}}))
            }
        });

        let err = provider(&mock)
            .create_many(
                "orders",
                vec![json!({"number": 1}), json!({"number": 2}), json!({"number": 3})],
                None,
            )
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::Graphql(vec!["duplicate number".into()]));
    }

    #[tokio::test]
    async fn test_update() {
        let mock = MockTransport::returning(json!({
            "updateOrder": {"data": {"id": "3", "attributes": {"status": "paid"}}}
        }));
        let meta = MetaData::with_fields(vec!["status".into()]);

        let result = provider(&mock)
            .update("orders", "3", json!({"status": "paid"}), Some(&meta))
            .await
            .unwrap();
        assert_eq!(result.data, json!({"id": "3", "status": "paid"}));

        let call = mock.last_call();
        assert_eq!(
            call.document.query,
            "mutation ($data: OrderInput!, $id: ID!) { updateOrder (data: $data, id: $id) { \
             data { id, attributes { status } } } }"
        );
        assert_eq!(call.document.variables["id"], json!("3"));
        assert_eq!(call.document.variables["data"], json!({"status": "paid"}));
    }

    #[tokio::test]
    async fn test_update_many() {
        let mock = MockTransport::new(|doc| {
            let id = doc.variables["id"].clone();
            Ok(json!({"updateOrder": {"data": {"id": id, "attributes": {"status": "sent"}}}}))
        });

        let result = provider(&mock)
            .update_many("orders", vec![json!("1"), json!("2")], json!({"status": "sent"}), None)
            .await
            .unwrap();

        assert_eq!(
            result.data,
            vec![json!({"id": "1", "status": "sent"}), json!({"id": "2", "status": "sent"})]
        );
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_delete_one() {
        let mock = MockTransport::returning(json!({"deleteOrder": {"order": {"id": "4"}}}));

        let result = provider(&mock).delete_one("orders", "4", None).await.unwrap();
        assert_eq!(result.data, json!({"id": "4"}));

        let call = mock.last_call();
        assert_eq!(
            call.document.query,
            "mutation ($input: DeleteOrderInput) { deleteOrder (input: $input) { order { id } } }"
        );
        assert_eq!(call.document.variables["input"], json!({"where": {"id": "4"}}));
    }

    #[tokio::test]
    async fn test_delete_many() {
        let mock = MockTransport::new(|doc| {
            let id = doc.variables["input"]["where"]["id"].clone();
            Ok(json!({"deleteOrder": {"order": {"id": id}}}))
        });

        let result = provider(&mock)
            .delete_many("orders", vec![json!("7"), json!("8")], None)
            .await
            .unwrap();
        assert_eq!(result.data, vec![json!({"id": "7"}), json!({"id": "8"})]);
    }

    #[tokio::test]
    async fn test_requests_carry_session_token() {
        let mock = MockTransport::returning(json!({"order": {"data": {"id": "1", "attributes": {}}}}));
        let data = provider(&mock);

        data.get_one("orders", "1", None).await.unwrap();
        assert_eq!(mock.last_call().auth, AuthContext::anonymous());

        data.session().set_token("jwt-123").unwrap();
        data.get_one("orders", "1", None).await.unwrap();
        assert_eq!(mock.last_call().auth.authorization(), Some("Bearer jwt-123".into()));
    }

    #[tokio::test]
    async fn test_custom_requires_operation() {
        let mock = MockTransport::returning(json!({}));
        let data = provider(&mock);

        let err = data.custom(CustomRequest::default()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));

        let err = data
            .custom(CustomRequest::query(MetaData::with_fields(vec!["id".into()])))
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::configuration("GraphQL operation name required"));

        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_custom_query_and_mutation() {
        let mock = MockTransport::returning(json!({"me": {"id": "1"}}));
        let data = provider(&mock);

        let meta = MetaData::with_operation("me").fields(vec!["id".into()]);
        let result = data.custom(CustomRequest::query(meta.clone())).await.unwrap();
        assert_eq!(result.data, json!({"id": "1"}));
        assert_eq!(mock.last_call().document.query, "query { me { id } }");

        data.custom(CustomRequest::mutation(meta)).await.unwrap();
        assert_eq!(mock.last_call().document.query, "mutation { me { id } }");
    }

    #[tokio::test]
    async fn test_custom_alternate_endpoint() {
        let mock = MockTransport::returning(json!({"ping": "pong"}));
        let data = provider(&mock);
        data.session().set_token("jwt").unwrap();

        let mut headers = BTreeMap::new();
        headers.insert("x-api-key".to_string(), "secret".to_string());
        let request = CustomRequest {
            url: Some("http://other/graphql".into()),
            method: Method::Get,
            headers,
            meta: Some(MetaData::with_operation("ping")),
        };

        let result = data.custom(request).await.unwrap();
        assert_eq!(result.data, json!("pong"));

        let call = mock.last_call();
        assert_eq!(call.endpoint, "http://other/graphql");
        assert_eq!(call.headers.get("x-api-key").map(String::as_str), Some("secret"));
        assert_eq!(call.auth, AuthContext::anonymous());
        assert_eq!(data.get_api_url(), MockTransport::ENDPOINT);
    }

    #[test]
    fn test_flatten_item() {
        assert_eq!(
            flatten_item(&json!({"id": 1, "attributes": {"a": 1, "b": {"c": 2}}})),
            json!({"id": 1, "a": 1, "b": {"c": 2}})
        );
        assert_eq!(flatten_item(&json!({"id": 1})), json!({"id": 1}));
        assert_eq!(flatten_item(&json!("raw")), json!("raw"));
    }

    #[tokio::test]
    async fn test_operation_kind_picks_document_type() {
        let mock = MockTransport::returning(json!({
            "sellerOrder": {"data": {"id": "1", "attributes": {}}, "order": {"id": "1"}}
        }));
        let data = provider(&mock);
        let meta = MetaData::with_operation("sellerOrder");

        data.get_one("orders", "1", Some(&meta)).await.unwrap();
        assert!(mock.last_call().document.query.starts_with("query "));

        data.create("orders", json!({}), Some(&meta)).await.unwrap();
        assert!(mock.last_call().document.query.starts_with("mutation "));

        data.update("orders", json!("1"), json!({}), Some(&meta)).await.unwrap();
        assert!(mock.last_call().document.query.starts_with("mutation "));

        data.delete_one("orders", json!("1"), Some(&meta)).await.unwrap();
        assert!(mock.last_call().document.query.starts_with("mutation "));
    }
}
