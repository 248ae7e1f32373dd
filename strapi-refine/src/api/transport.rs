//! GraphQL transport
//!
//! The providers talk to the backend through the [`Transport`] trait. The
//! bearer token travels with each call in an [`AuthContext`] instead of being
//! stored as a default header on a shared client.

use crate::api::error::{ProviderError, Result};
use crate::api::query::QueryDocument;
use async_trait::async_trait;
use log::{debug, trace};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Authorization attached to a single request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    token: Option<String>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self { token: None }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Value of the `Authorization` header, if any
    pub fn authorization(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }
}

/// A GraphQL-capable client
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the document and return the response's `data` member
    async fn execute(&self, document: &QueryDocument, auth: &AuthContext) -> Result<Value>;

    /// URL the transport posts to
    fn endpoint(&self) -> &str;

    /// A fresh transport for another endpoint carrying only `headers`
    fn with_endpoint(&self, url: &str, headers: &BTreeMap<String, String>) -> Result<Arc<dyn Transport>>;
}

#[derive(Debug, Deserialize)]
struct GraphQLResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQLErrorMessage>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorMessage {
    message: String,
}

/// reqwest-backed transport posting `{query, variables}` as JSON
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
    headers: BTreeMap<String, String>,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        Self::with_headers(endpoint, BTreeMap::new(), timeout)
    }

    pub fn with_headers(
        endpoint: impl Into<String>,
        headers: BTreeMap<String, String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            headers,
            timeout,
        })
    }

    /// Same timeout, another endpoint; none of this transport's headers carry over
    pub fn for_endpoint(&self, url: &str, headers: &BTreeMap<String, String>) -> Result<Self> {
        Self::with_headers(url, headers.clone(), self.timeout)
    }

    fn request(&self, document: &QueryDocument, auth: &AuthContext) -> reqwest::RequestBuilder {
        let mut request = self.client.post(&self.endpoint).json(document);
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(authorization) = auth.authorization() {
            request = request.header(reqwest::header::AUTHORIZATION, authorization);
        }
        request
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, document: &QueryDocument, auth: &AuthContext) -> Result<Value> {
        debug!("POST {}: {}", self.endpoint, document.query);
        trace!("Variables: {}", Value::Object(document.variables.clone()));

        let response = self.request(document, auth).send().await?;
        let status = response.status();
        let body = response.text().await?;

        debug!("Response status: {}", status);
        parse_response(status.as_u16(), &body)
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn with_endpoint(&self, url: &str, headers: &BTreeMap<String, String>) -> Result<Arc<dyn Transport>> {
        Ok(Arc::new(self.for_endpoint(url, headers)?))
    }
}

/// Extract `data` from a GraphQL response body
///
/// A non-empty `errors` array wins over the HTTP status, since GraphQL
/// servers report validation failures with 400 and a JSON body.
pub(crate) fn parse_response(status: u16, body: &str) -> Result<Value> {
    let parsed: GraphQLResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) if (200..300).contains(&status) => return Err(e.into()),
        Err(_) => {
            return Err(ProviderError::Transport(format!("HTTP {}: {}", status, body.trim())));
        }
    };

    if !parsed.errors.is_empty() {
        return Err(ProviderError::Graphql(
            parsed.errors.into_iter().map(|e| e.message).collect(),
        ));
    }

    if !(200..300).contains(&status) {
        return Err(ProviderError::Transport(format!("HTTP {}", status)));
    }

    match parsed.data {
        Some(Value::Null) | None => Err(ProviderError::not_found("data")),
        Some(data) => Ok(data),
    }
}
