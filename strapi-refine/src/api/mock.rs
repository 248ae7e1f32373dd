//! Recording transport for provider tests

use crate::api::error::Result;
use crate::api::query::QueryDocument;
use crate::api::transport::{AuthContext, Transport};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

type Handler = dyn Fn(&QueryDocument) -> Result<Value> + Send + Sync;

/// One request seen by the mock
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub endpoint: String,
    pub headers: BTreeMap<String, String>,
    pub document: QueryDocument,
    pub auth: AuthContext,
}

/// Answers every request through a handler and records what was sent
#[derive(Clone)]
pub struct MockTransport {
    endpoint: String,
    headers: BTreeMap<String, String>,
    handler: Arc<Handler>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockTransport {
    pub const ENDPOINT: &'static str = "http://mock/graphql";

    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&QueryDocument) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            endpoint: Self::ENDPOINT.to_string(),
            headers: BTreeMap::new(),
            handler: Arc::new(handler),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Always answer with `data`
    pub fn returning(data: Value) -> Self {
        Self::new(move |_| Ok(data.clone()))
    }

    /// Calls made through this transport and any transport derived from it
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_call(&self) -> RecordedCall {
        self.calls().pop().expect("no request was made")
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, document: &QueryDocument, auth: &AuthContext) -> Result<Value> {
        self.calls.lock().unwrap().push(RecordedCall {
            endpoint: self.endpoint.clone(),
            headers: self.headers.clone(),
            document: document.clone(),
            auth: auth.clone(),
        });
        // Let sibling requests of a batch interleave
        tokio::task::yield_now().await;
        (self.handler)(document)
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn with_endpoint(&self, url: &str, headers: &BTreeMap<String, String>) -> Result<Arc<dyn Transport>> {
        Ok(Arc::new(MockTransport {
            endpoint: url.to_string(),
            headers: headers.clone(),
            handler: self.handler.clone(),
            calls: self.calls.clone(),
        }))
    }
}
