//! Session token persistence
//!
//! The token lives in a synchronous key-value store. Login is the only writer
//! and logout the only remover; every request reads it to build its
//! [`AuthContext`].

use crate::api::error::{ProviderError, Result};
use crate::api::transport::AuthContext;
use log::{debug, warn};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

/// Synchronous key-value storage for the session token
pub trait TokenStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-process store, lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }
}

/// JSON object on disk, one entry per key; survives process restarts
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// `<config_dir>/strapi-refine/session.json`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::config::APP_DIR)
            .join("session.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str(&content)? {
            Value::Object(map) => Ok(map),
            _ => Err(ProviderError::Storage(format!(
                "{} does not contain a JSON object",
                self.path.display()
            ))),
        }
    }

    fn write(&self, entries: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        match self.read() {
            Ok(entries) => entries.get(key).and_then(Value::as_str).map(str::to_string),
            Err(e) => {
                warn!("Failed to read session file {}: {}", self.path.display(), e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.read()?;
        entries.insert(key.to_string(), Value::String(value.to_string()));
        self.write(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.read()?;
        if entries.remove(key).is_some() {
            self.write(&entries)?;
        }
        Ok(())
    }
}

/// The session token slot, shared by the data and auth providers
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn TokenStore>,
    key: String,
}

impl Session {
    pub fn new(store: Arc<dyn TokenStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Session backed by a fresh in-memory store
    pub fn in_memory(key: impl Into<String>) -> Self {
        Self::new(Arc::new(MemoryTokenStore::new()), key)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The stored token; empty strings count as absent
    pub fn token(&self) -> Option<String> {
        self.store.get(&self.key).filter(|t| !t.is_empty())
    }

    pub fn has_token(&self) -> bool {
        self.token().is_some()
    }

    pub fn set_token(&self, token: &str) -> Result<()> {
        debug!("Storing session token under '{}'", self.key);
        self.store.set(&self.key, token)
    }

    pub fn clear(&self) -> Result<()> {
        debug!("Removing session token '{}'", self.key);
        self.store.remove(&self.key)
    }

    /// Authorization to attach to the next request
    pub fn auth_context(&self) -> AuthContext {
        match self.token() {
            Some(token) => AuthContext::bearer(token),
            None => AuthContext::anonymous(),
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("key", &self.key)
            .field("has_token", &self.has_token())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.get("k"), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k"), Some("v".into()));
        store.remove("k").unwrap();
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_file_store_persists_between_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        FileTokenStore::new(&path).set("auth", "jwt-1").unwrap();
        FileTokenStore::new(&path).set("other", "x").unwrap();

        let reopened = FileTokenStore::new(&path);
        assert_eq!(reopened.get("auth"), Some("jwt-1".into()));
        assert_eq!(reopened.get("other"), Some("x".into()));

        reopened.remove("auth").unwrap();
        assert_eq!(FileTokenStore::new(&path).get("auth"), None);
        assert_eq!(FileTokenStore::new(&path).get("other"), Some("x".into()));
    }

    #[test]
    fn test_file_store_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("absent.json"));
        assert_eq!(store.get("auth"), None);
        assert!(store.remove("auth").is_ok());
    }

    #[test]
    fn test_file_store_refuses_to_overwrite_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{\"other\": \"x\"").unwrap();

        let store = FileTokenStore::new(&path);
        assert!(store.set("auth", "jwt-1").is_err());
        assert!(store.remove("other").is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"other\": \"x\"");

        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(store.set("auth", "jwt-1"), Err(ProviderError::Storage(_))));
    }

    #[test]
    fn test_session_auth_context() {
        let session = Session::in_memory("token");
        assert!(!session.has_token());
        assert_eq!(session.auth_context(), AuthContext::anonymous());

        session.set_token("abc").unwrap();
        assert_eq!(session.auth_context().authorization(), Some("Bearer abc".to_string()));

        session.clear().unwrap();
        assert_eq!(session.auth_context().authorization(), None);
    }

    #[test]
    fn test_empty_token_counts_as_absent() {
        let session = Session::in_memory("token");
        session.set_token("").unwrap();
        assert!(!session.has_token());
    }
}
