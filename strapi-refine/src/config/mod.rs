//! Configuration loading
//!
//! Values come from `<config_dir>/strapi-refine/config.toml`, then from the
//! environment (including a `.env` file), then from command-line overrides.

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::DEFAULT_ALLOWED_ROLES;

/// Directory name under the user's config dir
pub const APP_DIR: &str = "strapi-refine";

pub const DEFAULT_ENDPOINT: &str = "http://localhost:1337/graphql";
pub const DEFAULT_TOKEN_KEY: &str = "orderdulu-seller-auth";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_ENDPOINT: &str = "STRAPI_GRAPHQL_URL";
pub const ENV_TOKEN_KEY: &str = "STRAPI_TOKEN_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GraphQL endpoint of the Strapi backend
    pub endpoint: String,
    /// Key the session token is stored under
    pub token_key: String,
    /// Roles allowed to sign in, compared case-insensitively
    pub allowed_roles: Vec<String>,
    /// HTTP timeout per request
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token_key: DEFAULT_TOKEN_KEY.to_string(),
            allowed_roles: DEFAULT_ALLOWED_ROLES.iter().map(|r| r.to_string()).collect(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// `<config_dir>/strapi-refine/config.toml`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("config.toml")
    }

    /// Load the config file (if any) and apply environment overrides
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        let mut config = Self::from_file(&Self::default_path())?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a config file; a missing file yields the defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply `STRAPI_GRAPHQL_URL` / `STRAPI_TOKEN_KEY` from `lookup`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup(ENV_ENDPOINT).filter(|v| !v.is_empty()) {
            debug!("Endpoint overridden by {}", ENV_ENDPOINT);
            self.endpoint = endpoint;
        }
        if let Some(key) = lookup(ENV_TOKEN_KEY).filter(|v| !v.is_empty()) {
            self.token_key = key;
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
