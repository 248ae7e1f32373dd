//! Auth provider backed by Strapi's users-permissions plugin
//!
//! A session is "signed in" while a token is stored. Login writes the token,
//! logout removes it, and every permission check re-fetches the role.

use crate::api::error::{ProviderError, Result};
use crate::api::models::{CustomRequest, MetaData, Role, UserIdentity};
use crate::api::provider::DataProvider;
use crate::api::query::{Field, Variable, Variables};
use crate::api::session::Session;
use crate::api::transport::AuthContext;
use log::{debug, info, warn};
use serde_json::{Value, json};

/// Roles allowed into the admin panel unless configured otherwise
pub const DEFAULT_ALLOWED_ROLES: &[&str] = &["SELLER", "INTERNAL"];

/// Message of the authorization error raised for missing or rejected sessions
pub const UNAUTHORIZED_MESSAGE: &str = "You are not allowed to access this application";

#[derive(Debug, Clone)]
pub struct AuthProvider {
    data: DataProvider,
    allowed_roles: Vec<String>,
}

impl AuthProvider {
    pub fn new(data: DataProvider) -> Self {
        Self {
            data,
            allowed_roles: DEFAULT_ALLOWED_ROLES.iter().map(|r| r.to_string()).collect(),
        }
    }

    /// Replace the role allow-list (matched case-insensitively)
    pub fn with_allowed_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_roles = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn session(&self) -> &Session {
        self.data.session()
    }

    pub fn allowed_roles(&self) -> &[String] {
        &self.allowed_roles
    }

    /// Exchange credentials for a token, store it and check the role
    ///
    /// A role outside the allow-list fails the login and leaves the session
    /// signed out.
    pub async fn login(&self, username: &str, password: &str) -> Result<Role> {
        let mut variables = Variables::new();
        variables.insert(
            "input".into(),
            Variable::new(
                json!({"identifier": username, "password": password}),
                "UsersPermissionsLoginInput",
            )
            .required(),
        );
        let meta = MetaData::with_operation("login")
            .fields(vec![
                Field::leaf("jwt"),
                Field::leaf("user {id, role {id, name}, username, email}"),
            ])
            .variables(variables);

        // Credentials are exchanged without whatever token is still stored
        let response = self
            .data
            .custom_as(CustomRequest::mutation(meta), AuthContext::anonymous())
            .await?;

        let jwt = response
            .data
            .get("jwt")
            .and_then(Value::as_str)
            .ok_or_else(|| ProviderError::not_found("login.jwt"))?;

        self.session().set_token(jwt)?;
        info!("Logged in as {}", username);

        self.get_permissions().await
    }

    /// Forget the stored token; never fails
    pub async fn logout(&self) -> Result<()> {
        if let Err(e) = self.session().clear() {
            warn!("Failed to clear session token: {}", e);
        }
        info!("Logged out");
        Ok(())
    }

    /// Succeeds iff a token is stored
    pub async fn check_auth(&self) -> Result<()> {
        if self.session().has_token() {
            Ok(())
        } else {
            Err(ProviderError::Authorization(None))
        }
    }

    /// Errors never force a logout
    pub async fn check_error(&self, error: &ProviderError) -> Result<()> {
        debug!("check_error: {}", error);
        Ok(())
    }

    /// Fetch the current role and check it against the allow-list
    ///
    /// Any failure signs the session out before the error is returned.
    pub async fn get_permissions(&self) -> Result<Role> {
        match self.fetch_allowed_role().await {
            Ok(role) => Ok(role),
            Err(e) => {
                warn!("Permission check failed: {}", e);
                self.logout().await?;
                Err(e)
            }
        }
    }

    async fn fetch_allowed_role(&self) -> Result<Role> {
        if !self.session().has_token() {
            return Err(ProviderError::unauthorized(UNAUTHORIZED_MESSAGE));
        }

        let meta = MetaData::with_operation("me")
            .fields(vec![Field::nested("role", vec![Field::leaf("name")])]);
        let mut response = self.data.custom(CustomRequest::query(meta)).await?;

        let role_value = response
            .data
            .get_mut("role")
            .map(Value::take)
            .ok_or_else(|| ProviderError::not_found("me.role"))?;
        let role: Role = serde_json::from_value(role_value)?;

        if !self.is_allowed(&role.name) {
            debug!("Role '{}' is not in {:?}", role.name, self.allowed_roles);
            return Err(ProviderError::unauthorized(UNAUTHORIZED_MESSAGE));
        }

        Ok(role)
    }

    fn is_allowed(&self, role: &str) -> bool {
        let role = role.to_uppercase();
        self.allowed_roles.iter().any(|allowed| allowed.to_uppercase() == role)
    }

    /// Id, username and email of the signed-in user
    pub async fn get_user_identity(&self) -> Result<UserIdentity> {
        if !self.session().has_token() {
            return Err(ProviderError::Authorization(None));
        }

        let meta = MetaData::with_operation("me").fields(vec![
            Field::leaf("id"),
            Field::leaf("username"),
            Field::leaf("email"),
        ]);
        let response = self.data.custom(CustomRequest::query(meta)).await?;

        Ok(serde_json::from_value(response.data)?)
    }
}
