//! Error kinds raised by the data and auth providers

/// Discriminated failure of a provider call
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// The caller's request cannot be turned into a GraphQL document
    /// (e.g. a custom call without an operation name)
    Configuration(String),
    /// The HTTP round-trip failed or returned a non-success status
    Transport(String),
    /// The backend answered with a GraphQL `errors` array
    Graphql(Vec<String>),
    /// No session token, or the session's role is not allowed in
    Authorization(Option<String>),
    /// The response is missing the path the reshaper expects
    NotFound(String),
    /// The response could not be decoded into the expected type
    Decode(String),
    /// The token store could not be read or written
    Storage(String),
}

impl ProviderError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Authorization(Some(message.into()))
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    /// Whether the failure comes from the session rather than the request
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::Authorization(_))
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderError::Configuration(message) => write!(f, "configuration error: {}", message),
            ProviderError::Transport(message) => write!(f, "transport error: {}", message),
            ProviderError::Graphql(messages) => {
                write!(f, "GraphQL error: {}", messages.join("; "))
            }
            ProviderError::Authorization(Some(message)) => write!(f, "{}", message),
            ProviderError::Authorization(None) => write!(f, "not authenticated"),
            ProviderError::NotFound(path) => write!(f, "response has no value at '{}'", path),
            ProviderError::Decode(message) => write!(f, "failed to decode response: {}", message),
            ProviderError::Storage(message) => write!(f, "token storage error: {}", message),
        }
    }
}

impl std::error::Error for ProviderError {}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Transport(err.to_string())
    }
}

impl From<std::io::Error> for ProviderError {
    fn from(err: std::io::Error) -> Self {
        ProviderError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Decode(err.to_string())
    }
}

/// Result alias used throughout the providers
pub type Result<T> = std::result::Result<T, ProviderError>;
