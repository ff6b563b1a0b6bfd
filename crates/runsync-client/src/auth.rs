//! Token authentication for the test-management service.

/// Environment variable holding a bearer token.
pub const TOKEN_ENV: &str = "RUNSYNC_TOKEN";

/// Token provider for service authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenProvider {
    /// Static bearer token.
    Static(String),

    /// No authentication.
    None,
}

impl TokenProvider {
    pub fn static_token(token: impl Into<String>) -> Self {
        Self::Static(token.into())
    }

    /// Read `RUNSYNC_TOKEN`; an unset or empty variable means no auth.
    pub fn from_env() -> Self {
        match std::env::var(TOKEN_ENV) {
            Ok(token) if !token.is_empty() => Self::Static(token),
            _ => Self::None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Static(token) => Some(token),
            Self::None => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl Default for TokenProvider {
    fn default() -> Self {
        Self::from_env()
    }
}
