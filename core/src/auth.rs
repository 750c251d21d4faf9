//! Bearer credential attached to outgoing calls.

use crate::http::AUTHORIZATION;

/// Holder of the current session token.
///
/// Absent by default. There is no refresh or expiry tracking: the token is a
/// static credential until replaced.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    token: Option<String>,
}

impl AuthContext {
    /// An empty token is treated as no token.
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()),
        }
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self::new(Some(token.into()))
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// The `Authorization` header for this context, if a token is set.
    pub fn header(&self) -> Option<(String, String)> {
        self.token
            .as_ref()
            .map(|token| (AUTHORIZATION.to_string(), format!("Token {token}")))
    }
}

// Keep the token out of logs and panic messages.
impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
