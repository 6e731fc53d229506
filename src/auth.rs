//! Bearer token handling.
//!
//! The token is absent until a login succeeds and is then attached to every request
//! issued through the owning client. A later login overwrites it; there is no expiry
//! or refresh.

use http::header::AUTHORIZATION;
use http::{HeaderMap, HeaderValue};
use serde::Serialize;
use std::fmt;
use std::sync::{PoisonError, RwLock};

use crate::error::{FebosError, Result};

/// Login credentials, serialized as the login request body.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Guarded token slot. Writes are atomic with respect to concurrent readers; the last
/// write wins.
#[derive(Debug, Default)]
pub struct BearerAuth {
    token: RwLock<Option<String>>,
}

impl BearerAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_token(&self, token: impl Into<String>) {
        let mut slot = self.token.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(token.into());
    }

    pub fn get_token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn has_token(&self) -> bool {
        self.token.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    /// Adds `Authorization: Bearer <token>` when a token is set; otherwise leaves the
    /// headers untouched.
    pub fn decorate(&self, headers: &mut HeaderMap) -> Result<()> {
        if let Some(token) = self.get_token() {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| FebosError::Authentication(format!("token is not a valid header value: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decorate_passes_through_without_token() {
        let auth = BearerAuth::new();
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("caller"));
        auth.decorate(&mut headers).unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "caller");
        assert!(!auth.has_token());
    }

    #[test]
    fn decorate_adds_bearer_and_last_write_wins() {
        let auth = BearerAuth::new();
        auth.set_token("first");
        auth.set_token("abc123");
        let mut headers = HeaderMap::new();
        auth.decorate(&mut headers).unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc123");
        assert_eq!(auth.get_token().as_deref(), Some("abc123"));
    }

    #[test]
    fn credentials_debug_hides_password() {
        let creds = Credentials::new("user", "hunter2");
        let shown = format!("{creds:?}");
        assert!(shown.contains("user"));
        assert!(!shown.contains("hunter2"));
    }
}
