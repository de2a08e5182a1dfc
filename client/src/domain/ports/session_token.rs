//! Driven port supplying the bearer token for authenticated calls.
//!
//! Adapters read the token through this port on every request instead of
//! consulting ambient state, so sign-in and sign-out take effect immediately
//! and tests can inject fixed tokens.

use std::sync::{Arc, PoisonError, RwLock};

/// Source of the current session's bearer token.
pub trait SessionTokenSource: Send + Sync {
    /// Return the bearer token, or `None` when no user is signed in.
    fn bearer_token(&self) -> Option<String>;
}

/// Token source fixed at construction time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticSessionToken(Option<String>);

impl StaticSessionToken {
    /// Build a source that always returns `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    /// Build a source with no signed-in user.
    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl SessionTokenSource for StaticSessionToken {
    fn bearer_token(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Token source updated after sign-in and shared between adapters.
///
/// # Examples
/// ```
/// use selfmap_client::domain::ports::{SessionTokenSource, SharedSessionToken};
///
/// let session = SharedSessionToken::default();
/// assert!(session.bearer_token().is_none());
/// session.sign_in("abc");
/// assert_eq!(session.bearer_token().as_deref(), Some("abc"));
/// session.sign_out();
/// assert!(session.bearer_token().is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SharedSessionToken(Arc<RwLock<Option<String>>>);

impl SharedSessionToken {
    /// Store a freshly issued token.
    pub fn sign_in(&self, token: impl Into<String>) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = Some(token.into());
    }

    /// Forget the current token.
    pub fn sign_out(&self) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl SessionTokenSource for SharedSessionToken {
    fn bearer_token(&self) -> Option<String> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .filter(|token| !token.trim().is_empty())
    }
}
