//! Driven port for sign-in, account lookup and service health.

use async_trait::async_trait;

use super::ApiError;
use crate::domain::{AccessToken, Account, Credentials, Registration};

/// Port for the authentication endpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountApi: Send + Sync {
    /// Create an account and return its first token.
    async fn register(&self, registration: &Registration) -> Result<AccessToken, ApiError>;

    /// Exchange credentials for a token.
    async fn login(&self, credentials: &Credentials) -> Result<AccessToken, ApiError>;

    /// Describe the signed-in account.
    async fn me(&self) -> Result<Account, ApiError>;

    /// Report backend health as returned by the server.
    async fn health(&self) -> Result<serde_json::Value, ApiError>;
}
