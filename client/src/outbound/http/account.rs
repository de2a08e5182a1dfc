//! Authentication and health adapters.

use async_trait::async_trait;
use reqwest::Method;

use super::client::{Auth, Deadline, HttpApiClient};
use super::dto::LoginFormDto;
use crate::domain::ports::{AccountApi, ApiError};
use crate::domain::{AccessToken, Account, Credentials, Registration};

#[async_trait]
impl AccountApi for HttpApiClient {
    async fn register(&self, registration: &Registration) -> Result<AccessToken, ApiError> {
        let request = self
            .request(Method::POST, "auth/register", Auth::Anonymous, Deadline::Standard)?
            .json(registration);
        self.execute(request).await?.into_json()
    }

    async fn login(&self, credentials: &Credentials) -> Result<AccessToken, ApiError> {
        let request = self
            .request(Method::POST, "auth/login", Auth::Anonymous, Deadline::Standard)?
            .form(&LoginFormDto {
                username: &credentials.email,
                password: &credentials.password,
            });
        self.execute(request).await?.into_json()
    }

    async fn me(&self) -> Result<Account, ApiError> {
        let request = self.request(Method::GET, "auth/me", Auth::Bearer, Deadline::Standard)?;
        self.execute(request).await?.into_json()
    }

    async fn health(&self) -> Result<serde_json::Value, ApiError> {
        let request = self.request(Method::GET, "health", Auth::Anonymous, Deadline::Standard)?;
        self.execute(request).await?.into_json()
    }
}
