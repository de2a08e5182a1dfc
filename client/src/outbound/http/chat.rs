//! `POST /chat/answer` adapter.

use async_trait::async_trait;
use reqwest::Method;

use super::client::{Auth, Deadline, HttpApiClient};
use super::dto::QueryTextDto;
use crate::domain::GeneratedAnswer;
use crate::domain::ports::{ApiError, ChatApi};

#[async_trait]
impl ChatApi for HttpApiClient {
    async fn generate_answer(&self, query_text: &str) -> Result<GeneratedAnswer, ApiError> {
        let request = self
            .request(Method::POST, "chat/answer", Auth::Bearer, Deadline::Generation)?
            .json(&QueryTextDto { query_text });
        self.execute(request).await?.into_json()
    }
}
