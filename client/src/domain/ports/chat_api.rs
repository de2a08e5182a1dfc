//! Driven port for the AI counselor.

use async_trait::async_trait;

use super::ApiError;
use crate::domain::GeneratedAnswer;

/// Port for generating counselor replies.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Generate a reply to `query_text`.
    async fn generate_answer(&self, query_text: &str) -> Result<GeneratedAnswer, ApiError>;
}
