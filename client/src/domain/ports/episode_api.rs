//! Driven port for episode deep-dives.

use async_trait::async_trait;
use uuid::Uuid;

use super::ApiError;
use crate::domain::{AnswerFeedback, EpisodeDetail, EpisodeFeedbackRequest, EpisodeRecord};

/// Port for the episode endpoints, keyed by question.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EpisodeApi: Send + Sync {
    /// Fetch the stored episode; `None` when the user has not written one.
    async fn fetch_episode(&self, question_id: Uuid) -> Result<Option<EpisodeRecord>, ApiError>;

    /// Create or replace the episode.
    async fn save_episode(
        &self,
        question_id: Uuid,
        detail: &EpisodeDetail,
    ) -> Result<EpisodeRecord, ApiError>;

    /// Ask for feedback comparing the episode with the original answer.
    async fn episode_feedback(
        &self,
        question_id: Uuid,
        request: &EpisodeFeedbackRequest,
    ) -> Result<AnswerFeedback, ApiError>;

    /// Generate a summary of the episode.
    async fn episode_summary(
        &self,
        question_id: Uuid,
        detail: &EpisodeDetail,
    ) -> Result<String, ApiError>;
}
