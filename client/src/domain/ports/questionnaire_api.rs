//! Driven port for questionnaire questions and answers.

use async_trait::async_trait;
use uuid::Uuid;

use super::ApiError;
use crate::domain::{AnswerFeedback, AnswerSubmission, Question, UserAnswer};

/// Port for the questionnaire endpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionnaireApi: Send + Sync {
    /// List every question.
    async fn list_questions(&self) -> Result<Vec<Question>, ApiError>;

    /// Submit a complete set of answers; the server acknowledges with an
    /// opaque JSON document and starts computing the analysis.
    async fn submit_answers(
        &self,
        submission: &AnswerSubmission,
    ) -> Result<serde_json::Value, ApiError>;

    /// Fetch stored answers. A user without answers yields an empty list.
    async fn fetch_answers(&self) -> Result<Vec<UserAnswer>, ApiError>;

    /// Replace the answer to one question.
    async fn update_answer(
        &self,
        question_id: Uuid,
        answer_text: &str,
    ) -> Result<UserAnswer, ApiError>;

    /// Ask for feedback on one answer.
    async fn answer_feedback(
        &self,
        question_id: Uuid,
        answer_text: &str,
    ) -> Result<AnswerFeedback, ApiError>;
}
