//! Questionnaire and answer adapters.

use async_trait::async_trait;
use reqwest::Method;
use uuid::Uuid;

use super::client::{Auth, Deadline, HttpApiClient};
use super::dto::{AnswerListDto, AnswerTextDto, QuestionListDto};
use crate::domain::ports::{ApiError, QuestionnaireApi};
use crate::domain::{AnswerFeedback, AnswerSubmission, Question, UserAnswer};

#[async_trait]
impl QuestionnaireApi for HttpApiClient {
    async fn list_questions(&self) -> Result<Vec<Question>, ApiError> {
        let request = self.request(Method::GET, "questions", Auth::Anonymous, Deadline::Standard)?;
        let list: QuestionListDto = self.execute(request).await?.into_json()?;
        Ok(list.questions)
    }

    async fn submit_answers(
        &self,
        submission: &AnswerSubmission,
    ) -> Result<serde_json::Value, ApiError> {
        let request = self
            .request(Method::POST, "answers/submit", Auth::Bearer, Deadline::Standard)?
            .json(submission);
        self.execute(request).await?.into_json()
    }

    async fn fetch_answers(&self) -> Result<Vec<UserAnswer>, ApiError> {
        let request = self.request(Method::GET, "answers", Auth::Bearer, Deadline::Standard)?;
        let response = self.execute(request).await?;
        if response.is_not_found() {
            return Ok(Vec::new());
        }
        let list: AnswerListDto = response.into_json()?;
        Ok(list.answers)
    }

    async fn update_answer(
        &self,
        question_id: Uuid,
        answer_text: &str,
    ) -> Result<UserAnswer, ApiError> {
        let request = self
            .request(
                Method::PUT,
                &format!("answers/{question_id}"),
                Auth::Bearer,
                Deadline::Standard,
            )?
            .json(&AnswerTextDto { answer_text });
        self.execute(request).await?.into_json()
    }

    async fn answer_feedback(
        &self,
        question_id: Uuid,
        answer_text: &str,
    ) -> Result<AnswerFeedback, ApiError> {
        let request = self
            .request(
                Method::POST,
                &format!("answers/{question_id}/feedback"),
                Auth::Bearer,
                Deadline::Generation,
            )?
            .json(&AnswerTextDto { answer_text });
        self.execute(request).await?.into_json()
    }
}
