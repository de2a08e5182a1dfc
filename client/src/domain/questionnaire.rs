//! Questionnaire model and answer form state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::UserFacingError;
use super::ports::QuestionnaireApi;

/// Message attached to a question left blank.
pub const REQUIRED_ANSWER_MESSAGE: &str = "この質問への回答は必須です";

fn default_weight() -> f64 {
    1.0
}

/// One questionnaire question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Question identifier.
    pub id: Uuid,
    /// Grouping category.
    pub category: String,
    /// Question text shown to the user.
    pub question_text: String,
    /// Position in the questionnaire.
    pub display_order: i32,
    /// Weight applied when the answer is embedded.
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Whether the question supports an episode deep-dive.
    #[serde(default)]
    pub has_deep_dive: bool,
}

/// A stored answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAnswer {
    /// Answer identifier.
    pub id: Uuid,
    /// Owner.
    pub user_id: Uuid,
    /// Question answered.
    pub question_id: Uuid,
    /// Answer body.
    pub answer_text: String,
    /// Embedding produced for retrieval, if any.
    #[serde(default)]
    pub embedding_id: Option<Uuid>,
}

/// One answer inside a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerEntry {
    /// Question answered.
    pub question_id: Uuid,
    /// Answer body.
    pub answer_text: String,
}

/// Body of `POST /answers/submit`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnswerSubmission {
    /// Answers in questionnaire order.
    pub answers: Vec<AnswerEntry>,
}

impl AnswerSubmission {
    /// Map question identifiers to submitted text.
    pub fn by_question(&self) -> BTreeMap<Uuid, String> {
        self.answers
            .iter()
            .map(|entry| (entry.question_id, entry.answer_text.clone()))
            .collect()
    }
}

/// Map stored answers by question identifier.
pub fn answers_by_question(answers: &[UserAnswer]) -> BTreeMap<Uuid, String> {
    answers
        .iter()
        .map(|answer| (answer.question_id, answer.answer_text.clone()))
        .collect()
}

/// Feedback on a single answer or episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerFeedback {
    /// Narrative feedback.
    pub feedback: String,
    /// Concrete improvement suggestions.
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Editable state of the initial questionnaire.
#[derive(Debug, Clone, Default)]
pub struct QuestionnaireForm {
    questions: Vec<Question>,
    answers: BTreeMap<Uuid, String>,
    errors: BTreeMap<Uuid, String>,
    submitting: bool,
}

impl QuestionnaireForm {
    /// Build a form; questions are presented in `display_order`.
    pub fn new(mut questions: Vec<Question>) -> Self {
        questions.sort_by_key(|question| question.display_order);
        Self {
            questions,
            ..Self::default()
        }
    }

    /// Load the questions from the API and build a form.
    pub async fn load(api: &dyn QuestionnaireApi) -> Result<Self, UserFacingError> {
        let questions = api
            .list_questions()
            .await
            .map_err(|error| UserFacingError::report_api("load questions", &error))?;
        Ok(Self::new(questions))
    }

    /// Questions in presentation order.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Current text for `question_id`.
    pub fn answer(&self, question_id: Uuid) -> Option<&str> {
        self.answers.get(&question_id).map(String::as_str)
    }

    /// Validation message for `question_id`, if any.
    pub fn error(&self, question_id: Uuid) -> Option<&str> {
        self.errors.get(&question_id).map(String::as_str)
    }

    /// Whether a submission is in progress.
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Update an answer; editing clears that question's validation error.
    pub fn set_answer(&mut self, question_id: Uuid, text: impl Into<String>) {
        self.answers.insert(question_id, text.into());
        self.errors.remove(&question_id);
    }

    /// Check that every question has a non-blank answer.
    pub fn validate(&mut self) -> bool {
        self.errors = self
            .questions
            .iter()
            .filter(|question| {
                self.answers
                    .get(&question.id)
                    .is_none_or(|text| text.trim().is_empty())
            })
            .map(|question| (question.id, REQUIRED_ANSWER_MESSAGE.to_owned()))
            .collect();
        self.errors.is_empty()
    }

    /// Build the submission body in questionnaire order.
    pub fn submission(&self) -> AnswerSubmission {
        AnswerSubmission {
            answers: self
                .questions
                .iter()
                .filter_map(|question| {
                    self.answers.get(&question.id).map(|text| AnswerEntry {
                        question_id: question.id,
                        answer_text: text.clone(),
                    })
                })
                .collect(),
        }
    }

    /// Validate and submit the answers.
    ///
    /// Validation failures never reach the network.
    pub async fn submit(
        &mut self,
        api: &dyn QuestionnaireApi,
    ) -> Result<serde_json::Value, UserFacingError> {
        if !self.validate() {
            debug!(missing = self.errors.len(), "questionnaire validation failed");
            return Err(UserFacingError::invalid_input(
                "未回答の質問があります。すべての質問に回答してください。",
            ));
        }

        self.submitting = true;
        let result = api.submit_answers(&self.submission()).await;
        self.submitting = false;
        result.map_err(|error| UserFacingError::report_api("submit answers", &error))
    }
}
