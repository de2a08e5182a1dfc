//! Editing answers after the initial submission.

use std::collections::{BTreeMap, BTreeSet};

use tracing::info;
use uuid::Uuid;

use super::ports::QuestionnaireApi;
use super::{AnswerFeedback, Question, UserAnswer, UserFacingError, answers_by_question};

const BLANK_ANSWER_MESSAGE: &str = "回答を入力してください";

/// Per-question drafts seeded from the stored answers.
#[derive(Debug, Clone, Default)]
pub struct AnswerEditor {
    questions: Vec<Question>,
    drafts: BTreeMap<Uuid, String>,
    saved: BTreeSet<Uuid>,
}

impl AnswerEditor {
    /// Build an editor from questions and the stored answers.
    pub fn new(mut questions: Vec<Question>, answers: &[UserAnswer]) -> Self {
        questions.sort_by_key(|question| question.display_order);
        Self {
            questions,
            drafts: answers_by_question(answers),
            saved: BTreeSet::new(),
        }
    }

    /// Load questions and stored answers.
    pub async fn load(api: &dyn QuestionnaireApi) -> Result<Self, UserFacingError> {
        let questions = api
            .list_questions()
            .await
            .map_err(|error| UserFacingError::report_api("load questions", &error))?;
        let answers = api
            .fetch_answers()
            .await
            .map_err(|error| UserFacingError::report_api("load answers", &error))?;
        Ok(Self::new(questions, &answers))
    }

    /// Whether the user has never submitted the questionnaire.
    pub fn needs_initial_submission(&self) -> bool {
        self.drafts.is_empty()
    }

    /// Questions in presentation order.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Current draft for `question_id`.
    pub fn draft(&self, question_id: Uuid) -> Option<&str> {
        self.drafts.get(&question_id).map(String::as_str)
    }

    /// Whether the draft for `question_id` was saved since its last edit.
    pub fn is_saved(&self, question_id: Uuid) -> bool {
        self.saved.contains(&question_id)
    }

    /// Edit a draft.
    pub fn set_draft(&mut self, question_id: Uuid, text: impl Into<String>) {
        self.drafts.insert(question_id, text.into());
        self.saved.remove(&question_id);
    }

    fn filled_draft(&self, question_id: Uuid) -> Result<&str, UserFacingError> {
        self.draft(question_id)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| UserFacingError::invalid_input(BLANK_ANSWER_MESSAGE))
    }

    /// Persist the draft for `question_id`.
    pub async fn save(
        &mut self,
        api: &dyn QuestionnaireApi,
        question_id: Uuid,
    ) -> Result<UserAnswer, UserFacingError> {
        let text = self.filled_draft(question_id)?.to_owned();
        let stored = api
            .update_answer(question_id, &text)
            .await
            .map_err(|error| UserFacingError::report_api("update answer", &error))?;
        info!(%question_id, "answer updated");
        self.saved.insert(question_id);
        Ok(stored)
    }

    /// Ask for feedback on the draft for `question_id`.
    pub async fn feedback(
        &self,
        api: &dyn QuestionnaireApi,
        question_id: Uuid,
    ) -> Result<AnswerFeedback, UserFacingError> {
        let text = self.filled_draft(question_id)?;
        api.answer_feedback(question_id, text)
            .await
            .map_err(|error| UserFacingError::report_api("answer feedback", &error))
    }
}
