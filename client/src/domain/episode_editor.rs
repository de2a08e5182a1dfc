//! Episode deep-dive screen state.

use tracing::info;
use uuid::Uuid;

use super::ports::{EpisodeApi, QuestionnaireApi};
use super::{
    AnswerFeedback, EpisodeDetail, EpisodeFeedbackRequest, EpisodeField, EpisodeRecord,
    MethodType, Question, UserFacingError,
};

const SAVE_NEEDS_CONTENT: &str = "保存するには、少なくとも1つのフィールドに入力してください。";
const FEEDBACK_NEEDS_CONTENT: &str =
    "フィードバックを取得するには、少なくとも1つのフィールドに入力してください。";
const SUMMARY_NEEDS_CONTENT: &str =
    "まとめを生成するには、少なくとも1つのフィールドに入力してください。";

/// Draft of one episode together with the answer it elaborates.
#[derive(Debug, Clone)]
pub struct EpisodeEditor {
    question: Question,
    original_answer: String,
    draft: EpisodeDetail,
    stored: Option<EpisodeRecord>,
    feedback: Option<AnswerFeedback>,
}

impl EpisodeEditor {
    /// Load the question, its answer and any stored episode.
    pub async fn load(
        questionnaire: &dyn QuestionnaireApi,
        episodes: &dyn EpisodeApi,
        question_id: Uuid,
    ) -> Result<Self, UserFacingError> {
        let question = questionnaire
            .list_questions()
            .await
            .map_err(|error| UserFacingError::report_api("load questions", &error))?
            .into_iter()
            .find(|question| question.id == question_id)
            .ok_or_else(|| UserFacingError::not_found("質問が見つかりません"))?;
        let original_answer = questionnaire
            .fetch_answers()
            .await
            .map_err(|error| UserFacingError::report_api("load answers", &error))?
            .into_iter()
            .find(|answer| answer.question_id == question_id)
            .map(|answer| answer.answer_text)
            .unwrap_or_default();
        let stored = episodes
            .fetch_episode(question_id)
            .await
            .map_err(|error| UserFacingError::report_api("load episode", &error))?;

        Ok(Self::new(question, original_answer, stored))
    }

    /// Build an editor; a stored episode seeds the draft.
    pub fn new(question: Question, original_answer: String, stored: Option<EpisodeRecord>) -> Self {
        let draft = stored
            .as_ref()
            .map(|record| record.detail.clone())
            .unwrap_or_default();
        Self {
            question,
            original_answer,
            draft,
            stored,
            feedback: None,
        }
    }

    /// Question being elaborated.
    pub fn question(&self) -> &Question {
        &self.question
    }

    /// Answer originally given to the question.
    pub fn original_answer(&self) -> &str {
        &self.original_answer
    }

    /// Current draft.
    pub fn draft(&self) -> &EpisodeDetail {
        &self.draft
    }

    /// Episode as last stored on the server.
    pub fn stored(&self) -> Option<&EpisodeRecord> {
        self.stored.as_ref()
    }

    /// Latest feedback received.
    pub fn feedback(&self) -> Option<&AnswerFeedback> {
        self.feedback.as_ref()
    }

    /// Switch framework; entered fields are kept.
    pub fn switch_method(&mut self, method_type: MethodType) {
        self.draft.switch_method(method_type);
    }

    /// Edit one field of the draft.
    pub fn set_field(&mut self, field: EpisodeField, value: impl Into<String>) {
        self.draft.set_field(field, value);
    }

    fn require_content(&self, message: &str) -> Result<(), UserFacingError> {
        if self.draft.has_content() {
            Ok(())
        } else {
            Err(UserFacingError::invalid_input(message))
        }
    }

    /// Store the draft.
    pub async fn save(&mut self, api: &dyn EpisodeApi) -> Result<&EpisodeRecord, UserFacingError> {
        self.require_content(SAVE_NEEDS_CONTENT)?;
        let record = api
            .save_episode(self.question.id, &self.draft)
            .await
            .map_err(|error| UserFacingError::report_api("save episode", &error))?;
        info!(question_id = %self.question.id, method = record.detail.method_type.label(), "episode saved");
        Ok(self.stored.insert(record))
    }

    /// Request feedback comparing the draft with the original answer.
    pub async fn request_feedback(
        &mut self,
        api: &dyn EpisodeApi,
    ) -> Result<&AnswerFeedback, UserFacingError> {
        self.require_content(FEEDBACK_NEEDS_CONTENT)?;
        let request = EpisodeFeedbackRequest {
            original_answer: self.original_answer.clone(),
            episode_detail: self.draft.clone(),
        };
        let feedback = api
            .episode_feedback(self.question.id, &request)
            .await
            .map_err(|error| UserFacingError::report_api("episode feedback", &error))?;
        Ok(self.feedback.insert(feedback))
    }

    /// Generate a summary and write it into the draft.
    pub async fn generate_summary(&mut self, api: &dyn EpisodeApi) -> Result<&str, UserFacingError> {
        self.require_content(SUMMARY_NEEDS_CONTENT)?;
        let summary = api
            .episode_summary(self.question.id, &self.draft)
            .await
            .map_err(|error| UserFacingError::report_api("episode summary", &error))?;
        Ok(self.draft.summary.insert(summary).as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::{fixture, rstest};

    use crate::domain::ErrorCode;
    use crate::domain::UserAnswer;
    use crate::domain::ports::{ApiError, MockEpisodeApi, MockQuestionnaireApi};

    #[fixture]
    fn question() -> Question {
        Question {
            id: Uuid::new_v4(),
            category: "経験".to_owned(),
            question_text: "チームで成果を出した経験は？".to_owned(),
            display_order: 1,
            weight: 1.0,
            has_deep_dive: true,
        }
    }

    fn record(question_id: Uuid, detail: EpisodeDetail) -> EpisodeRecord {
        EpisodeRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            question_id,
            detail,
            ai_feedback: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn load_seeds_the_draft_from_the_stored_episode(question: Question) {
        let id = question.id;
        let mut detail = EpisodeDetail::new(MethodType::FiveWOneH);
        detail.set_field(EpisodeField::What, "文化祭の実行委員");
        let stored_detail = detail.clone();

        let mut questionnaire = MockQuestionnaireApi::new();
        questionnaire
            .expect_list_questions()
            .returning(move || Ok(vec![question.clone()]));
        questionnaire.expect_fetch_answers().returning(move || {
            Ok(vec![UserAnswer {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                question_id: id,
                answer_text: "文化祭を成功させた".to_owned(),
                embedding_id: None,
            }])
        });
        let mut episodes = MockEpisodeApi::new();
        episodes
            .expect_fetch_episode()
            .returning(move |question_id| Ok(Some(record(question_id, stored_detail.clone()))));

        let editor = EpisodeEditor::load(&questionnaire, &episodes, id)
            .await
            .expect("load editor");

        assert_eq!(editor.original_answer(), "文化祭を成功させた");
        assert_eq!(editor.draft(), &detail);
        assert!(editor.stored().is_some());
    }

    #[tokio::test]
    async fn unknown_questions_are_reported_as_not_found() {
        let mut questionnaire = MockQuestionnaireApi::new();
        questionnaire.expect_list_questions().returning(|| Ok(vec![]));
        questionnaire.expect_fetch_answers().never();
        let mut episodes = MockEpisodeApi::new();
        episodes.expect_fetch_episode().never();

        let error = EpisodeEditor::load(&questionnaire, &episodes, Uuid::new_v4())
            .await
            .expect_err("missing question");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn empty_drafts_are_refused_locally(question: Question) {
        let mut editor = EpisodeEditor::new(question, String::new(), None);
        editor.set_field(EpisodeField::Where, "大学");
        let mut api = MockEpisodeApi::new();
        api.expect_save_episode().never();
        api.expect_episode_feedback().never();
        api.expect_episode_summary().never();

        let save = editor.save(&api).await.expect_err("no content").message().to_owned();
        assert_eq!(save, SAVE_NEEDS_CONTENT);
        let feedback = editor.request_feedback(&api).await.expect_err("no content");
        assert_eq!(feedback.message(), FEEDBACK_NEEDS_CONTENT);
        let summary = editor.generate_summary(&api).await.expect_err("no content");
        assert_eq!(summary.message(), SUMMARY_NEEDS_CONTENT);
    }

    #[rstest]
    #[tokio::test]
    async fn generated_summary_lands_in_the_draft(question: Question) {
        let mut editor = EpisodeEditor::new(question, String::new(), None);
        editor.set_field(EpisodeField::Action, "役割分担を見直した");
        let mut api = MockEpisodeApi::new();
        api.expect_episode_summary()
            .withf(|_, detail| detail.action.as_deref() == Some("役割分担を見直した"))
            .returning(|_, _| Ok("役割を整理して納期を守った".to_owned()));

        let summary = editor.generate_summary(&api).await.expect("summary").to_owned();

        assert_eq!(summary, "役割を整理して納期を守った");
        assert_eq!(editor.draft().summary.as_deref(), Some(summary.as_str()));
    }

    #[rstest]
    #[tokio::test]
    async fn feedback_sends_the_original_answer(question: Question) {
        let mut editor = EpisodeEditor::new(question, "部活で主将".to_owned(), None);
        editor.set_field(EpisodeField::Situation, "部員が減っていた");
        let mut api = MockEpisodeApi::new();
        api.expect_episode_feedback()
            .withf(|_, request| request.original_answer == "部活で主将")
            .returning(|_, _| {
                Ok(AnswerFeedback {
                    feedback: "具体的です".to_owned(),
                    suggestions: vec!["数字を入れましょう".to_owned()],
                })
            });

        let feedback = editor.request_feedback(&api).await.expect("feedback");
        assert_eq!(feedback.suggestions.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn save_failures_keep_the_previous_record(question: Question) {
        let mut editor = EpisodeEditor::new(question, String::new(), None);
        editor.set_field(EpisodeField::Result, "優勝した");
        let mut api = MockEpisodeApi::new();
        api.expect_save_episode()
            .returning(|_, _| Err(ApiError::transport("connection reset")));

        let error = editor.save(&api).await.expect_err("transport failure");
        assert_eq!(error.code(), ErrorCode::NetworkError);
        assert!(editor.stored().is_none());
    }
}
