//! Episode deep-dive model (STAR and 5W1H frameworks).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Framework used to structure an episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MethodType {
    /// Situation, Task, Action, Result.
    #[default]
    #[serde(rename = "STAR")]
    Star,
    /// What, Why, When, Where, Who, How.
    #[serde(rename = "5W1H")]
    FiveWOneH,
}

impl MethodType {
    /// Wire label of the framework.
    pub fn label(self) -> &'static str {
        match self {
            Self::Star => "STAR",
            Self::FiveWOneH => "5W1H",
        }
    }
}

/// Fields a user can edit on an episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeField {
    /// STAR situation.
    Situation,
    /// STAR task.
    Task,
    /// STAR action.
    Action,
    /// STAR result.
    Result,
    /// 5W1H what.
    What,
    /// 5W1H why.
    Why,
    /// 5W1H when.
    When,
    /// 5W1H where.
    Where,
    /// 5W1H who.
    Who,
    /// 5W1H how.
    How,
    /// Free-text summary shared by both frameworks.
    Summary,
}

/// Editable episode detail.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EpisodeDetail {
    /// Framework in use.
    pub method_type: MethodType,
    /// STAR situation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub situation: Option<String>,
    /// STAR task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    /// STAR action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// STAR result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    /// 5W1H what.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub what: Option<String>,
    /// 5W1H why.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub why: Option<String>,
    /// 5W1H when.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when_detail: Option<String>,
    /// 5W1H where.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub where_detail: Option<String>,
    /// 5W1H who.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub who_detail: Option<String>,
    /// 5W1H how.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub how_detail: Option<String>,
    /// Summary of the episode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

fn filled(value: Option<&String>) -> bool {
    value.is_some_and(|text| !text.trim().is_empty())
}

impl EpisodeDetail {
    /// Start an empty episode with the given framework.
    pub fn new(method_type: MethodType) -> Self {
        Self {
            method_type,
            ..Self::default()
        }
    }

    /// Whether the framework's core fields carry any content.
    ///
    /// STAR needs one of situation, task, action or result; 5W1H needs what
    /// or why.
    ///
    /// # Examples
    /// ```
    /// use selfmap_client::domain::{EpisodeDetail, EpisodeField, MethodType};
    ///
    /// let mut detail = EpisodeDetail::new(MethodType::FiveWOneH);
    /// detail.set_field(EpisodeField::When, "2023年の夏");
    /// assert!(!detail.has_content());
    /// detail.set_field(EpisodeField::Why, "仲間を助けたかった");
    /// assert!(detail.has_content());
    /// ```
    pub fn has_content(&self) -> bool {
        match self.method_type {
            MethodType::Star => [&self.situation, &self.task, &self.action, &self.result]
                .into_iter()
                .any(|value| filled(value.as_ref())),
            MethodType::FiveWOneH => filled(self.what.as_ref()) || filled(self.why.as_ref()),
        }
    }

    /// Switch frameworks, keeping every field already entered.
    pub fn switch_method(&mut self, method_type: MethodType) {
        self.method_type = method_type;
    }

    /// Overwrite one field.
    pub fn set_field(&mut self, field: EpisodeField, value: impl Into<String>) {
        let value = Some(value.into());
        match field {
            EpisodeField::Situation => self.situation = value,
            EpisodeField::Task => self.task = value,
            EpisodeField::Action => self.action = value,
            EpisodeField::Result => self.result = value,
            EpisodeField::What => self.what = value,
            EpisodeField::Why => self.why = value,
            EpisodeField::When => self.when_detail = value,
            EpisodeField::Where => self.where_detail = value,
            EpisodeField::Who => self.who_detail = value,
            EpisodeField::How => self.how_detail = value,
            EpisodeField::Summary => self.summary = value,
        }
    }
}

/// Episode as stored by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeRecord {
    /// Episode identifier.
    pub id: Uuid,
    /// Owner.
    pub user_id: Uuid,
    /// Question the episode elaborates.
    pub question_id: Uuid,
    /// Editable content.
    pub detail: EpisodeDetail,
    /// Last feedback stored with the episode.
    pub ai_feedback: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /episodes/{question_id}/feedback`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EpisodeFeedbackRequest {
    /// Original questionnaire answer.
    pub original_answer: String,
    /// Episode to critique.
    pub episode_detail: EpisodeDetail,
}
