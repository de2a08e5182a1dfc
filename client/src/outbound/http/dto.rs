//! Wire payloads that do not map one-to-one onto domain types.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ports::ApiError;
use crate::domain::{Analysis, EpisodeDetail, EpisodeRecord, Question, UserAnswer};

#[derive(Debug, Deserialize)]
pub(super) struct QuestionListDto {
    pub(super) questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AnswerListDto {
    pub(super) answers: Vec<UserAnswer>,
}

#[derive(Debug, Serialize)]
pub(super) struct QueryTextDto<'a> {
    pub(super) query_text: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct AnswerTextDto<'a> {
    pub(super) answer_text: &'a str,
}

#[derive(Debug, Serialize)]
pub(super) struct EpisodeSummaryRequestDto<'a> {
    pub(super) episode_detail: &'a EpisodeDetail,
}

#[derive(Debug, Deserialize)]
pub(super) struct EpisodeSummaryDto {
    pub(super) summary: String,
}

#[derive(Debug, Serialize)]
pub(super) struct LoginFormDto<'a> {
    pub(super) username: &'a str,
    pub(super) password: &'a str,
}

/// Decode an analysis and reject payloads that break its invariants.
pub(super) fn into_analysis(analysis: Analysis) -> Result<Analysis, ApiError> {
    analysis
        .validate()
        .map_err(|error| ApiError::malformed_response(format!("invalid analysis: {error}")))?;
    Ok(analysis)
}

#[derive(Debug, Deserialize)]
pub(super) struct EpisodeRecordDto {
    id: Uuid,
    user_id: Uuid,
    question_id: Uuid,
    #[serde(flatten)]
    detail: EpisodeDetail,
    #[serde(default)]
    ai_feedback: Option<String>,
    created_at: String,
    updated_at: String,
}

impl EpisodeRecordDto {
    pub(super) fn into_domain(self) -> Result<EpisodeRecord, ApiError> {
        Ok(EpisodeRecord {
            id: self.id,
            user_id: self.user_id,
            question_id: self.question_id,
            detail: self.detail,
            ai_feedback: self.ai_feedback,
            created_at: parse_timestamp("created_at", &self.created_at)?,
            updated_at: parse_timestamp("updated_at", &self.updated_at)?,
        })
    }
}

/// Accept RFC 3339 timestamps, and zone-less ones as UTC.
fn parse_timestamp(field: &str, raw: &str) -> Result<DateTime<Utc>, ApiError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|error| {
            ApiError::malformed_response(format!("invalid {field} timestamp '{raw}': {error}"))
        })
}
