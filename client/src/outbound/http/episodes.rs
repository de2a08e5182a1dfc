//! Episode deep-dive adapters.

use async_trait::async_trait;
use reqwest::Method;
use uuid::Uuid;

use super::client::{Auth, Deadline, HttpApiClient};
use super::dto::{EpisodeRecordDto, EpisodeSummaryDto, EpisodeSummaryRequestDto};
use crate::domain::ports::{ApiError, EpisodeApi};
use crate::domain::{AnswerFeedback, EpisodeDetail, EpisodeFeedbackRequest, EpisodeRecord};

fn episode_path(question_id: Uuid) -> String {
    format!("episodes/{question_id}")
}

#[async_trait]
impl EpisodeApi for HttpApiClient {
    async fn fetch_episode(&self, question_id: Uuid) -> Result<Option<EpisodeRecord>, ApiError> {
        let request = self.request(
            Method::GET,
            &episode_path(question_id),
            Auth::Bearer,
            Deadline::Standard,
        )?;
        let response = self.execute(request).await?;
        if response.is_not_found() {
            return Ok(None);
        }
        let record: EpisodeRecordDto = response.into_json()?;
        record.into_domain().map(Some)
    }

    async fn save_episode(
        &self,
        question_id: Uuid,
        detail: &EpisodeDetail,
    ) -> Result<EpisodeRecord, ApiError> {
        let request = self
            .request(
                Method::POST,
                &episode_path(question_id),
                Auth::Bearer,
                Deadline::Standard,
            )?
            .json(detail);
        let record: EpisodeRecordDto = self.execute(request).await?.into_json()?;
        record.into_domain()
    }

    async fn episode_feedback(
        &self,
        question_id: Uuid,
        request: &EpisodeFeedbackRequest,
    ) -> Result<AnswerFeedback, ApiError> {
        let path = format!("{}/feedback", episode_path(question_id));
        let prepared = self
            .request(Method::POST, &path, Auth::Bearer, Deadline::Generation)?
            .json(request);
        self.execute(prepared).await?.into_json()
    }

    async fn episode_summary(
        &self,
        question_id: Uuid,
        detail: &EpisodeDetail,
    ) -> Result<String, ApiError> {
        let path = format!("{}/summary", episode_path(question_id));
        let request = self
            .request(Method::POST, &path, Auth::Bearer, Deadline::Generation)?
            .json(&EpisodeSummaryRequestDto {
                episode_detail: detail,
            });
        let summary: EpisodeSummaryDto = self.execute(request).await?.into_json()?;
        Ok(summary.summary)
    }
}
