//! `GET /analysis` adapter.

use async_trait::async_trait;
use reqwest::Method;

use super::client::{Auth, Deadline, HttpApiClient};
use super::dto::into_analysis;
use crate::domain::Analysis;
use crate::domain::ports::{AnalysisSource, ApiError};

const ANALYSIS_PATH: &str = "analysis";

#[async_trait]
impl AnalysisSource for HttpApiClient {
    async fn fetch_analysis(&self) -> Result<Analysis, ApiError> {
        let request = self.request(Method::GET, ANALYSIS_PATH, Auth::Bearer, Deadline::Standard)?;
        let response = self.execute(request).await?;
        if response.is_not_found() {
            return Err(ApiError::not_yet_available("analysis"));
        }
        into_analysis(response.into_json()?)
    }
}
