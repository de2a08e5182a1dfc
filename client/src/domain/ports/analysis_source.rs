//! Driven port for fetching the computed analysis.

use async_trait::async_trait;

use super::ApiError;
use crate::domain::Analysis;

/// Port for reading the signed-in user's analysis.
///
/// Implementations report a missing analysis as
/// [`ApiError::NotYetAvailable`] so a poll session can retry it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnalysisSource: Send + Sync {
    /// Fetch the analysis once.
    async fn fetch_analysis(&self) -> Result<Analysis, ApiError>;
}
