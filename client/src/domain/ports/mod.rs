//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Every remote operation the client performs is expressed as a trait here;
//! `crate::outbound::http` provides the reqwest-backed implementations.

mod macros;
pub(crate) use macros::define_port_error;

mod account_api;
mod analysis_source;
mod api_error;
mod chat_api;
mod episode_api;
mod questionnaire_api;
mod session_token;

pub use account_api::AccountApi;
#[cfg(test)]
pub use account_api::MockAccountApi;
pub use analysis_source::AnalysisSource;
#[cfg(test)]
pub use analysis_source::MockAnalysisSource;
pub use api_error::ApiError;
pub use chat_api::ChatApi;
#[cfg(test)]
pub use chat_api::MockChatApi;
pub use episode_api::EpisodeApi;
#[cfg(test)]
pub use episode_api::MockEpisodeApi;
#[cfg(test)]
pub use questionnaire_api::MockQuestionnaireApi;
pub use questionnaire_api::QuestionnaireApi;
pub use session_token::{SessionTokenSource, SharedSessionToken, StaticSessionToken};
