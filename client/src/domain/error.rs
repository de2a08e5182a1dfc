//! User-facing error messages.
//!
//! Port errors are logged for diagnostics and then translated into a
//! localized message plus a recovery action the presentation layer can offer.

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use super::PollFailure;
use super::ports::ApiError;

/// Stable machine-readable code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The analysis did not appear within the poll budget.
    AnalysisTimedOut,
    /// A resource the user expected does not exist yet.
    NotFound,
    /// A single request exceeded its client-side deadline.
    RequestTimedOut,
    /// The server answered with a failure status.
    ServerError,
    /// The server's payload could not be understood.
    MalformedResponse,
    /// The network request failed.
    NetworkError,
    /// The user must sign in again.
    Unauthorized,
    /// Local validation rejected the input.
    InvalidInput,
}

/// Recovery the presentation layer should offer next to the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryAction {
    /// Retry the same screen.
    Reload,
    /// Go back to the questionnaire.
    BackToQuestionnaire,
    /// Sign in again.
    SignIn,
    /// Fix the highlighted input.
    EditInput,
}

/// Localized error shown to the user.
///
/// # Examples
/// ```
/// use selfmap_client::domain::{ErrorCode, RecoveryAction, UserFacingError};
/// use selfmap_client::domain::ports::ApiError;
///
/// let shown = UserFacingError::report_api("fetch analysis", &ApiError::timeout("30s"));
/// assert_eq!(shown.code(), ErrorCode::RequestTimedOut);
/// assert_eq!(shown.recovery(), RecoveryAction::Reload);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFacingError {
    code: ErrorCode,
    message: String,
    recovery: RecoveryAction,
}

impl UserFacingError {
    fn new(code: ErrorCode, message: impl Into<String>, recovery: RecoveryAction) -> Self {
        Self {
            code,
            message: message.into(),
            recovery,
        }
    }

    /// Log `error` raised by `operation` and translate it for the user.
    pub fn report_api(operation: &str, error: &ApiError) -> Self {
        match error {
            ApiError::NotYetAvailable { .. } | ApiError::Unauthenticated { .. } => {
                warn!(operation, kind = error.kind(), %error, "request failed");
            }
            _ => error!(operation, kind = error.kind(), %error, "request failed"),
        }
        Self::from_api(error)
    }

    /// Log a terminal poll failure and translate it for the user.
    pub fn report_poll(resource: &str, failure: &PollFailure) -> Self {
        match failure {
            PollFailure::TimedOut { attempts } => {
                warn!(resource, attempts, "resource did not become available");
                Self::new(
                    ErrorCode::AnalysisTimedOut,
                    "分析結果の生成がタイムアウトしました。質問への回答を確認してから、もう一度お試しください。",
                    RecoveryAction::BackToQuestionnaire,
                )
            }
            PollFailure::Probe(error) => Self::report_api(resource, error),
        }
    }

    /// Input rejected before reaching the network.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message, RecoveryAction::EditInput)
    }

    /// A resource the screen depends on does not exist.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message, RecoveryAction::BackToQuestionnaire)
    }

    fn from_api(error: &ApiError) -> Self {
        match error {
            ApiError::NotYetAvailable { .. } => Self::new(
                ErrorCode::NotFound,
                "分析結果が見つかりません。まず質問に回答してください。",
                RecoveryAction::BackToQuestionnaire,
            ),
            ApiError::Timeout { .. } => Self::new(
                ErrorCode::RequestTimedOut,
                "サーバーからの応答がタイムアウトしました。時間をおいて再度お試しください。",
                RecoveryAction::Reload,
            ),
            ApiError::Server { status: 401, .. } | ApiError::Unauthenticated { .. } => Self::new(
                ErrorCode::Unauthorized,
                "ログインの有効期限が切れました。もう一度ログインしてください。",
                RecoveryAction::SignIn,
            ),
            ApiError::Server { status, .. } => Self::new(
                ErrorCode::ServerError,
                format!("サーバーでエラーが発生しました（ステータス {status}）。再読み込みしてください。"),
                RecoveryAction::Reload,
            ),
            ApiError::MalformedResponse { .. } => Self::new(
                ErrorCode::MalformedResponse,
                "サーバーから予期しない形式の応答を受け取りました。再読み込みしてください。",
                RecoveryAction::Reload,
            ),
            ApiError::Transport { .. } => Self::new(
                ErrorCode::NetworkError,
                "サーバーに接続できませんでした。ネットワーク接続を確認してください。",
                RecoveryAction::Reload,
            ),
        }
    }

    /// Stable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Localized message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Suggested recovery action.
    pub fn recovery(&self) -> RecoveryAction {
        self.recovery
    }
}

impl std::fmt::Display for UserFacingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for UserFacingError {}
