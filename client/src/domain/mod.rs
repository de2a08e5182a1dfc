//! Domain model, view state and ports.
//!
//! Purpose: Hold everything the client knows about the self-analysis service
//! without depending on a transport. Remote operations are reached through
//! the traits in [`ports`]; `crate::outbound::http` implements them.
//!
//! Public surface:
//! - Analysis, Question, EpisodeDetail, Account and related payload types.
//! - ResultPoller and its state machine (AsyncResult, PollAttempt).
//! - MountGuard / SessionScope for tearing down background work.
//! - View state: AnalysisView, ChatSession, QuestionnaireForm, AnswerEditor,
//!   EpisodeEditor.
//! - UserFacingError, the localized error shown to users.

pub mod ports;

mod account;
mod analysis;
mod analysis_view;
mod answer_editor;
mod chat;
mod episode;
mod episode_editor;
mod error;
mod mount_guard;
mod poller;
mod questionnaire;
mod stale_guard;
mod trace_id;

pub use self::account::{
    AccessToken, Account, Credentials, CredentialsValidationError, PASSWORD_MIN, Registration,
    sign_in,
};
pub use self::analysis::{Analysis, AnalysisShapeError, Strength};
pub use self::analysis_view::{AnalysisView, AnalysisViewState};
pub use self::answer_editor::AnswerEditor;
pub use self::chat::{
    ChatMessage, ChatRole, ChatSession, ChatSnapshot, GeneratedAnswer, SendOutcome,
};
pub use self::episode::{
    EpisodeDetail, EpisodeFeedbackRequest, EpisodeField, EpisodeRecord, MethodType,
};
pub use self::episode_editor::EpisodeEditor;
pub use self::error::{ErrorCode, RecoveryAction, UserFacingError};
pub use self::mount_guard::{Liveness, MountGuard, SessionScope};
pub use self::poller::{
    AsyncResult, DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_DELAY, PollAttempt, PollConfig, PollFailure,
    PollObserver, ProbeOutcome, ResultPoller, ResultProbe, RetrySleeper, TokioSleeper,
};
pub use self::questionnaire::{
    AnswerEntry, AnswerFeedback, AnswerSubmission, Question, QuestionnaireForm,
    REQUIRED_ANSWER_MESSAGE, UserAnswer, answers_by_question,
};
pub use self::stale_guard::{RequestStamps, RequestTicket};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
