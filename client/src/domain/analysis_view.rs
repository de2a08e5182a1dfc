//! Analysis screen state.
//!
//! Mounting the view starts one poll session against the analysis source;
//! unmounting tears it down. The state is published through a watch channel
//! whose only writer is the active session.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use super::ports::AnalysisSource;
use super::{
    Analysis, AsyncResult, MountGuard, PollAttempt, PollConfig, PollObserver, ProbeOutcome,
    ResultPoller, ResultProbe, RetrySleeper, TokioSleeper, TraceId, UserFacingError,
};

/// Snapshot rendered by the analysis screen.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisViewState {
    /// Whether the session is still waiting.
    pub loading: bool,
    /// Progress of the waiting session.
    pub attempt: Option<PollAttempt>,
    /// The analysis once available.
    pub analysis: Option<Analysis>,
    /// Terminal failure shown to the user.
    pub error: Option<UserFacingError>,
}

impl AnalysisViewState {
    fn initial() -> Self {
        Self {
            loading: true,
            attempt: None,
            analysis: None,
            error: None,
        }
    }

    fn from_status(status: &AsyncResult<Analysis>) -> Self {
        match status {
            AsyncResult::Pending(attempt) => Self {
                attempt: Some(*attempt),
                ..Self::initial()
            },
            AsyncResult::Ready(analysis) => Self {
                loading: false,
                attempt: None,
                analysis: Some(analysis.clone()),
                error: None,
            },
            AsyncResult::Failed(failure) => Self {
                loading: false,
                attempt: None,
                analysis: None,
                error: Some(UserFacingError::report_poll("analysis", failure)),
            },
        }
    }

    /// Progress text such as `attempt 3/10`, once a retry has been scheduled.
    pub fn progress(&self) -> Option<String> {
        self.attempt
            .filter(|attempt| attempt.attempt_number() > 0)
            .map(|attempt| attempt.to_string())
    }
}

struct AnalysisProbe {
    source: Arc<dyn AnalysisSource>,
}

#[async_trait]
impl ResultProbe<Analysis> for AnalysisProbe {
    async fn probe(&self) -> ProbeOutcome<Analysis> {
        self.source.fetch_analysis().await.into()
    }
}

struct ViewPublisher {
    tx: watch::Sender<AnalysisViewState>,
}

impl PollObserver<Analysis> for ViewPublisher {
    fn observe(&self, status: &AsyncResult<Analysis>) {
        self.tx.send_replace(AnalysisViewState::from_status(status));
    }
}

/// Mounted analysis screen.
pub struct AnalysisView {
    guard: MountGuard,
    state: watch::Receiver<AnalysisViewState>,
}

impl AnalysisView {
    /// Mount the view and start polling with Tokio timers.
    pub fn mount(source: Arc<dyn AnalysisSource>, config: PollConfig) -> Self {
        Self::mount_with_sleeper(source, Arc::new(TokioSleeper), config)
    }

    /// Mount the view with an injected sleeper.
    pub fn mount_with_sleeper(
        source: Arc<dyn AnalysisSource>,
        sleeper: Arc<dyn RetrySleeper>,
        config: PollConfig,
    ) -> Self {
        let (tx, state) = watch::channel(AnalysisViewState::initial());
        let mut guard = MountGuard::mount();
        let scope = guard.scope();
        let poller = ResultPoller::with_sleeper(Arc::new(AnalysisProbe { source }), sleeper, config);
        let publisher = ViewPublisher { tx };

        guard.spawn(TraceId::scope(TraceId::generate(), async move {
            poller.run(&scope, &publisher).await;
        }));

        Self { guard, state }
    }

    /// Latest published state.
    pub fn state(&self) -> AnalysisViewState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every published state.
    pub fn subscribe(&self) -> watch::Receiver<AnalysisViewState> {
        self.state.clone()
    }

    /// Wait for a terminal state, or for the session to end after teardown.
    pub async fn settled(&self) -> AnalysisViewState {
        let mut rx = self.state.clone();
        if let Ok(state) = rx.wait_for(|state| !state.loading).await {
            return state.clone();
        }
        rx.borrow().clone()
    }

    /// Whether the view is still mounted.
    pub fn is_mounted(&self) -> bool {
        self.guard.is_mounted()
    }

    /// Tear the view down; later responses are discarded.
    pub fn unmount(&mut self) {
        self.guard.teardown();
    }
}
