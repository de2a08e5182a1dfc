//! Bounded polling for resources the server computes asynchronously.
//!
//! One session probes a resource, classifies the answer, and either finishes
//! or waits a fixed delay before the next probe. Probes never overlap: the
//! next one is issued only after the previous response is classified. Every
//! await is raced against the session's cancellation token and every status
//! publication is gated on the owning view's liveness.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::domain::SessionScope;

mod runtime;
mod state;

pub use runtime::{RetrySleeper, TokioSleeper};
pub use state::{AsyncResult, PollAttempt, PollFailure, ProbeOutcome};
use state::Transition;

/// Default probe budget per session.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;
/// Default delay between probes.
pub const DEFAULT_POLL_DELAY: Duration = Duration::from_secs(3);

/// Poll budget and pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Maximum probes per session, including the first.
    pub max_attempts: u32,
    /// Delay between a "not ready" answer and the next probe.
    pub delay: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_POLL_DELAY,
        }
    }
}

/// One network probe for the polled resource.
#[async_trait]
pub trait ResultProbe<T>: Send + Sync {
    /// Perform one probe and classify its result.
    async fn probe(&self) -> ProbeOutcome<T>;
}

/// Consumer of session status updates.
pub trait PollObserver<T>: Send + Sync {
    /// Receive the latest status. Never called after teardown.
    fn observe(&self, status: &AsyncResult<T>);
}

impl<T> PollObserver<T> for tokio::sync::watch::Sender<AsyncResult<T>>
where
    T: Clone + Send + Sync,
{
    fn observe(&self, status: &AsyncResult<T>) {
        self.send_replace(status.clone());
    }
}

/// Drives poll sessions against one probe.
pub struct ResultPoller<T> {
    probe: Arc<dyn ResultProbe<T>>,
    sleeper: Arc<dyn RetrySleeper>,
    config: PollConfig,
}

impl<T> ResultPoller<T>
where
    T: Send + Sync,
{
    /// Build a poller that waits with Tokio timers.
    pub fn new(probe: Arc<dyn ResultProbe<T>>, config: PollConfig) -> Self {
        Self::with_sleeper(probe, Arc::new(TokioSleeper), config)
    }

    /// Build a poller with an injected sleeper.
    pub fn with_sleeper(
        probe: Arc<dyn ResultProbe<T>>,
        sleeper: Arc<dyn RetrySleeper>,
        config: PollConfig,
    ) -> Self {
        Self {
            probe,
            sleeper,
            config,
        }
    }

    /// Budget and pacing used by each session.
    pub fn config(&self) -> PollConfig {
        self.config
    }

    /// Run one session to completion.
    ///
    /// Returns the terminal status, or `None` when the session was torn down
    /// first; in that case nothing further reaches `observer`.
    pub async fn run(
        &self,
        scope: &SessionScope,
        observer: &dyn PollObserver<T>,
    ) -> Option<AsyncResult<T>> {
        let mut attempt = PollAttempt::new(self.config.max_attempts);
        scope.mutate(|| observer.observe(&AsyncResult::Pending(attempt)))?;

        loop {
            let outcome = tokio::select! {
                biased;
                () = scope.cancelled() => {
                    debug!(%attempt, "poll session cancelled during probe");
                    return None;
                }
                outcome = self.probe.probe() => outcome,
            };

            match attempt.advance(outcome) {
                Transition::Retry(next) => {
                    attempt = next;
                    debug!(
                        attempt = attempt.attempt_number(),
                        max_attempts = attempt.max_attempts(),
                        "resource not ready; retry scheduled",
                    );
                    scope.mutate(|| observer.observe(&AsyncResult::Pending(attempt)))?;
                    self.wait_before_retry(scope).await?;
                }
                Transition::Finished(result) => {
                    log_terminal(&result, attempt);
                    scope.mutate(|| observer.observe(&result))?;
                    return Some(result);
                }
            }
        }
    }

    async fn wait_before_retry(&self, scope: &SessionScope) -> Option<()> {
        tokio::select! {
            biased;
            () = scope.cancelled() => {
                debug!("poll session cancelled while waiting to retry");
                None
            }
            () = self.sleeper.sleep(self.config.delay) => Some(()),
        }
    }
}

fn log_terminal<T>(result: &AsyncResult<T>, attempt: PollAttempt) {
    match result {
        AsyncResult::Ready(_) => info!(
            attempts = attempt.attempt_number().saturating_add(1),
            "polled resource is ready"
        ),
        AsyncResult::Failed(PollFailure::TimedOut { attempts }) => {
            info!(attempts, "poll budget exhausted");
        }
        AsyncResult::Failed(PollFailure::Probe(error)) => info!(
            attempts = attempt.attempt_number().saturating_add(1),
            kind = error.kind(),
            "poll session stopped by probe failure"
        ),
        AsyncResult::Pending(_) => {}
    }
}
