//! Timer abstraction used between poll attempts.

use std::time::Duration;

use async_trait::async_trait;

/// Async sleeping abstraction for retry delays.
///
/// The poller races every sleep against its session's cancellation token, so
/// implementations need no cancellation logic of their own.
///
/// ```rust,no_run
/// use async_trait::async_trait;
/// use selfmap_client::domain::RetrySleeper;
/// use std::sync::Mutex;
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct CountingSleeper(Mutex<u32>);
///
/// #[async_trait]
/// impl RetrySleeper for CountingSleeper {
///     async fn sleep(&self, _delay: Duration) {
///         *self.0.lock().expect("counter mutex") += 1;
///     }
/// }
/// ```
#[async_trait]
pub trait RetrySleeper: Send + Sync {
    /// Suspend for `delay`.
    async fn sleep(&self, delay: Duration);
}

/// Tokio-backed sleeper.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl RetrySleeper for TokioSleeper {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}
