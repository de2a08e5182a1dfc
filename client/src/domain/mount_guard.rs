//! Liveness tracking for views that own background work.
//!
//! A [`MountGuard`] is created when a view mounts and torn down when it goes
//! away. Teardown flips the shared liveness flag, cancels the session token
//! (waking any pending retry timer) and aborts the owned task. Sessions check
//! the flag before every state mutation, so a response that was already in
//! flight when the view unmounted is dropped on arrival.
//!
//! A mutation holds a read lock on the flag while it runs and teardown takes
//! the write lock, so once [`MountGuard::teardown`] returns no mutation is
//! still running and none can start.

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Shared flag reporting whether the owning view is still mounted.
#[derive(Debug, Clone)]
pub struct Liveness(Arc<RwLock<bool>>);

impl Liveness {
    fn alive() -> Self {
        Self(Arc::new(RwLock::new(true)))
    }

    /// Whether state mutations are still allowed.
    pub fn is_alive(&self) -> bool {
        *self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` while holding the flag alive; `None` once invalidated.
    fn while_alive<R>(&self, f: impl FnOnce() -> R) -> Option<R> {
        let alive = self.0.read().unwrap_or_else(PoisonError::into_inner);
        alive.then(f)
    }

    /// Blocks until running mutations finish.
    fn invalidate(&self) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = false;
    }
}

/// Handle given to a background session so it can gate its own effects.
#[derive(Debug, Clone)]
pub struct SessionScope {
    liveness: Liveness,
    cancel: CancellationToken,
}

impl SessionScope {
    /// Whether the session may still publish state.
    pub fn is_active(&self) -> bool {
        self.liveness.is_alive() && !self.cancel.is_cancelled()
    }

    /// Resolve once the owning view tears the session down.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await;
    }

    /// Run `mutation` only while the session is active.
    ///
    /// Returns `None` (and skips `mutation`) after teardown.
    pub fn mutate<R>(&self, mutation: impl FnOnce() -> R) -> Option<R> {
        let applied = if self.cancel.is_cancelled() {
            None
        } else {
            self.liveness.while_alive(mutation)
        };
        if applied.is_none() {
            debug!("discarding state mutation after teardown");
        }
        applied
    }
}

/// Owner of a view's background work.
///
/// # Examples
/// ```
/// use selfmap_client::domain::MountGuard;
///
/// # tokio::runtime::Runtime::new().expect("runtime").block_on(async {
/// let mut guard = MountGuard::mount();
/// let scope = guard.scope();
/// guard.spawn(async move {
///     scope.cancelled().await;
/// });
/// guard.teardown();
/// assert!(!guard.is_mounted());
/// # });
/// ```
#[derive(Debug)]
pub struct MountGuard {
    liveness: Liveness,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl MountGuard {
    /// Start a guard for a freshly mounted view.
    pub fn mount() -> Self {
        Self {
            liveness: Liveness::alive(),
            cancel: CancellationToken::new(),
            task: None,
        }
    }

    /// Scope handed to sessions started by this view.
    pub fn scope(&self) -> SessionScope {
        SessionScope {
            liveness: self.liveness.clone(),
            cancel: self.cancel.clone(),
        }
    }

    /// Whether the view is still mounted.
    pub fn is_mounted(&self) -> bool {
        self.liveness.is_alive()
    }

    /// Spawn the view's background task; the guard owns its handle.
    ///
    /// A previously spawned task is aborted so at most one session runs.
    pub fn spawn<F>(&mut self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if !self.is_mounted() {
            debug!("ignoring spawn on an unmounted view");
            return;
        }
        if let Some(previous) = self.task.replace(tokio::spawn(future)) {
            previous.abort();
        }
    }

    /// Whether the owned task has run to completion.
    pub fn is_settled(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Invalidate liveness, cancel timers and abort the owned task.
    ///
    /// Waits for a mutation already running on another thread to finish.
    /// Idempotent; also runs on drop.
    pub fn teardown(&mut self) {
        if self.liveness.is_alive() {
            debug!("tearing down mounted view");
        }
        self.liveness.invalidate();
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for MountGuard {
    fn drop(&mut self) {
        self.teardown();
    }
}
