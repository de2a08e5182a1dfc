//! Poll session state machine.
//!
//! ```text
//! PENDING(0) --not ready, k < N--> PENDING(k) --ready--> READY
//!      |                               |
//!      +--hard failure / k == N--------+--> FAILED
//! ```
//!
//! The attempt number counts probes already classified, so a session never
//! issues more than `max_attempts` probes.

use std::fmt;

use crate::domain::ports::ApiError;

/// Progress of one poll session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollAttempt {
    attempt_number: u32,
    max_attempts: u32,
}

impl PollAttempt {
    /// Initial state; a zero budget is raised to one probe.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            attempt_number: 0,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Probes classified as not ready so far.
    pub fn attempt_number(self) -> u32 {
        self.attempt_number
    }

    /// Probe budget for the session.
    pub fn max_attempts(self) -> u32 {
        self.max_attempts
    }

    /// Advance the machine with one probe outcome.
    pub(super) fn advance<T>(self, outcome: ProbeOutcome<T>) -> Transition<T> {
        match outcome {
            ProbeOutcome::Ready(value) => Transition::Finished(AsyncResult::Ready(value)),
            ProbeOutcome::Failed(error) => {
                Transition::Finished(AsyncResult::Failed(PollFailure::Probe(error)))
            }
            ProbeOutcome::NotYetAvailable => {
                let attempts = self.attempt_number.saturating_add(1);
                if attempts < self.max_attempts {
                    Transition::Retry(Self {
                        attempt_number: attempts,
                        ..self
                    })
                } else {
                    Transition::Finished(AsyncResult::Failed(PollFailure::TimedOut { attempts }))
                }
            }
        }
    }
}

impl fmt::Display for PollAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attempt {}/{}", self.attempt_number, self.max_attempts)
    }
}

/// Classification of one probe.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome<T> {
    /// The resource exists.
    Ready(T),
    /// The well-known "not produced yet" signal.
    NotYetAvailable,
    /// Any other failure; never retried.
    Failed(ApiError),
}

impl<T> From<Result<T, ApiError>> for ProbeOutcome<T> {
    fn from(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(error) if error.is_not_yet_available() => Self::NotYetAvailable,
            Err(error) => Self::Failed(error),
        }
    }
}

/// Why a poll session ended without a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollFailure {
    /// Every probe reported the resource as not ready.
    TimedOut {
        /// Probes issued.
        attempts: u32,
    },
    /// A probe failed outright.
    Probe(ApiError),
}

/// Observable status of a poll session.
#[derive(Debug, Clone, PartialEq)]
pub enum AsyncResult<T> {
    /// Still waiting; carries the attempt counter.
    Pending(PollAttempt),
    /// Terminal success.
    Ready(T),
    /// Terminal failure.
    Failed(PollFailure),
}

impl<T> AsyncResult<T> {
    /// Whether no further transition can occur.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending(_))
    }
}

pub(super) enum Transition<T> {
    Retry(PollAttempt),
    Finished(AsyncResult<T>),
}
