//! Failure taxonomy shared by every outbound API port.

use super::define_port_error;

define_port_error! {
    /// Errors surfaced while calling the self-analysis API.
    pub enum ApiError {
        /// The requested resource has not been produced yet (HTTP 404 on a
        /// computed resource). Retryable within a bounded poll session.
        NotYetAvailable { resource: String } =>
            "{resource} is not available yet",
        /// The client-side deadline elapsed before a response arrived.
        Timeout { message: String } =>
            "request timed out: {message}",
        /// The server answered with a non-success status.
        Server { status: u16, message: String } =>
            "server responded with status {status}: {message}",
        /// The response body could not be decoded or failed shape validation.
        MalformedResponse { message: String } =>
            "malformed response: {message}",
        /// The request never produced a response.
        Transport { message: String } =>
            "transport failed: {message}",
        /// No bearer token is available for an authenticated call.
        Unauthenticated { message: String } =>
            "not signed in: {message}",
    }
}

impl ApiError {
    /// Return whether a bounded poll session should retry after this error.
    pub fn is_not_yet_available(&self) -> bool {
        matches!(self, Self::NotYetAvailable { .. })
    }

    /// Return whether the server rejected the bearer token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Server { status: 401, .. } | Self::Unauthenticated { .. })
    }

    /// Stable label used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotYetAvailable { .. } => "not_yet_available",
            Self::Timeout { .. } => "timeout",
            Self::Server { .. } => "server_error",
            Self::MalformedResponse { .. } => "malformed_response",
            Self::Transport { .. } => "transport_error",
            Self::Unauthenticated { .. } => "unauthenticated",
        }
    }
}
