//! Shared transport for the selfmap HTTP adapters.
//!
//! Owns the reqwest client, endpoint resolution, bearer authentication,
//! per-request deadlines, the trace header and HTTP error mapping.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::domain::ports::{ApiError, SessionTokenSource};
use crate::domain::{TRACE_ID_HEADER, TraceId};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(60);
const USER_AGENT: &str = concat!("selfmap-client/", env!("CARGO_PKG_VERSION"));

/// Endpoint and deadline settings for [`HttpApiClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClientConfig {
    /// Base URL of the API, e.g. `http://localhost:8001`.
    pub base_url: Url,
    /// Deadline for ordinary requests.
    pub request_timeout: Duration,
    /// Deadline for requests that wait on text generation.
    pub generation_timeout: Duration,
}

impl HttpClientConfig {
    /// Settings with the default 30 s and 60 s deadlines.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }
}

/// Which deadline a request runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Deadline {
    Standard,
    Generation,
}

/// Whether a request needs the session's bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Auth {
    Bearer,
    Anonymous,
}

/// Request prepared against one endpoint.
pub(super) struct ApiRequest {
    builder: RequestBuilder,
    method: Method,
    path: String,
}

impl ApiRequest {
    /// Attach a JSON body.
    pub(super) fn json<T: Serialize + ?Sized>(self, body: &T) -> Self {
        Self {
            builder: self.builder.json(body),
            ..self
        }
    }

    /// Attach a URL-encoded form body.
    pub(super) fn form<T: Serialize + ?Sized>(self, fields: &T) -> Self {
        Self {
            builder: self.builder.form(fields),
            ..self
        }
    }
}

/// Status and raw body of a completed exchange.
pub(super) struct RawResponse {
    status: StatusCode,
    body: Vec<u8>,
}

impl RawResponse {
    pub(super) fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }

    /// Decode a successful body; any other status becomes an error.
    pub(super) fn into_json<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        if !self.status.is_success() {
            return Err(map_status_error(self.status, &self.body));
        }
        serde_json::from_slice(&self.body).map_err(|error| {
            ApiError::malformed_response(format!("invalid JSON payload: {error}"))
        })
    }
}

/// Reqwest-backed implementation of every selfmap port.
pub struct HttpApiClient {
    client: Client,
    base_url: Url,
    session: Arc<dyn SessionTokenSource>,
    request_timeout: Duration,
    generation_timeout: Duration,
}

impl HttpApiClient {
    /// Build a client reading bearer tokens from `session`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        config: HttpClientConfig,
        session: Arc<dyn SessionTokenSource>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            base_url: with_trailing_slash(config.base_url),
            session,
            request_timeout: config.request_timeout,
            generation_timeout: config.generation_timeout,
        })
    }

    /// Base URL requests are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn timeout(&self, deadline: Deadline) -> Duration {
        match deadline {
            Deadline::Standard => self.request_timeout,
            Deadline::Generation => self.generation_timeout,
        }
    }

    /// Prepare a request for `path`, relative to the base URL.
    pub(super) fn request(
        &self,
        method: Method,
        path: &str,
        auth: Auth,
        deadline: Deadline,
    ) -> Result<ApiRequest, ApiError> {
        let url = self.base_url.join(path.trim_start_matches('/')).map_err(|error| {
            ApiError::transport(format!("invalid endpoint path '{path}': {error}"))
        })?;
        let mut builder = self
            .client
            .request(method.clone(), url)
            .header(ACCEPT, "application/json")
            .timeout(self.timeout(deadline));
        if auth == Auth::Bearer {
            let token = self.session.bearer_token().ok_or_else(|| {
                ApiError::unauthenticated(format!("no session token for {method} /{path}"))
            })?;
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        Ok(ApiRequest {
            builder,
            method,
            path: path.to_owned(),
        })
    }

    /// Send a prepared request and read its body.
    pub(super) async fn execute(&self, request: ApiRequest) -> Result<RawResponse, ApiError> {
        let ApiRequest {
            builder,
            method,
            path,
        } = request;
        let trace_id = TraceId::current_or_generate();
        let started = Instant::now();

        let result = TraceId::scope(trace_id, async {
            let response = builder
                .header(TRACE_ID_HEADER, trace_id.to_string())
                .send()
                .await
                .map_err(map_transport_error)?;
            let status = response.status();
            let body = response.bytes().await.map_err(map_transport_error)?;
            Ok::<_, ApiError>(RawResponse {
                status,
                body: body.to_vec(),
            })
        })
        .await;

        let elapsed_ms = saturating_millis(started.elapsed());
        match &result {
            Ok(response) => debug!(
                %trace_id,
                %method,
                path = %path,
                status = response.status.as_u16(),
                elapsed_ms,
                "request completed"
            ),
            Err(error) => warn!(
                %trace_id,
                %method,
                path = %path,
                kind = error.kind(),
                elapsed_ms,
                "request failed"
            ),
        }
        result
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn saturating_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

fn map_transport_error(error: reqwest::Error) -> ApiError {
    if error.is_timeout() {
        ApiError::timeout(error.to_string())
    } else if error.is_decode() {
        ApiError::malformed_response(error.to_string())
    } else {
        ApiError::transport(error.to_string())
    }
}

pub(super) fn map_status_error(status: StatusCode, body: &[u8]) -> ApiError {
    let detail = server_detail(body).unwrap_or_else(|| body_preview(body));
    let message = if detail.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), detail)
    };
    ApiError::server(status.as_u16(), message)
}

/// Extract the string `detail` field error responses carry.
fn server_detail(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value.get("detail")?.as_str().map(str::to_owned)
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the non-network transport helpers.

    use super::*;
    use rstest::rstest;

    use crate::domain::ports::StaticSessionToken;

    fn client(base: &str, token: StaticSessionToken) -> HttpApiClient {
        HttpApiClient::new(
            HttpClientConfig::new(Url::parse(base).expect("base url")),
            Arc::new(token),
        )
        .expect("client builds")
    }

    #[rstest]
    #[case::bare_host("http://localhost:8001", "http://localhost:8001/analysis")]
    #[case::prefixed("http://localhost:8001/api", "http://localhost:8001/api/analysis")]
    #[case::trailing("http://localhost:8001/api/", "http://localhost:8001/api/analysis")]
    fn resolves_endpoints_below_the_base_path(#[case] base: &str, #[case] expected: &str) {
        let client = client(base, StaticSessionToken::new("t"));
        let request = client
            .request(Method::GET, "/analysis", Auth::Bearer, Deadline::Standard)
            .expect("request builds");
        let built = request.builder.build().expect("request is valid");
        assert_eq!(built.url().as_str(), expected);
    }

    #[test]
    fn bearer_requests_require_a_token() {
        let client = client("http://localhost:8001", StaticSessionToken::anonymous());
        let error = client
            .request(Method::GET, "analysis", Auth::Bearer, Deadline::Standard)
            .err()
            .expect("missing token");
        assert!(matches!(error, ApiError::Unauthenticated { .. }));
    }

    #[rstest]
    #[case(Deadline::Standard, 30)]
    #[case(Deadline::Generation, 60)]
    fn applies_the_deadline_per_request(#[case] deadline: Deadline, #[case] seconds: u64) {
        let client = client("http://localhost:8001", StaticSessionToken::anonymous());
        let request = client
            .request(Method::POST, "chat/answer", Auth::Anonymous, deadline)
            .expect("request builds");
        let built = request.builder.build().expect("request is valid");
        assert_eq!(built.timeout(), Some(&Duration::from_secs(seconds)));
    }

    #[rstest]
    #[case::short(Duration::from_millis(1_250), 1_250)]
    #[case::overflowing(Duration::MAX, u64::MAX)]
    fn elapsed_time_saturates_at_u64_millis(#[case] elapsed: Duration, #[case] expected: u64) {
        assert_eq!(saturating_millis(elapsed), expected);
    }

    #[test]
    fn prefers_the_detail_field_in_error_bodies() {
        let error = map_status_error(
            StatusCode::BAD_REQUEST,
            br#"{"detail": "Email already registered"}"#,
        );
        assert_eq!(
            error,
            ApiError::server(400_u16, "status 400: Email already registered")
        );
    }

    #[test]
    fn falls_back_to_a_compact_body_preview() {
        let body = format!("<html>\n  {}\n</html>", "x".repeat(200));
        let error = map_status_error(StatusCode::BAD_GATEWAY, body.as_bytes());
        let ApiError::Server { status, message } = error else {
            panic!("expected a server error");
        };
        assert_eq!(status, 502);
        assert!(message.ends_with("..."));
        assert!(!message.contains('\n'));
    }

    #[test]
    fn empty_error_bodies_report_only_the_status() {
        let error = map_status_error(StatusCode::INTERNAL_SERVER_ERROR, b"");
        assert_eq!(error, ApiError::server(500_u16, "status 500"));
    }
}
