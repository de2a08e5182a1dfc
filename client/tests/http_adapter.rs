//! Reqwest adapter behaviour against an in-process HTTP server.

use std::sync::Arc;
use std::time::Duration;

use httpmock::MockServer;
use rstest::rstest;
use serde_json::json;
use url::Url;
use uuid::Uuid;

use selfmap_client::domain::ports::{
    AccountApi, AnalysisSource, ApiError, ChatApi, EpisodeApi, QuestionnaireApi,
    StaticSessionToken,
};
use selfmap_client::domain::{
    AnswerEntry, AnswerSubmission, Credentials, EpisodeDetail, EpisodeField, MethodType,
    answers_by_question,
};
use selfmap_client::outbound::http::{HttpApiClient, HttpClientConfig};

const TOKEN: &str = "token-123";

fn config(server: &MockServer) -> HttpClientConfig {
    HttpClientConfig::new(Url::parse(&server.base_url()).expect("mock server url"))
}

fn client(server: &MockServer) -> HttpApiClient {
    HttpApiClient::new(config(server), Arc::new(StaticSessionToken::new(TOKEN)))
        .expect("client builds")
}

fn analysis_body() -> serde_json::Value {
    json!({
        "keywords": ["挑戦", "協調"],
        "strengths": [
            { "strength": "行動力", "evidence": "留学を計画した", "confidence": 0.9 }
        ],
        "values": ["成長"],
        "summary": "挑戦を楽しむ人です。"
    })
}

#[tokio::test]
async fn analysis_requests_carry_bearer_and_trace_headers() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method("GET")
                .path("/analysis")
                .header("authorization", format!("Bearer {TOKEN}"))
                .header_exists("x-trace-id");
            then.status(200).json_body(analysis_body());
        })
        .await;

    let analysis = client(&server).fetch_analysis().await.expect("analysis");

    assert_eq!(analysis.keywords, vec!["挑戦", "協調"]);
    assert_eq!(analysis.strengths[0].confidence, 0.9);
    assert_eq!(mock.hits_async().await, 1);
}

#[rstest]
#[case::missing_analysis(404, "not_yet_available")]
#[case::server_failure(500, "server_error")]
#[case::expired_session(401, "server_error")]
#[tokio::test]
async fn analysis_statuses_map_to_error_kinds(#[case] status: u16, #[case] kind: &str) {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method("GET").path("/analysis");
            then.status(status).json_body(json!({ "detail": "Analysis not found" }));
        })
        .await;

    let error = client(&server).fetch_analysis().await.expect_err("error status");

    assert_eq!(error.kind(), kind);
}

#[tokio::test]
async fn out_of_range_confidence_is_a_malformed_response() {
    let server = MockServer::start_async().await;
    let mut body = analysis_body();
    body["strengths"][0]["confidence"] = json!(1.4);
    server
        .mock_async(|when, then| {
            when.method("GET").path("/analysis");
            then.status(200).json_body(body);
        })
        .await;

    let error = client(&server).fetch_analysis().await.expect_err("bad shape");

    assert!(matches!(error, ApiError::MalformedResponse { .. }));
}

#[tokio::test]
async fn invalid_json_is_a_malformed_response() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method("GET").path("/analysis");
            then.status(200).body("<html>oops</html>");
        })
        .await;

    let error = client(&server).fetch_analysis().await.expect_err("bad body");

    assert!(matches!(error, ApiError::MalformedResponse { .. }));
}

#[tokio::test]
async fn slow_responses_hit_the_client_deadline() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method("GET").path("/analysis");
            then.status(200)
                .json_body(analysis_body())
                .delay(Duration::from_millis(500));
        })
        .await;
    let config = HttpClientConfig {
        request_timeout: Duration::from_millis(50),
        ..config(&server)
    };
    let client = HttpApiClient::new(config, Arc::new(StaticSessionToken::new(TOKEN)))
        .expect("client builds");

    let error = client.fetch_analysis().await.expect_err("deadline exceeded");

    assert!(matches!(error, ApiError::Timeout { .. }));
}

#[tokio::test]
async fn unreachable_servers_are_transport_errors() {
    let config = HttpClientConfig::new(Url::parse("http://127.0.0.1:9").expect("url"));
    let client = HttpApiClient::new(config, Arc::new(StaticSessionToken::new(TOKEN)))
        .expect("client builds");

    let error = client.fetch_analysis().await.expect_err("connection refused");

    assert!(matches!(
        error,
        ApiError::Transport { .. } | ApiError::Timeout { .. }
    ));
}

#[tokio::test]
async fn anonymous_sessions_fail_before_sending() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method("GET").path("/analysis");
            then.status(200).json_body(analysis_body());
        })
        .await;
    let client = HttpApiClient::new(config(&server), Arc::new(StaticSessionToken::anonymous()))
        .expect("client builds");

    let error = client.fetch_analysis().await.expect_err("no token");

    assert!(error.is_unauthorized());
    assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn submitted_answers_come_back_unchanged() {
    let server = MockServer::start_async().await;
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();
    let submission = AnswerSubmission {
        answers: vec![
            AnswerEntry {
                question_id: first,
                answer_text: "誠実さを大切にしています".to_owned(),
            },
            AnswerEntry {
                question_id: second,
                answer_text: "サークルの代表を務めました".to_owned(),
            },
        ],
    };
    let stored = submission
        .answers
        .iter()
        .map(|entry| {
            json!({
                "id": Uuid::new_v4(),
                "user_id": Uuid::new_v4(),
                "question_id": entry.question_id,
                "answer_text": entry.answer_text,
                "embedding_id": null
            })
        })
        .collect::<Vec<_>>();
    let submit = server
        .mock_async(|when, then| {
            when.method("POST")
                .path("/answers/submit")
                .json_body(serde_json::to_value(&submission).expect("submission json"));
            then.status(200).json_body(json!({
                "status": "success",
                "message": "Answers submitted successfully"
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method("GET").path("/answers");
            then.status(200).json_body(json!({ "answers": stored }));
        })
        .await;
    let client = client(&server);

    let ack = client.submit_answers(&submission).await.expect("submit");
    let fetched = client.fetch_answers().await.expect("fetch");

    assert_eq!(ack["status"], "success");
    assert_eq!(submit.hits_async().await, 1);
    assert_eq!(answers_by_question(&fetched), submission.by_question());
}

#[tokio::test]
async fn missing_answers_and_episodes_are_empty_not_errors() {
    let server = MockServer::start_async().await;
    let question_id = Uuid::new_v4();
    server
        .mock_async(|when, then| {
            when.method("GET").path("/answers");
            then.status(404).json_body(json!({ "detail": "Not found" }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method("GET").path(format!("/episodes/{question_id}"));
            then.status(404)
                .json_body(json!({ "detail": "Episode detail not found" }));
        })
        .await;
    let client = client(&server);

    assert!(client.fetch_answers().await.expect("answers").is_empty());
    assert!(client.fetch_episode(question_id).await.expect("episode").is_none());
}

#[tokio::test]
async fn chat_replies_decode_generated_answers() {
    let server = MockServer::start_async().await;
    let memo = Uuid::new_v4();
    server
        .mock_async(|when, then| {
            when.method("POST")
                .path("/chat/answer")
                .json_body(json!({ "query_text": "私の強みは？" }));
            then.status(200).json_body(json!({
                "answer_text": "行動力です。",
                "reasoning": "留学の経験から",
                "referenced_memo_ids": [memo]
            }));
        })
        .await;

    let reply = client(&server)
        .generate_answer("私の強みは？")
        .await
        .expect("reply");

    assert_eq!(reply.answer_text, "行動力です。");
    assert_eq!(reply.referenced_memo_ids, vec![memo]);
}

#[tokio::test]
async fn episode_summary_posts_the_detail() {
    let server = MockServer::start_async().await;
    let question_id = Uuid::new_v4();
    let mut detail = EpisodeDetail::new(MethodType::Star);
    detail.set_field(EpisodeField::Situation, "部員が減っていた");
    server
        .mock_async(|when, then| {
            when.method("POST")
                .path(format!("/episodes/{question_id}/summary"))
                .json_body(json!({
                    "episode_detail": { "method_type": "STAR", "situation": "部員が減っていた" }
                }));
            then.status(200).json_body(json!({ "summary": "勧誘を工夫して部員を増やした" }));
        })
        .await;

    let summary = client(&server)
        .episode_summary(question_id, &detail)
        .await
        .expect("summary");

    assert_eq!(summary, "勧誘を工夫して部員を増やした");
}

#[tokio::test]
async fn login_sends_form_credentials() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method("POST")
                .path("/auth/login")
                .body_contains("username=aoi%40example.com")
                .body_contains("password=hunter22");
            then.status(200)
                .json_body(json!({ "access_token": "fresh", "token_type": "bearer" }));
        })
        .await;
    let client = HttpApiClient::new(config(&server), Arc::new(StaticSessionToken::anonymous()))
        .expect("client builds");
    let credentials = Credentials::new("aoi@example.com", "hunter22").expect("credentials");

    let token = client.login(&credentials).await.expect("login");

    assert_eq!(token.access_token, "fresh");
    assert_eq!(mock.hits_async().await, 1);
}

#[tokio::test]
async fn error_details_are_preserved() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method("POST").path("/auth/register");
            then.status(400)
                .json_body(json!({ "detail": "Email already registered" }));
        })
        .await;
    let client = HttpApiClient::new(config(&server), Arc::new(StaticSessionToken::anonymous()))
        .expect("client builds");
    let registration = selfmap_client::domain::Registration::new(
        "aoi@example.com",
        "long-password",
        "Aoi",
    )
    .expect("registration");

    let error = client.register(&registration).await.expect_err("duplicate");

    assert_eq!(
        error,
        ApiError::server(400_u16, "status 400: Email already registered")
    );
}
