//! Conversation with the AI counselor.
//!
//! Several requests may be in flight when the user sends messages quickly.
//! Each request takes a ticket from [`RequestStamps`]; a reply is appended
//! only while its ticket is still the newest, so a slow early reply cannot
//! land after a newer one.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::ports::ChatApi;
use super::{RequestStamps, TraceId, UserFacingError};

/// Reply produced by the counselor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedAnswer {
    /// Reply text.
    pub answer_text: String,
    /// Reasoning shown alongside the reply.
    #[serde(default)]
    pub reasoning: String,
    /// Memos the reply drew on.
    #[serde(default)]
    pub referenced_memo_ids: Vec<Uuid>,
}

/// Author of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// The signed-in user.
    User,
    /// The counselor.
    Ai,
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Stable identifier, prefixed with the role.
    pub id: String,
    /// Author.
    pub role: ChatRole,
    /// Message body.
    pub content: String,
    /// Counselor reasoning, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

impl ChatMessage {
    fn user(content: &str) -> Self {
        Self {
            id: format!("user-{}", Uuid::new_v4()),
            role: ChatRole::User,
            content: content.to_owned(),
            reasoning: None,
        }
    }

    fn ai(answer: GeneratedAnswer) -> Self {
        Self {
            id: format!("ai-{}", Uuid::new_v4()),
            role: ChatRole::Ai,
            content: answer.answer_text,
            reasoning: Some(answer.reasoning).filter(|text| !text.trim().is_empty()),
        }
    }
}

/// Result of a send that reached the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The reply was appended to the transcript.
    Applied,
    /// A newer request was issued first; the reply was discarded.
    Superseded,
}

/// Snapshot rendered by the chat screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatSnapshot {
    /// Transcript in send order.
    pub messages: Vec<ChatMessage>,
    /// Whether the newest request is still pending.
    pub loading: bool,
    /// Failure of the newest request.
    pub error: Option<UserFacingError>,
}

#[derive(Default)]
struct ChatState {
    snapshot: ChatSnapshot,
    stamps: RequestStamps,
}

/// Chat screen state shared between concurrent sends.
pub struct ChatSession {
    api: Arc<dyn ChatApi>,
    state: Mutex<ChatState>,
}

impl ChatSession {
    /// Start an empty conversation.
    pub fn new(api: Arc<dyn ChatApi>) -> Self {
        Self {
            api,
            state: Mutex::new(ChatState::default()),
        }
    }

    /// Current transcript and status.
    pub fn snapshot(&self) -> ChatSnapshot {
        self.lock().snapshot.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ChatState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Send `text` and append the reply if no newer request was issued.
    ///
    /// Blank input is rejected without a request. A failure of the newest
    /// request is stored on the snapshot and returned.
    pub async fn send(&self, text: &str) -> Result<SendOutcome, UserFacingError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(UserFacingError::invalid_input("メッセージを入力してください"));
        }

        let ticket = {
            let mut state = self.lock();
            state.snapshot.messages.push(ChatMessage::user(text));
            state.snapshot.loading = true;
            state.snapshot.error = None;
            state.stamps.issue()
        };

        let result = TraceId::scope(TraceId::generate(), self.api.generate_answer(text)).await;

        let mut state = self.lock();
        if !state.stamps.is_current(ticket) {
            match &result {
                Ok(_) => debug!(?ticket, "discarding superseded chat reply"),
                Err(error) => debug!(
                    ?ticket,
                    kind = error.kind(),
                    %error,
                    "discarding superseded chat failure"
                ),
            }
            return Ok(SendOutcome::Superseded);
        }
        state.snapshot.loading = false;
        match result {
            Ok(answer) => {
                state.snapshot.messages.push(ChatMessage::ai(answer));
                Ok(SendOutcome::Applied)
            }
            Err(error) => {
                let shown = UserFacingError::report_api("chat answer", &error);
                state.snapshot.error = Some(shown.clone());
                Err(shown)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use async_trait::async_trait;
    use tokio::sync::oneshot;

    use crate::domain::ErrorCode;
    use crate::domain::ports::{ApiError, MockChatApi};

    fn answer(text: &str) -> GeneratedAnswer {
        GeneratedAnswer {
            answer_text: text.to_owned(),
            reasoning: "回答から推測しました".to_owned(),
            referenced_memo_ids: vec![],
        }
    }

    /// Replies only when the test releases the reply for that query.
    #[derive(Default)]
    struct HeldReplies {
        pending: Mutex<HashMap<String, oneshot::Receiver<GeneratedAnswer>>>,
    }

    impl HeldReplies {
        fn hold(&self, query: &str) -> oneshot::Sender<GeneratedAnswer> {
            let (tx, rx) = oneshot::channel();
            self.pending
                .lock()
                .expect("pending mutex")
                .insert(query.to_owned(), rx);
            tx
        }
    }

    #[async_trait]
    impl ChatApi for HeldReplies {
        async fn generate_answer(&self, query_text: &str) -> Result<GeneratedAnswer, ApiError> {
            let rx = self
                .pending
                .lock()
                .expect("pending mutex")
                .remove(query_text)
                .expect("reply held for query");
            rx.await.map_err(|_| ApiError::transport("reply dropped"))
        }
    }

    async fn wait_for_messages(session: &ChatSession, count: usize) {
        while session.snapshot().messages.len() < count {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn late_reply_to_an_older_request_is_discarded() {
        let api = Arc::new(HeldReplies::default());
        let first_reply = api.hold("first");
        let second_reply = api.hold("second");
        let session = Arc::new(ChatSession::new(api));

        let first = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.send("first").await }
        });
        wait_for_messages(&session, 1).await;
        let second = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.send("second").await }
        });
        wait_for_messages(&session, 2).await;

        second_reply.send(answer("to second")).expect("second pending");
        assert_eq!(second.await.expect("join"), Ok(SendOutcome::Applied));
        first_reply.send(answer("to first")).expect("first pending");
        assert_eq!(first.await.expect("join"), Ok(SendOutcome::Superseded));

        let snapshot = session.snapshot();
        let contents = snapshot
            .messages
            .iter()
            .map(|message| message.content.as_str())
            .collect::<Vec<_>>();
        assert_eq!(contents, vec!["first", "second", "to second"]);
        assert!(!snapshot.loading);
    }

    #[tokio::test]
    async fn superseded_failure_does_not_replace_the_newest_reply() {
        let api = Arc::new(HeldReplies::default());
        let first_reply = api.hold("first");
        let second_reply = api.hold("second");
        let session = Arc::new(ChatSession::new(api));

        let first = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.send("first").await }
        });
        wait_for_messages(&session, 1).await;
        let second = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.send("second").await }
        });
        wait_for_messages(&session, 2).await;

        second_reply.send(answer("to second")).expect("second pending");
        assert_eq!(second.await.expect("join"), Ok(SendOutcome::Applied));
        drop(first_reply);
        assert_eq!(first.await.expect("join"), Ok(SendOutcome::Superseded));

        let snapshot = session.snapshot();
        assert!(snapshot.error.is_none());
        assert!(!snapshot.loading);
        assert_eq!(snapshot.messages.len(), 3);
    }

    #[tokio::test]
    async fn blank_messages_are_rejected_locally() {
        let mut api = MockChatApi::new();
        api.expect_generate_answer().never();
        let session = ChatSession::new(Arc::new(api));

        let error = session.send("   ").await.expect_err("blank input");

        assert_eq!(error.code(), ErrorCode::InvalidInput);
        assert!(session.snapshot().messages.is_empty());
    }

    #[tokio::test]
    async fn replies_carry_role_prefixed_ids_and_reasoning() {
        let mut api = MockChatApi::new();
        api.expect_generate_answer()
            .withf(|query| query == "強みは？")
            .returning(|_| Ok(answer("行動力です")));
        let session = ChatSession::new(Arc::new(api));

        assert_eq!(session.send(" 強みは？ ").await, Ok(SendOutcome::Applied));

        let messages = session.snapshot().messages;
        assert!(messages[0].id.starts_with("user-"));
        assert_eq!(messages[0].role, ChatRole::User);
        assert!(messages[1].id.starts_with("ai-"));
        assert_eq!(messages[1].reasoning.as_deref(), Some("回答から推測しました"));
    }

    #[tokio::test]
    async fn failures_of_the_newest_request_are_shown() {
        let mut api = MockChatApi::new();
        api.expect_generate_answer()
            .returning(|_| Err(ApiError::timeout("60s elapsed")));
        let session = ChatSession::new(Arc::new(api));

        let error = session.send("こんにちは").await.expect_err("timeout");

        assert_eq!(error.code(), ErrorCode::RequestTimedOut);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.error, Some(error));
        assert!(!snapshot.loading);
        assert_eq!(snapshot.messages.len(), 1);
    }
}
