#![allow(dead_code)]
//! # Common Test Utilities
//!
//! Shared helpers for the integration tests: a scripted mock provider
//! that records every tier call, and one-time tracing setup.

use async_trait::async_trait;
use feedlens::providers::ai::AiProvider;
use feedlens::InsightError;
use std::sync::{Arc, Once, RwLock};

static INIT: Once = Once::new();

/// Initializes the tracing subscriber once for the test binary.
pub fn setup_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt::init();
    });
}

/// The outcome of one scripted provider call.
#[derive(Clone, Debug)]
pub enum ScriptedReply {
    /// The call succeeds with this raw text.
    Text(String),
    /// The call fails with a capability mismatch.
    Unsupported(String),
    /// The call fails with a transport/provider error.
    Transport(String),
}

impl ScriptedReply {
    fn into_result(self) -> Result<String, InsightError> {
        match self {
            ScriptedReply::Text(text) => Ok(text),
            ScriptedReply::Unsupported(msg) => Err(InsightError::UnsupportedResponseMode(msg)),
            ScriptedReply::Transport(msg) => Err(InsightError::AiApi(msg)),
        }
    }
}

/// A record of one call the mock received: which tier shape it was and
/// the prompts it carried.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedCall {
    pub shape: &'static str,
    pub system_prompt: String,
    pub user_prompt: String,
}

/// A mock AI provider driven by a fixed script of replies.
///
/// Replies are consumed in order regardless of which tier asks; the
/// call history records which shapes were exercised.
#[derive(Clone, Debug)]
pub struct MockAiProvider {
    pub call_history: Arc<RwLock<Vec<RecordedCall>>>,
    replies: Arc<RwLock<Vec<ScriptedReply>>>,
}

impl MockAiProvider {
    pub fn new(replies: Vec<ScriptedReply>) -> Self {
        Self {
            call_history: Arc::new(RwLock::new(Vec::new())),
            replies: Arc::new(RwLock::new(replies.into_iter().rev().collect())),
        }
    }

    pub fn shapes_called(&self) -> Vec<&'static str> {
        self.call_history
            .read()
            .unwrap()
            .iter()
            .map(|c| c.shape)
            .collect()
    }

    fn next_reply(&self, shape: &'static str, system: &str, user: &str) -> Result<String, InsightError> {
        self.call_history.write().unwrap().push(RecordedCall {
            shape,
            system_prompt: system.to_string(),
            user_prompt: user.to_string(),
        });
        match self.replies.write().unwrap().pop() {
            Some(reply) => reply.into_result(),
            None => Ok("{}".to_string()),
        }
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate_structured(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, InsightError> {
        self.next_reply("structured", system_prompt, user_prompt)
    }

    async fn generate_chat(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        json_mode: bool,
    ) -> Result<String, InsightError> {
        let shape = if json_mode { "chat-json" } else { "chat-plain" };
        self.next_reply(shape, system_prompt, user_prompt)
    }
}

/// A minimal valid insight response, useful as a happy-path reply.
pub fn valid_insight_json() -> String {
    serde_json::json!({
        "tldr": "Customers are mostly happy.",
        "themes": ["speed"],
        "improvements": ["faster onboarding"],
        "quick_wins": ["fix signup typo"],
        "long_term": ["rework billing"]
    })
    .to_string()
}
