use anyhow::Result;
use serde::Serialize;
use std::future::Future;
use std::pin::Pin;

mod openai;

pub use openai::OpenAI;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProviderUsage {
    pub prompt_tokens: Option<u64>,
    pub completion_tokens: Option<u64>,
    pub total_tokens: Option<u64>,
}

/// First completion candidate, relayed verbatim.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProviderResponse {
    pub text: String,
    pub model: Option<String>,
    pub usage: Option<ProviderUsage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: String) -> Self {
        Self {
            role: MessageRole::System,
            content,
        }
    }

    pub fn user(content: String) -> Self {
        Self {
            role: MessageRole::User,
            content,
        }
    }
}

pub type ProviderFuture = Pin<Box<dyn Future<Output = Result<ProviderResponse>> + Send>>;

/// A chat-style completion backend. Builders consume `self` so a configured
/// template can be cloned per request and filled in without shared state.
pub trait Provider: Clone + Send + Sync {
    fn with_key(self, key: String) -> Self;
    fn append_system_input(self, input: String) -> Self;
    fn append_user_input(self, input: String) -> Self;
    fn complete(self) -> ProviderFuture;
}
