//! Wire types for the chat completion endpoint.
//!
//! Requests are JSON documents POSTed to `/v1/chat/completions`. Responses come
//! back either as a single JSON body or as a stream of server-sent events.

use serde::{Deserialize, Serialize};

/// Default completion budget in tokens.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 1.0;

/// Default nucleus sampling cutoff.
pub const DEFAULT_TOP_P: f64 = 0.9;

/// Author of a message in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single role-tagged message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Sampling parameters shared by every request of one invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
        }
    }
}

/// Request body sent to the server.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub messages: Vec<Message>,
    pub mode: &'static str,
    /// Always empty; some servers inject it into the prompt otherwise.
    pub user_bio: &'static str,
    pub max_tokens: u32,
    /// Same value as `max_tokens`, for servers that only read this name.
    pub max_new_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction_template: Option<String>,
}

impl CompletionRequest {
    /// Build a request holding one system and one user message, followed by an
    /// assistant message when `prefix` is non-empty.
    pub fn new(
        text: &str,
        system_prompt: &str,
        template: Option<&str>,
        prefix: Option<&str>,
        sampling: Sampling,
        stream: bool,
    ) -> Self {
        let mut messages = vec![Message::system(system_prompt), Message::user(text)];
        if let Some(prefix) = prefix.filter(|p| !p.is_empty()) {
            messages.push(Message::assistant(prefix));
        }

        Self {
            messages,
            mode: "instruct",
            user_bio: "",
            max_tokens: sampling.max_tokens,
            max_new_tokens: sampling.max_tokens,
            temperature: sampling.temperature,
            top_p: sampling.top_p,
            stream,
            instruction_template: template
                .filter(|t| !t.is_empty())
                .map(str::to_string),
        }
    }
}

/// Non-streaming response body.
#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionChoice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub reasoning_content: Option<String>,
}

/// Payload of one server-sent event.
#[derive(Debug, Deserialize)]
pub struct StreamEvent {
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
pub struct StreamChoice {
    #[serde(default)]
    pub delta: Delta,
}

/// Incremental piece of the answer.
#[derive(Debug, Default, Deserialize)]
pub struct Delta {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub reasoning_content: Option<String>,
}
