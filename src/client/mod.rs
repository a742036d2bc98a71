//! Chat completion client.
//!
//! The client is a thin layer over a single HTTP exchange:
//! - Builds the message list from the prompt
//! - POSTs it to the configured endpoint
//! - Renders the answer, either at once or as it streams in

pub mod render;
pub mod sse;
pub mod stream;

#[cfg(test)]
mod testing;

use crate::protocol::{CompletionRequest, CompletionResponse, Sampling};
use reqwest::{Client, StatusCode};
use std::io::Write;
use thiserror::Error;
use tracing::debug;

pub use stream::StreamDecoder;

/// Failures of a single completion call. None of them are retried.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with something other than 200.
    #[error("server returned HTTP {0}")]
    HttpStatus(StatusCode),

    /// The request could not be sent or no response arrived.
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// A 200 response whose body is not a completion.
    #[error("invalid response: {0}")]
    Response(String),

    /// The connection broke while the answer was streaming.
    #[error("stream interrupted: {0}")]
    StreamTransport(#[source] reqwest::Error),

    /// Writing the answer to the output failed.
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// The message shown to the user. Details only go to the log.
    pub fn user_message(&self) -> &'static str {
        match self {
            ClientError::StreamTransport(_) => "Error while streaming the answer.",
            ClientError::Io(_) => "Error while writing the answer.",
            _ => "Error while asking the AI.",
        }
    }

    /// Whether the error leaves earlier output without a line break.
    fn before_answer(&self) -> bool {
        matches!(
            self,
            ClientError::HttpStatus(_) | ClientError::Request(_) | ClientError::Response(_)
        )
    }
}

/// Everything needed for one completion call.
#[derive(Debug, Clone, Copy, Default)]
pub struct Prompt<'a> {
    /// User message.
    pub text: &'a str,
    /// System message.
    pub system_prompt: &'a str,
    /// Server-side instruction template, passed through when non-empty.
    pub template: Option<&'a str>,
    /// Start of the assistant turn the model continues from.
    pub prefix: Option<&'a str>,
    /// Stream the answer if the client can decode streams.
    pub stream: bool,
    /// Suppress reasoning output.
    pub hide_reasoning: bool,
}

/// Client for an OpenAI-compatible `/v1/chat/completions` endpoint.
pub struct ChatCompletionClient {
    endpoint: String,
    sampling: Sampling,
    decoder: Option<StreamDecoder>,
    client: Client,
}

impl ChatCompletionClient {
    /// Create a client. Without a `decoder` every request is sent unstreamed.
    pub fn new(
        endpoint: impl Into<String>,
        sampling: Sampling,
        decoder: Option<StreamDecoder>,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .user_agent(concat!("askai/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Request)?;

        Ok(Self {
            endpoint: endpoint.into(),
            sampling,
            decoder,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Whether streamed answers can be decoded.
    pub fn can_stream(&self) -> bool {
        self.decoder.is_some()
    }

    /// Ask the server and write the answer to `out`.
    ///
    /// A non-empty prefix is written before the request is sent, so it is
    /// always the first thing in the output. If the request then fails the
    /// prefix line is terminated, leaving the caller a fresh line for its
    /// error message.
    pub async fn complete<W: Write>(&self, prompt: &Prompt<'_>, out: &mut W) -> Result<(), ClientError> {
        let prefix = prompt.prefix.filter(|p| !p.is_empty());

        if let Some(prefix) = prefix {
            write!(out, "{}", prefix)?;
            out.flush()?;
        }

        let result = self.ask(prompt, prefix, out).await;
        if let Err(e) = &result {
            if prefix.is_some() && e.before_answer() {
                writeln!(out)?;
                out.flush()?;
            }
        }
        result
    }

    async fn ask<W: Write>(
        &self,
        prompt: &Prompt<'_>,
        prefix: Option<&str>,
        out: &mut W,
    ) -> Result<(), ClientError> {
        let decoder = self.decoder.filter(|_| prompt.stream);

        let request = CompletionRequest::new(
            prompt.text,
            prompt.system_prompt,
            prompt.template,
            prefix,
            self.sampling,
            decoder.is_some(),
        );

        debug!(
            endpoint = %self.endpoint,
            stream = request.stream,
            messages = request.messages.len(),
            "Sending completion request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(ClientError::Request)?;

        let status = response.status();
        debug!(%status, "Received response");
        if status != StatusCode::OK {
            return Err(ClientError::HttpStatus(status));
        }

        match decoder {
            Some(decoder) => decoder.render(response, out, prompt.hide_reasoning).await,
            None => {
                let body: CompletionResponse = response
                    .json()
                    .await
                    .map_err(|e| ClientError::Response(e.to_string()))?;
                let message = body
                    .choices
                    .into_iter()
                    .next()
                    .map(|choice| choice.message)
                    .ok_or_else(|| ClientError::Response("no choices in response".to_string()))?;
                render::render_message(out, &message, prompt.hide_reasoning)?;
                Ok(())
            }
        }
    }
}
