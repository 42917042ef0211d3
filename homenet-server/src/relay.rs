//! Ollama text-generation relay
//!
//! POSTs `{model, prompt, stream}` to `<host>/api/generate` and reads the
//! newline-delimited JSON reply. The buffered mode concatenates every
//! `response` field; the streaming mode yields them one at a time.

use async_stream::try_stream;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Relay errors
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("failed to make HTTP request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP request failed with status {0}: {1}")]
    Status(u16, String),

    #[error("failed to read response: {0}")]
    Read(reqwest::Error),

    #[error("no response text received from Ollama")]
    EmptyResponse,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// One line of a `/api/generate` reply
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GenerateChunk {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub done: bool,
}

/// Parse one reply line; blank or malformed lines yield `None`
pub fn parse_line(line: &str) -> Option<GenerateChunk> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    serde_json::from_str(line).ok()
}

/// Reassembles lines split across network chunks
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
    /// Prefix of `pending` already known to hold no newline
    scanned: usize,
}

impl LineBuffer {
    /// Append bytes and drain every line completed by them
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);

        let mut lines = Vec::new();
        let mut start = 0;
        let mut from = self.scanned;
        while let Some(offset) = self.pending[from..].iter().position(|b| *b == b'\n') {
            let end = from + offset;
            lines.push(String::from_utf8_lossy(&self.pending[start..end]).into_owned());
            start = end + 1;
            from = start;
        }

        self.pending.drain(..start);
        self.scanned = self.pending.len();
        lines
    }

    /// Whatever is left once the body ends without a trailing newline
    pub fn finish(&mut self) -> Option<String> {
        self.scanned = 0;
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        Some(String::from_utf8_lossy(&rest).into_owned())
    }
}

/// Client for a local Ollama server
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    /// Only the connection attempt is bounded; generation may take as long as it takes
    pub fn new(host: &str, model: &str) -> Result<Self, RelayError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            base_url: host.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send(&self, prompt: &str, stream: bool) -> Result<reqwest::Response, RelayError> {
        let url = format!("{}/api/generate", self.base_url);
        tracing::debug!(url = %url, model = %self.model, stream, "Querying Ollama");

        let response = self
            .http
            .post(&url)
            .json(&GenerateRequest {
                model: &self.model,
                prompt,
                stream,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Status(status.as_u16(), body));
        }

        Ok(response)
    }

    /// Full answer to `prompt`, read until the `done` line
    pub async fn generate(&self, prompt: &str) -> Result<String, RelayError> {
        let response = self.send(prompt, false).await?;
        let mut body = response.bytes_stream();
        let mut lines = LineBuffer::default();
        let mut answer = String::new();
        let mut done = false;

        'read: while let Some(bytes) = body.next().await {
            let bytes = bytes.map_err(RelayError::Read)?;
            for line in lines.push(&bytes) {
                if let Some(chunk) = parse_line(&line) {
                    answer.push_str(&chunk.response);
                    if chunk.done {
                        done = true;
                        break 'read;
                    }
                }
            }
        }

        if !done {
            if let Some(chunk) = lines.finish().as_deref().and_then(parse_line) {
                answer.push_str(&chunk.response);
            }
        }

        if answer.is_empty() {
            return Err(RelayError::EmptyResponse);
        }

        tracing::info!(chars = answer.len(), "Received Ollama response");
        Ok(answer)
    }

    /// Answer increments as they arrive; empty increments are skipped
    pub fn generate_stream(
        &self,
        prompt: &str,
    ) -> impl Stream<Item = Result<String, RelayError>> + Send + 'static {
        let client = self.clone();
        let prompt = prompt.to_string();

        try_stream! {
            let response = client.send(&prompt, true).await?;
            let mut body = response.bytes_stream();
            let mut lines = LineBuffer::default();
            let mut done = false;

            'read: while let Some(bytes) = body.next().await {
                let bytes = bytes.map_err(RelayError::Read)?;
                for line in lines.push(&bytes) {
                    if let Some(chunk) = parse_line(&line) {
                        if !chunk.response.is_empty() {
                            yield chunk.response;
                        }
                        if chunk.done {
                            done = true;
                            break 'read;
                        }
                    }
                }
            }

            if !done {
                if let Some(chunk) = lines.finish().as_deref().and_then(parse_line) {
                    if !chunk.response.is_empty() {
                        yield chunk.response;
                    }
                }
            }
        }
    }
}
