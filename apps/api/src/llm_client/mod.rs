//! OpenRouter chat-completions client. Every LLM request in the service goes
//! through `LlmClient`; analyzers and scorers never build HTTP calls themselves.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::OpenRouterConfig;

pub mod prompts;

const MAX_TOKENS: u32 = 1024;
const MAX_ATTEMPTS: u32 = 3;
const BASE_BACKOFF: Duration = Duration::from_secs(1);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const TEMPERATURE: f32 = 0.1;
const APP_REFERER: &str = "https://resumatch.app";
const APP_TITLE: &str = "ResuMatch";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request to OpenRouter failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenRouter answered {status}: {message}")]
    Api { status: u16, message: String },

    #[error("model output is not the expected JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("still rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("model returned no content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text of the first non-empty choice.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .iter()
            .filter_map(|c| c.message.content.as_deref())
            .find(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

enum Attempt {
    Done(Result<LlmResponse, LlmError>),
    Retry(LlmError),
}

#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    /// First retry delay; doubles on each further attempt.
    retry_base: Duration,
}

impl LlmClient {
    pub fn new(config: &OpenRouterConfig) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(REQUEST_TIMEOUT).build()?,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry_base: BASE_BACKOFF,
        })
    }

    #[cfg(test)]
    pub(crate) fn with_retry_base(mut self, retry_base: Duration) -> Self {
        self.retry_base = retry_base;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One chat completion. 429s, 5xx replies and transport errors are retried
    /// up to `MAX_ATTEMPTS` times with a doubling delay; other statuses fail at once.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<LlmResponse, LlmError> {
        let body = ChatRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            let err = match self.send_completion(&body).await {
                Attempt::Done(result) => return result,
                Attempt::Retry(err) => err,
            };
            if attempt >= MAX_ATTEMPTS {
                return Err(err);
            }
            let delay = backoff(self.retry_base, attempt);
            warn!(
                model = %self.model,
                "OpenRouter attempt {attempt}/{MAX_ATTEMPTS} failed ({err}); retrying in {}ms",
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn send_completion(&self, body: &ChatRequest<'_>) -> Attempt {
        let sent = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", APP_REFERER)
            .header("X-Title", APP_TITLE)
            .json(body)
            .send()
            .await;
        let response = match sent {
            Ok(response) => response,
            Err(e) => return Attempt::Retry(LlmError::Http(e)),
        };

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Attempt::Retry(LlmError::RateLimited {
                retries: MAX_ATTEMPTS - 1,
            });
        }
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let err = LlmError::Api {
                status: status.as_u16(),
                message: api_error_message(raw),
            };
            return if status.is_server_error() {
                Attempt::Retry(err)
            } else {
                Attempt::Done(Err(err))
            };
        }

        let parsed = response.json::<LlmResponse>().await.map_err(LlmError::Http);
        if let Ok(LlmResponse {
            usage: Some(usage), ..
        }) = &parsed
        {
            debug!(
                model = %self.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "OpenRouter completion"
            );
        }
        Attempt::Done(parsed)
    }

    /// Calls the LLM and returns its text content.
    pub async fn call_text(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        let response = self.call(prompt, system).await?;
        response
            .text()
            .map(|t| t.trim().to_string())
            .ok_or(LlmError::EmptyContent)
    }

    /// Calls the LLM and decodes its reply into `T`. Prompts used here ask for
    /// a bare JSON object.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
    ) -> Result<T, LlmError> {
        let response = self.call(prompt, system).await?;
        let text = response.text().ok_or(LlmError::EmptyContent)?;
        parse_json_payload(text)
    }

    /// Checks that the API is reachable with the configured key.
    pub async fn probe(&self) -> Result<(), LlmError> {
        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(LlmError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            })
        }
    }
}

/// Delay before retry number `attempt` (1-based): base, 2×base, 4×base, ...
fn backoff(base: Duration, attempt: u32) -> Duration {
    base * (1u32 << attempt.saturating_sub(1).min(6))
}

/// OpenRouter wraps errors as `{"error": {"message": ...}}`; anything else is
/// passed through untouched.
fn api_error_message(raw: String) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(&raw)
        .map(|envelope| envelope.error.message)
        .unwrap_or(raw)
}

/// Decodes model output, tolerating a Markdown code block around the JSON or
/// prose before and after the outermost object.
fn parse_json_payload<T: DeserializeOwned>(text: &str) -> Result<T, LlmError> {
    let body = unfence(text);
    serde_json::from_str(body).or_else(|first_err| {
        match (body.find('{'), body.rfind('}')) {
            (Some(open), Some(close)) if open < close => {
                serde_json::from_str(&body[open..=close]).map_err(LlmError::Parse)
            }
            _ => Err(LlmError::Parse(first_err)),
        }
    })
}

/// Returns the contents of a surrounding ``` block (any language tag), or the
/// trimmed input when there is none.
fn unfence(text: &str) -> &str {
    let text = text.trim();
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    // drop the language tag line, if any
    let inner = match inner.find('\n') {
        Some(newline) if !inner[..newline].trim().contains(char::is_whitespace) => {
            &inner[newline + 1..]
        }
        _ => inner,
    };
    inner.trim_end().trim_end_matches("```").trim()
}
