/// LLM Client — the single point of entry for all provider calls in the coach API.
///
/// ARCHITECTURAL RULE: No other module may call the OpenAI API directly.
/// All chat, embedding, and transcription requests MUST go through this module.
///
/// Models are hardcoded — do not make configurable to prevent drift between
/// cached case embeddings and query embeddings.
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{multipart, Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;
#[cfg(test)]
pub mod testing;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
/// Chat model used for classification, extraction and generation.
pub const CHAT_MODEL: &str = "gpt-4";
/// Embedding model shared by case vectors and query vectors.
pub const EMBEDDING_MODEL: &str = "text-embedding-ada-002";
pub const TRANSCRIPTION_MODEL: &str = "whisper-1";
const MAX_RETRIES: u32 = 3;
/// Transcription failures are shown inline, so uploads are sent once.
const TRANSCRIPTION_ATTEMPTS: u32 = 1;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// The provider seam. Every pipeline component takes `&dyn LanguageModel`
/// so tests can substitute a scripted stub.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Sends `prompt` as a single system-role message and returns the reply text.
    async fn chat(&self, prompt: &str, temperature: f32) -> Result<String, LlmError>;

    /// Embeds a single string into a fixed-length vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError>;

    /// Transcribes an uploaded audio file to plain text.
    async fn transcribe(&self, audio: Bytes, file_name: &str) -> Result<String, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

impl ChatResponse {
    /// Extracts the text content of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// The single provider client used by all services.
/// Wraps the chat, embeddings and transcription endpoints with retry logic.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl LlmClient {
    pub fn new(api_key: String, base_url: String) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()?;
        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Sends a request built fresh by `build` on every attempt, up to `attempts`.
    /// Retries on 429 (rate limit), 5xx and transport errors with exponential backoff.
    async fn send_with_retry<F>(&self, build: F, attempts: u32) -> Result<Response, LlmError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..attempts {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match build().bearer_auth(&self.api_key).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            return Ok(response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited { retries: attempts }))
    }

    /// Makes a raw chat completion call, returning the full response object.
    pub async fn call(&self, prompt: &str, temperature: f32) -> Result<ChatResponse, LlmError> {
        let request_body = ChatRequest {
            model: CHAT_MODEL,
            messages: vec![ChatMessage {
                role: "system",
                content: prompt,
            }],
            temperature,
        };
        let url = self.endpoint("chat/completions");

        let response = self
            .send_with_retry(|| self.client.post(&url).json(&request_body), MAX_RETRIES)
            .await?;
        let chat: ChatResponse = response.json().await?;

        if let Some(usage) = &chat.usage {
            debug!(
                "Chat call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(chat)
    }
}

#[async_trait]
impl LanguageModel for LlmClient {
    async fn chat(&self, prompt: &str, temperature: f32) -> Result<String, LlmError> {
        let response = self.call(prompt, temperature).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let request_body = EmbeddingRequest {
            model: EMBEDDING_MODEL,
            input: text,
        };
        let url = self.endpoint("embeddings");

        let response = self
            .send_with_retry(|| self.client.post(&url).json(&request_body), MAX_RETRIES)
            .await?;
        let parsed: EmbeddingResponse = response.json().await?;

        if let Some(usage) = &parsed.usage {
            debug!("Embedding call succeeded: total_tokens={}", usage.total_tokens);
        }

        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or(LlmError::EmptyContent)
    }

    async fn transcribe(&self, audio: Bytes, file_name: &str) -> Result<String, LlmError> {
        let url = self.endpoint("audio/transcriptions");
        let file_name = file_name.to_string();

        // multipart::Form is consumed by send, so it is rebuilt per attempt.
        let build = || {
            let part = multipart::Part::bytes(audio.to_vec()).file_name(file_name.clone());
            let form = multipart::Form::new()
                .text("model", TRANSCRIPTION_MODEL)
                .part("file", part);
            self.client.post(&url).multipart(form)
        };
        let response = self.send_with_retry(build, TRANSCRIPTION_ATTEMPTS).await?;
        let parsed: TranscriptionResponse = response.json().await?;

        Ok(parsed.text)
    }
}

/// Calls the chat model and deserializes the reply as JSON.
/// The prompt must instruct the model to return valid JSON.
pub async fn chat_json<T: DeserializeOwned>(
    model: &dyn LanguageModel,
    prompt: &str,
    temperature: f32,
) -> Result<T, LlmError> {
    let text = model.chat(prompt, temperature).await?;

    // Strip markdown code fences if the model wraps JSON in them
    let text = strip_json_fences(&text);
    if text.is_empty() {
        return Err(LlmError::EmptyContent);
    }

    serde_json::from_str(text).map_err(LlmError::Parse)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let stripped = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match stripped {
        Some(inner) => inner
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(inner.trim_start()),
        None => text,
    }
}
