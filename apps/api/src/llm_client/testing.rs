//! Scripted `LanguageModel` for unit tests. No network access.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use super::{LanguageModel, LlmError};

/// Replies to chat calls from a queue (the last reply repeats once the queue
/// drains), embeds text by the first registered substring it contains, and
/// records every prompt it sees.
pub struct StubModel {
    chat_replies: Mutex<VecDeque<String>>,
    last_reply: Mutex<String>,
    embeddings: Vec<(String, Vec<f32>)>,
    fallback_embedding: Vec<f32>,
    transcript: Option<String>,
    pub prompts: Mutex<Vec<(String, f32)>>,
    pub embed_calls: AtomicUsize,
}

impl StubModel {
    pub fn new() -> Self {
        Self {
            chat_replies: Mutex::new(VecDeque::new()),
            last_reply: Mutex::new(String::new()),
            embeddings: Vec::new(),
            fallback_embedding: vec![0.0, 0.0, 0.0],
            transcript: None,
            prompts: Mutex::new(Vec::new()),
            embed_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_chat_reply(self, reply: &str) -> Self {
        self.chat_replies.lock().unwrap().push_back(reply.to_string());
        self
    }

    /// Any text containing `needle` embeds to `vector`. Registration order wins.
    pub fn with_embedding(mut self, needle: &str, vector: Vec<f32>) -> Self {
        self.embeddings.push((needle.to_string(), vector));
        self
    }

    pub fn with_transcript(mut self, transcript: &str) -> Self {
        self.transcript = Some(transcript.to_string());
        self
    }

    pub fn prompt_at(&self, index: usize) -> (String, f32) {
        self.prompts.lock().unwrap()[index].clone()
    }

    pub fn chat_calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn embed_calls(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LanguageModel for StubModel {
    async fn chat(&self, prompt: &str, temperature: f32) -> Result<String, LlmError> {
        self.prompts
            .lock()
            .unwrap()
            .push((prompt.to_string(), temperature));

        let mut last = self.last_reply.lock().unwrap();
        if let Some(reply) = self.chat_replies.lock().unwrap().pop_front() {
            *last = reply;
        }
        Ok(last.clone())
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        let vector = self
            .embeddings
            .iter()
            .find(|(needle, _)| text.contains(needle.as_str()))
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| self.fallback_embedding.clone());
        Ok(vector)
    }

    async fn transcribe(&self, _audio: Bytes, _file_name: &str) -> Result<String, LlmError> {
        self.transcript.clone().ok_or(LlmError::Api {
            status: 400,
            message: "Invalid file format.".to_string(),
        })
    }
}
