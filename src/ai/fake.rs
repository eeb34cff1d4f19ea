//! Scripted language model for tests.

use std::sync::Mutex;

use anyhow::{Error, anyhow};
use async_trait::async_trait;
use serde_json::Value;

use super::llm::{LanguageModel, StructuredSchema};

/// Replies with canned values and records what it was asked. A `None`
/// reply makes the matching call fail.
#[derive(Default)]
pub struct FakeModel {
    pub extraction: Option<Value>,
    pub chat_reply: Option<String>,
    extraction_calls: Mutex<Vec<String>>,
    chat_calls: Mutex<Vec<(String, String)>>,
}

impl FakeModel {
    pub fn extracting(extraction: Value) -> Self {
        Self {
            extraction: Some(extraction),
            ..Default::default()
        }
    }

    pub fn replying(reply: &str) -> Self {
        Self {
            chat_reply: Some(reply.to_string()),
            ..Default::default()
        }
    }

    pub fn with_reply(mut self, reply: &str) -> Self {
        self.chat_reply = Some(reply.to_string());
        self
    }

    pub fn extraction_calls(&self) -> Vec<String> {
        self.extraction_calls.lock().unwrap().clone()
    }

    /// `(system_prompt, user_message)` pairs in call order.
    pub fn chat_calls(&self) -> Vec<(String, String)> {
        self.chat_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for FakeModel {
    async fn chat(&self, system_prompt: &str, user_message: &str) -> Result<String, Error> {
        self.chat_calls
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_message.to_string()));
        self.chat_reply.clone().ok_or(anyhow!("model unavailable"))
    }

    async fn extract_structured(
        &self,
        _schema: &StructuredSchema,
        text: &str,
    ) -> Result<Value, Error> {
        self.extraction_calls.lock().unwrap().push(text.to_string());
        self.extraction.clone().ok_or(anyhow!("extraction timed out"))
    }
}
