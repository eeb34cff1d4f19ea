//! The language model capabilities the assistant depends on, and an
//! implementation backed by an OpenAI compatible API.

use anyhow::{Context, Error, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::AppConfig;
use crate::openai::{JsonSchema, Message, ResponseFormat, Role, completion, message_content};

pub const CHAT_TEMPERATURE: f64 = 0.7;
pub const EXTRACTION_TEMPERATURE: f64 = 0.3;

/// Instructions plus the JSON schema the model output must follow.
#[derive(Debug, Clone)]
pub struct StructuredSchema {
    pub name: String,
    pub instructions: String,
    pub schema: Value,
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Free-form reply to `user_message` under `system_prompt`.
    async fn chat(&self, system_prompt: &str, user_message: &str) -> Result<String, Error>;

    /// Extract data from `text` that conforms to `schema`.
    async fn extract_structured(
        &self,
        schema: &StructuredSchema,
        text: &str,
    ) -> Result<Value, Error>;
}

/// Run an extraction and deserialize the result into `T`.
pub async fn extract_as<T: DeserializeOwned>(
    model: &dyn LanguageModel,
    schema: &StructuredSchema,
    text: &str,
) -> Result<T, Error> {
    let value = model.extract_structured(schema, text).await?;
    serde_json::from_value(value)
        .with_context(|| format!("Extracted data does not match schema {}", schema.name))
}

pub struct OpenAIModel {
    api_hostname: String,
    api_key: String,
    model: String,
}

impl OpenAIModel {
    pub fn new(api_hostname: &str, api_key: &str, model: &str) -> Self {
        Self {
            api_hostname: api_hostname.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.openai_api_hostname,
            &config.openai_api_key,
            &config.openai_model,
        )
    }
}

#[async_trait]
impl LanguageModel for OpenAIModel {
    async fn chat(&self, system_prompt: &str, user_message: &str) -> Result<String, Error> {
        let messages = vec![
            Message::new(Role::System, system_prompt),
            Message::new(Role::User, user_message),
        ];
        let resp = completion(
            &messages,
            None,
            CHAT_TEMPERATURE,
            &self.api_hostname,
            &self.api_key,
            &self.model,
        )
        .await?;
        Ok(message_content(&resp)?.trim().to_string())
    }

    async fn extract_structured(
        &self,
        schema: &StructuredSchema,
        text: &str,
    ) -> Result<Value, Error> {
        let messages = vec![
            Message::new(Role::System, &schema.instructions),
            Message::new(Role::User, text),
        ];
        let format = ResponseFormat::JsonSchema {
            json_schema: JsonSchema {
                name: schema.name.clone(),
                schema: schema.schema.clone(),
                strict: true,
            },
        };
        let resp = completion(
            &messages,
            Some(&format),
            EXTRACTION_TEMPERATURE,
            &self.api_hostname,
            &self.api_key,
            &self.model,
        )
        .await?;
        let content = message_content(&resp)?;
        tracing::debug!("Extraction result: {}", content);
        let value = serde_json::from_str(&content)
            .with_context(|| format!("Model returned invalid JSON: {}", content))?;
        Ok(value)
    }
}
