use std::env;

use crate::google::oauth::LOOPBACK_REDIRECT_URI;

/// Zone attached to every event the assistant creates.
pub const DEFAULT_TIME_ZONE: &str = "America/Los_Angeles";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub openai_api_hostname: String,
    pub openai_api_key: String,
    pub openai_model: String,
    pub credentials_path: String,
    pub redirect_uri: String,
    pub google_api_url: String,
    pub time_zone: String,
    pub greeting: bool,
}

impl AppConfig {
    /// Load a `.env` file if there is one and then read the config
    /// from the process environment.
    pub fn load() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!("No .env file loaded: {}", e);
        }
        Self::default()
    }

    /// Build the config from any key lookup. Missing keys fall back
    /// to defaults so the assistant can start without a `.env`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let openai_api_hostname = lookup("CAL_ASSISTANT_LLM_HOST")
            .unwrap_or_else(|| "https://api.openai.com".to_string());
        let openai_api_key =
            lookup("OPENAI_API_KEY").unwrap_or_else(|| "thiswontworkforopenai".to_string());
        let openai_model = lookup("OPENAI_MODEL").unwrap_or_else(|| "gpt-4-turbo".to_string());
        let credentials_path = lookup("CAL_ASSISTANT_CREDENTIALS_PATH")
            .unwrap_or_else(|| "./client_secret.json".to_string());
        let redirect_uri = lookup("CAL_ASSISTANT_REDIRECT_URI")
            .unwrap_or_else(|| LOOPBACK_REDIRECT_URI.to_string());
        let google_api_url = lookup("CAL_ASSISTANT_GOOGLE_API_URL")
            .unwrap_or_else(|| "https://www.googleapis.com".to_string());
        let time_zone =
            lookup("CAL_ASSISTANT_TIME_ZONE").unwrap_or_else(|| DEFAULT_TIME_ZONE.to_string());
        let greeting = lookup("CAL_ASSISTANT_GREETING")
            .map(|v| !matches!(v.trim().to_lowercase().as_str(), "0" | "false" | "no" | "off"))
            .unwrap_or(true);

        Self {
            openai_api_hostname,
            openai_api_key,
            openai_model,
            credentials_path,
            redirect_uri,
            google_api_url,
            time_zone,
            greeting,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }
}
