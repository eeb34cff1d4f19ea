//! OAuth for the Google Calendar API using an installed-app client
//! and a long lived refresh token stored next to the client secret.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";
// Google no longer accepts the out-of-band redirect, so consent lands
// on a loopback address and the code is read from the browser URL.
pub const LOOPBACK_REDIRECT_URI: &str = "http://localhost:8085/callback";

// Refresh a little early so a token doesn't expire mid-request
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,
}

// Google's console downloads the client secret nested under
// `installed` or `web`. Files written by `auth` are flat.
#[derive(Deserialize)]
#[serde(untagged)]
enum CredentialsFile {
    Installed { installed: Credentials },
    Web { web: Credentials },
    Flat(Credentials),
}

impl Credentials {
    pub fn parse(content: &str) -> Result<Self> {
        let file: CredentialsFile =
            serde_json::from_str(content).context("Invalid credentials file")?;
        let creds = match file {
            CredentialsFile::Installed { installed } => installed,
            CredentialsFile::Web { web } => web,
            CredentialsFile::Flat(creds) => creds,
        };
        Ok(creds)
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(Path::new(path))
            .with_context(|| format!("Failed to read credentials file {}", path))?;
        Self::parse(&content)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(Path::new(path), content)
            .with_context(|| format!("Failed to write credentials file {}", path))
    }

    pub fn token_url(&self) -> &str {
        self.token_uri.as_deref().unwrap_or(GOOGLE_TOKEN_URL)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OAuthToken {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

async fn request_token(token_url: &str, form: &[(&str, &str)]) -> Result<OAuthToken> {
    let res = Client::new().post(token_url).form(form).send().await?;
    let status = res.status();
    let text = res.text().await.unwrap_or_default();
    if !status.is_success() {
        bail!("Token request failed: {} ({})", status, text);
    }
    let token: OAuthToken = serde_json::from_str(&text)?;
    Ok(token)
}

pub async fn refresh_access_token(
    token_url: &str,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<OAuthToken> {
    request_token(
        token_url,
        &[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ],
    )
    .await
}

pub async fn exchange_code_for_token(
    token_url: &str,
    client_id: &str,
    client_secret: &str,
    code: &str,
    redirect_uri: &str,
) -> Result<OAuthToken> {
    request_token(
        token_url,
        &[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ],
    )
    .await
}

/// URL the user opens to grant calendar access.
pub fn consent_url(client_id: &str, redirect_uri: &str) -> String {
    format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
        GOOGLE_AUTH_URL,
        urlencoding::encode(client_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(CALENDAR_SCOPE)
    )
}

/// Accept either the bare authorization code or the whole URL the
/// browser was redirected to.
pub fn authorization_code(input: &str) -> Result<String> {
    let input = input.trim();
    if input.is_empty() {
        bail!("No authorization code given");
    }
    let Ok(url) = Url::parse(input) else {
        return Ok(input.to_string());
    };
    if let Some((_, err)) = url.query_pairs().find(|(k, _)| k == "error") {
        bail!("Authorization was denied: {}", err);
    }
    url.query_pairs()
        .find(|(k, _)| k == "code")
        .map(|(_, code)| code.into_owned())
        .ok_or(anyhow!("No code in redirect URL {}", input))
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now + Duration::seconds(EXPIRY_MARGIN_SECS) < expires_at,
            None => true,
        }
    }
}

/// Hands out access tokens, refreshing through the token endpoint
/// when the cached one is missing or about to expire.
pub struct TokenProvider {
    credentials: Option<Credentials>,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn from_credentials(credentials: Credentials) -> Self {
        Self {
            credentials: Some(credentials),
            cached: Mutex::new(None),
        }
    }

    /// A token that never refreshes. Useful for tests and for tokens
    /// minted outside of this program.
    pub fn fixed(access_token: &str) -> Self {
        Self {
            credentials: None,
            cached: Mutex::new(Some(CachedToken {
                access_token: access_token.to_string(),
                expires_at: None,
            })),
        }
    }

    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref()
            && token.is_fresh(Utc::now())
        {
            return Ok(token.access_token.clone());
        }

        let creds = self
            .credentials
            .as_ref()
            .ok_or(anyhow!("No credentials available to refresh the access token"))?;
        let refresh_token = creds.refresh_token.as_deref().ok_or(anyhow!(
            "Credentials have no refresh token, run the `auth` command first"
        ))?;

        tracing::debug!("Refreshing Google access token");
        let token = refresh_access_token(
            creds.token_url(),
            &creds.client_id,
            &creds.client_secret,
            refresh_token,
        )
        .await?;

        let expires_at = token
            .expires_in
            .filter(|secs| *secs > 0)
            .map(|secs| Utc::now() + Duration::seconds(secs));
        *cached = Some(CachedToken {
            access_token: token.access_token.clone(),
            expires_at,
        });

        Ok(token.access_token)
    }
}
