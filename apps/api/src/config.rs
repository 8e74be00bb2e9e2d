use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::llm_client::DEFAULT_BASE_URL;

const API_KEY_VAR: &str = "OPENAI_API_KEY";
const DEFAULT_SECRETS_PATH: &str = ".secrets/secrets.toml";

/// Application configuration loaded from the secrets file and environment variables.
/// Fails at startup if the API credential is missing.
#[derive(Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub resource_root: Option<PathBuf>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let secrets_path = std::env::var("SECRETS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SECRETS_PATH));

        Ok(Config {
            openai_api_key: resolve_api_key(&secrets_path, std::env::var(API_KEY_VAR).ok())?,
            openai_base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            resource_root: std::env::var("COACH_RESOURCE_ROOT").ok().map(PathBuf::from),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct SecretsFile {
    openai: Option<OpenAiSecrets>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAiSecrets {
    #[serde(rename = "OPENAI_API_KEY")]
    api_key: Option<String>,
}

/// The secrets store wins over the environment. A missing secrets file is
/// fine; a malformed one is an error.
fn resolve_api_key(secrets_path: &Path, env_value: Option<String>) -> Result<String> {
    if secrets_path.exists() {
        let text = std::fs::read_to_string(secrets_path)
            .with_context(|| format!("Failed to read secrets file {}", secrets_path.display()))?;
        let secrets: SecretsFile = toml::from_str(&text)
            .with_context(|| format!("Failed to parse secrets file {}", secrets_path.display()))?;
        if let Some(key) = secrets
            .openai
            .and_then(|o| o.api_key)
            .filter(|k| !k.trim().is_empty())
        {
            return Ok(key);
        }
    }

    match env_value.filter(|k| !k.trim().is_empty()) {
        Some(key) => Ok(key),
        None => bail!(
            "Required credential '{API_KEY_VAR}' is not set. Add it to [openai] in {} or export it as an environment variable.",
            secrets_path.display()
        ),
    }
}
