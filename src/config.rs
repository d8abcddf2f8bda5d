use crate::error::{Result, StudioError};
use std::env;

pub const DEFAULT_MODEL: &str = "black-forest-labs/FLUX.1-schnell";
pub const DEFAULT_API_BASE: &str = "https://router.huggingface.co/hf-inference";
pub const TOKEN_PLACEHOLDER: &str = "your_token_here";

pub const SETUP_INSTRUCTIONS: &str = "Setup Instructions:
  1. Go to https://huggingface.co/settings/tokens
  2. Create a new token with Write permissions
  3. Copy the token
  4. Create a `.env` file in the project directory
  5. Add: `HUGGINGFACE_TOKEN=your_token_here`
  6. Restart the application";

#[derive(Debug, Clone)]
pub struct HuggingFaceConfig {
    pub token: Option<String>,
    pub model: String,
    pub api_base: String,
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        HuggingFaceConfig {
            token: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl HuggingFaceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let token = env::var("HUGGINGFACE_TOKEN").ok();
        let model = env::var("HUGGINGFACE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let api_base =
            env::var("HUGGINGFACE_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());

        HuggingFaceConfig {
            token,
            model,
            api_base,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// The configured token, refusing blanks and the `.env` template placeholder.
    pub fn require_token(&self) -> Result<&str> {
        match self.token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() && token != TOKEN_PLACEHOLDER => Ok(token),
            _ => Err(StudioError::CredentialMissing),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: Option<u16>,
    pub session_ttl_minutes: i64,
    pub huggingface: HuggingFaceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "127.0.0.1".to_string(),
            port: None,
            session_ttl_minutes: 60,
            huggingface: HuggingFaceConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT").ok().and_then(|port| port.parse().ok());
        let session_ttl_minutes = env::var("SESSION_TTL_MINUTES")
            .ok()
            .and_then(|val| val.parse().ok())
            .filter(|minutes: &i64| *minutes > 0)
            .unwrap_or(60);

        Config {
            host,
            port,
            session_ttl_minutes,
            huggingface: HuggingFaceConfig::from_env(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_session_ttl(mut self, minutes: i64) -> Self {
        self.session_ttl_minutes = minutes;
        self
    }

    pub fn with_huggingface(mut self, config: HuggingFaceConfig) -> Self {
        self.huggingface = config;
        self
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(8080)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port())
    }
}
