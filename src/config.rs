use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "LLMGATE_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub completion: CompletionConfig,
    /// Credential for the completion API, read from `completion.api_key_env`.
    /// Never validated at startup: a missing key only fails `complete` calls.
    #[serde(skip)]
    pub api_key: Option<String>,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Issuer reported by the OAuth metadata stub
    #[serde(default = "default_issuer")]
    pub issuer: String,
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Remote completion API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Client-side request timeout; unset means wait for the remote indefinitely
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_issuer() -> String {
    "https://example.com".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            issuer: default_issuer(),
            allowed_origins: Vec::new(),
        }
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            api_key_env: default_api_key_env(),
            timeout_secs: None,
        }
    }
}

impl Config {
    /// Load configuration
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in LLMGATE_CONFIG environment variable (must exist)
    /// 2. ./config.toml in current directory (optional, defaults apply when absent)
    pub fn load() -> Result<Self> {
        // .env is optional
        let _ = dotenv::dotenv();

        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => {
                let path = PathBuf::from("config.toml");
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    Config::default()
                }
            }
        };

        config.api_key = std::env::var(&config.completion.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());

        config.validate()?;

        Ok(config)
    }

    /// Read and parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Parse TOML config text
    pub fn parse(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str)?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.gateway.port == 0 {
            anyhow::bail!("gateway.port must be greater than 0");
        }

        if self.completion.model.trim().is_empty() {
            anyhow::bail!("completion.model must not be empty");
        }

        if !(0.0..=2.0).contains(&self.completion.temperature) {
            anyhow::bail!("completion.temperature must be between 0.0 and 2.0");
        }

        if !self.completion.base_url.starts_with("http://")
            && !self.completion.base_url.starts_with("https://")
        {
            anyhow::bail!(
                "completion.base_url must be an http(s) URL, got: {}",
                self.completion.base_url
            );
        }

        Ok(())
    }

    /// Address the HTTP listener binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.gateway.host, self.gateway.port)
    }
}
