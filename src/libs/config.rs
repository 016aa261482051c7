use crate::libs::api::oauth::OAuthCredentials;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_API_BASE: &str = "https://www.yammer.com/api/v1";
pub const DEFAULT_OAUTH_BASE: &str = "https://www.yammer.com/oauth";
const DEFAULT_USER_AGENT: &str = concat!("yammer-feed/", env!("CARGO_PKG_VERSION"));
const TOKEN_FILE_NAME: &str = ".yammer-token";

pub const CONSUMER_KEY_ENV: &str = "YAMMER_CONSUMER_KEY";
pub const CONSUMER_SECRET_ENV: &str = "YAMMER_CONSUMER_SECRET";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Missing {0}; set it in the config file or the environment")]
    MissingCredential(&'static str),
}

/// Settings read from `config.toml`. Every field may be left out.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct YammerConfig {
    pub consumer_key: Option<String>,
    pub consumer_secret: Option<String>,
    pub api_base: Option<String>,
    pub oauth_base: Option<String>,
    pub token_file: Option<PathBuf>,
    pub mugshot_dir: Option<PathBuf>,
    pub prefetch_mugshots: bool,
    pub user_agent: Option<String>,
}

impl YammerConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("yammer").join("config.toml"))
    }

    /// Reads `path`, or the default location when `None`. A missing default file is
    /// not an error; a missing explicit file is.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(path) => (Some(path.to_path_buf()), true),
            None => (Self::default_path(), false),
        };

        let mut config = match path {
            Some(path) if explicit || path.exists() => {
                debug!(path = %path.display(), "Loading config");
                let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
                Self::from_toml(&contents)?
            }
            _ => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(CONSUMER_KEY_ENV) {
            self.consumer_key = Some(key);
        }
        if let Some(secret) = lookup(CONSUMER_SECRET_ENV) {
            self.consumer_secret = Some(secret);
        }
    }

    pub fn credentials(&self) -> Result<OAuthCredentials, ConfigError> {
        let consumer_key = self
            .consumer_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingCredential("consumer_key"))?;
        let consumer_secret = self
            .consumer_secret
            .clone()
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::MissingCredential("consumer_secret"))?;
        Ok(OAuthCredentials {
            consumer_key,
            consumer_secret,
        })
    }

    pub fn api_base(&self) -> &str {
        self.api_base.as_deref().unwrap_or(DEFAULT_API_BASE)
    }

    pub fn oauth_base(&self) -> &str {
        self.oauth_base.as_deref().unwrap_or(DEFAULT_OAUTH_BASE)
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    pub fn token_file(&self) -> PathBuf {
        self.token_file.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_default()
                .join(TOKEN_FILE_NAME)
        })
    }

    pub fn mugshot_dir(&self) -> PathBuf {
        self.mugshot_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("yammer")
                .join("mugshots")
        })
    }
}
