// Configuration for folio-github.
// Loads the GitHub user, featured repositories, retry, and cache settings from JSON.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};
use crate::github::{GITHUB_API_BASE, RetryPolicy, retry};

/// Environment variable that overrides the configured token.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// GitHub user whose profile and repositories are fetched.
    pub username: String,
    /// Optional token for a higher rate limit ceiling.
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
    /// Repositories to highlight, looked up individually by name.
    #[serde(default)]
    pub featured_repos: Vec<String>,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default)]
    pub retry: RetrySettings,
    /// Where snapshots are kept. Defaults to the platform cache directory.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
        }
    }
}

impl RetrySettings {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries,
            Duration::from_millis(self.initial_delay_ms),
        )
    }
}

fn default_api_base_url() -> String {
    GITHUB_API_BASE.to_string()
}

fn default_max_retries() -> u32 {
    retry::DEFAULT_MAX_RETRIES
}

fn default_initial_delay_ms() -> u64 {
    retry::DEFAULT_INITIAL_DELAY.as_millis() as u64
}

impl Config {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: None,
            featured_repos: Vec::new(),
            api_base_url: default_api_base_url(),
            retry: RetrySettings::default(),
            cache_dir: None,
        }
    }

    /// Load a config file, apply environment overrides, and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let mut config = Self::from_json(&contents)?;
        config.apply_env(std::env::var(TOKEN_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    /// A non-empty token from the environment replaces the configured one.
    pub fn apply_env(&mut self, env_token: Option<String>) {
        if let Some(token) = env_token.filter(|t| !t.trim().is_empty()) {
            self.token = Some(token);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(FolioError::Config("GitHub username is required".into()));
        }
        if self.retry.max_retries == 0 {
            return Err(FolioError::Config(
                "retry.max_retries must be at least 1".into(),
            ));
        }
        if let Some(name) = self.featured_repos.iter().find(|n| n.trim().is_empty()) {
            return Err(FolioError::Config(format!(
                "featured repository name {:?} is empty",
                name
            )));
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            return Err(FolioError::Config(format!(
                "api_base_url must be an http(s) URL, got {:?}",
                self.api_base_url
            )));
        }
        Ok(())
    }
}
