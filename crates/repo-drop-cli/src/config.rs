use std::path::PathBuf;

use repo_drop::{IgnorePatterns, PublishOptions, Visibility};
use repo_drop::publish::DEFAULT_BLOB_CONCURRENCY;
use serde::{Deserialize, Serialize};

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Overrides the GitHub API root, mainly for GitHub Enterprise.
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub debug: bool,
    #[serde(default = "default_blob_concurrency")]
    pub blob_concurrency: usize,
    #[serde(default)]
    pub account: AccountConfig,
    #[serde(default)]
    pub defaults: Defaults,
}

/// Stored credentials. Both are optional: the token can come from
/// `GITHUB_TOKEN` and the username from the token's owner.
#[derive(Clone, Default, Deserialize, Serialize)]
pub struct AccountConfig {
    pub username: Option<String>,
    pub token: Option<String>,
}

impl std::fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountConfig")
            .field("username", &self.username)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Values used when the command line leaves them out.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default = "default_message")]
    pub message: String,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            branch: default_branch(),
            message: default_message(),
            visibility: Visibility::default(),
            ignore: default_ignore(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: None,
            debug: false,
            blob_concurrency: default_blob_concurrency(),
            account: AccountConfig::default(),
            defaults: Defaults::default(),
        }
    }
}

impl AppConfig {
    pub fn publish_options(&self) -> PublishOptions {
        PublishOptions {
            blob_concurrency: self.blob_concurrency.max(1),
            debug_logging: self.debug,
        }
    }

    pub fn default_ignore_patterns(&self) -> IgnorePatterns {
        IgnorePatterns::new(&self.defaults.ignore)
    }

    /// Pick the API token: the environment wins over the config file.
    pub fn token(&self, env_token: Option<String>) -> Option<String> {
        env_token
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.account.token.clone())
            .filter(|t| !t.trim().is_empty())
    }
}

fn default_blob_concurrency() -> usize {
    DEFAULT_BLOB_CONCURRENCY
}

fn default_branch() -> String {
    "main".into()
}

fn default_message() -> String {
    "Initial commit".into()
}

fn default_ignore() -> Vec<String> {
    vec![".git/".into(), ".DS_Store".into()]
}

/// Config file path: `~/.config/repo-drop/config.toml`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("repo-drop").join("config.toml"))
}

/// Load config from file, falling back to defaults if missing.
pub fn load_config() -> AppConfig {
    if let Some(path) = config_path()
        && let Ok(contents) = std::fs::read_to_string(&path)
    {
        match toml::from_str::<AppConfig>(&contents) {
            Ok(config) => return config,
            Err(e) => eprintln!(
                "warning: failed to parse config at {}, using defaults: {e}",
                path.display()
            ),
        }
    }

    AppConfig::default()
}
