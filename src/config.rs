use std::path::{Path, PathBuf};
use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "job_archiver.toml";
pub const ENV_PREFIX: &str = "JOB_ARCHIVER";

const IPAD_USER_AGENT: &str = "Mozilla/5.0 (iPad; CPU OS 12_2 like Mac OS X) AppleWebKit/605.1.15 \
                               (KHTML, like Gecko) Mobile/15E148";

/// What a run does when one job page cannot be extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemFailurePolicy {
    /// Stop the whole run with the item's error.
    #[default]
    Abort,
    /// Log the failure and move on to the next item.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub site: String,
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub max_redirects: usize,
    /// Exclusive upper bound of the random pause between item fetches.
    pub max_delay_ms: u64,
    pub output_dir: Option<PathBuf>,
    pub on_item_error: ItemFailurePolicy,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            site: "work_ua".to_string(),
            base_url: "https://www.work.ua".to_string(),
            user_agent: IPAD_USER_AGENT.to_string(),
            timeout_secs: 30,
            max_redirects: 10,
            max_delay_ms: 2000,
            output_dir: None,
            on_item_error: ItemFailurePolicy::Abort,
            max_retries: 0,
            retry_backoff_ms: 500,
        }
    }
}

impl Settings {
    /// Defaults, overridden by `job_archiver.toml` (if present), overridden by
    /// `JOB_ARCHIVER_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_file(Path::new(DEFAULT_CONFIG_FILE))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let settings: Self = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Message("base_url must not be empty".into()));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Message("user_agent must not be empty".into()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Where exported files land: the configured directory, else the desktop,
    /// else the home directory, else the working directory.
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .or_else(dirs::desktop_dir)
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
