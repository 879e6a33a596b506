//! Process-level client settings read from the environment.

use crate::error::ConfigError;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:3000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_STORAGE_DIR: &str = ".admin-console";

/// Runtime mode. Affects diagnostic verbosity only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RuntimeMode {
    #[default]
    Development,
    Production,
    Test,
}

impl std::str::FromStr for RuntimeMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(RuntimeMode::Development),
            "production" | "prod" => Ok(RuntimeMode::Production),
            "test" => Ok(RuntimeMode::Test),
            _ => Err(ConfigError::Env(format!(
                "invalid APP_ENV: {} (expected development, production or test)",
                s
            ))),
        }
    }
}

impl RuntimeMode {
    pub fn default_directive(self) -> &'static str {
        match self {
            RuntimeMode::Development => "admin_crud_sdk=debug",
            RuntimeMode::Production | RuntimeMode::Test => "admin_crud_sdk=info",
        }
    }

    /// `RUST_LOG` when set, else the mode's default directive.
    pub fn env_filter(self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.default_directive()))
    }
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub timeout: Duration,
    pub mode: RuntimeMode,
    pub storage_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            mode: RuntimeMode::default(),
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
        }
    }
}

impl ClientConfig {
    /// Read `ADMIN_API_BASE_URL`, `ADMIN_API_TIMEOUT_SECS`, `APP_ENV` and `ADMIN_STORAGE_DIR`.
    /// Callers that want `.env` support load it first (`dotenvy::dotenv()`).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` with `.env` loaded first; a missing file is not an error.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = ClientConfig::default();
        if let Some(url) = lookup("ADMIN_API_BASE_URL").filter(|s| !s.trim().is_empty()) {
            config.api_base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(secs) = lookup("ADMIN_API_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|_| ConfigError::Env(format!("invalid ADMIN_API_TIMEOUT_SECS: {}", secs)))?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(mode) = lookup("APP_ENV") {
            config.mode = mode.parse()?;
        }
        if let Some(dir) = lookup("ADMIN_STORAGE_DIR").filter(|s| !s.trim().is_empty()) {
            config.storage_dir = PathBuf::from(dir);
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = dir.into();
        self
    }
}
