use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "CareMate";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default number of prior interactions inspected for repeated requests.
pub const DEFAULT_MEMORY_WINDOW: usize = 10;

/// Default notifier timeout per decision.
pub const DEFAULT_NOTIFY_TIMEOUT_MS: u64 = 2_000;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_LLM_MODEL: &str = "medgemma";
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "caremate=info,caremate_lib=info,tower_http=info"
}

/// Get the application data directory.
/// ~/CareMate/ on all platforms, falling back to the working directory.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

/// Connection settings for an Ollama-compatible LLM endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmSettings {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

/// Runtime settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub memory_window: usize,
    pub notify_timeout: Duration,
    /// `None` keeps classification on the keyword heuristics only.
    pub llm: Option<LlmSettings>,
    /// `None` delivers notifications to the staff dashboard table.
    pub webhook_url: Option<String>,
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = lookup("CAREMATE_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(app_data_dir);
        let db_path = lookup("CAREMATE_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("caremate.db"));

        let bind_raw = lookup("CAREMATE_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into());
        let bind_addr = bind_raw.parse().map_err(|_| ConfigError::Invalid {
            var: "CAREMATE_BIND_ADDR",
            value: bind_raw.clone(),
        })?;

        let memory_window =
            parse_number(&lookup, "CAREMATE_MEMORY_WINDOW", DEFAULT_MEMORY_WINDOW as u64)? as usize;
        let notify_timeout = Duration::from_millis(parse_positive(
            &lookup,
            "CAREMATE_NOTIFY_TIMEOUT_MS",
            DEFAULT_NOTIFY_TIMEOUT_MS,
        )?);

        let llm = match lookup("CAREMATE_LLM_URL").filter(|url| !url.trim().is_empty()) {
            Some(base_url) => Some(LlmSettings {
                base_url: base_url.trim_end_matches('/').to_string(),
                model: lookup("CAREMATE_LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.into()),
                timeout_secs: parse_positive(
                    &lookup,
                    "CAREMATE_LLM_TIMEOUT_SECS",
                    DEFAULT_LLM_TIMEOUT_SECS,
                )?,
            }),
            None => None,
        };

        let webhook_url = lookup("CAREMATE_WEBHOOK_URL").filter(|url| !url.trim().is_empty());

        Ok(Self {
            data_dir,
            db_path,
            bind_addr,
            memory_window,
            notify_timeout,
            llm,
            webhook_url,
        })
    }
}

fn parse_number<F>(lookup: &F, var: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::Invalid { var, value: raw }),
    }
}

/// Like `parse_number`, but zero is rejected: a zero timeout fails every call.
fn parse_positive<F>(lookup: &F, var: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match parse_number(lookup, var, default)? {
        0 => Err(ConfigError::Invalid {
            var,
            value: "0".into(),
        }),
        n => Ok(n),
    }
}
