use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::Parser;
use docchat_engine::BackendSettings;
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use super::logging::LogDestination;

/// Command line for the docchat terminal client.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "docchat",
    version,
    about = "Upload documents to a docchat backend and chat about them"
)]
pub struct Cli {
    /// RON configuration file; a missing file means built-in defaults.
    #[arg(long, env = "DOCCHAT_CONFIG", default_value = "docchat.ron")]
    pub config: PathBuf,

    /// Base URL of the backend API, e.g. http://127.0.0.1:8000/api/
    #[arg(long, env = "DOCCHAT_BASE_URL")]
    pub base_url: Option<String>,

    /// Where log output goes.
    #[arg(long, value_enum)]
    pub log: Option<LogDestination>,

    /// Log level (error, warn, info, debug, trace, off).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_upload_bytes: u64,
    pub max_concurrent_uploads: usize,
    pub log_destination: LogDestination,
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let backend = BackendSettings::default();
        Self {
            base_url: backend.base_url,
            connect_timeout_secs: backend.connect_timeout.as_secs(),
            request_timeout_secs: backend.request_timeout.as_secs(),
            max_upload_bytes: backend.max_upload_bytes,
            max_concurrent_uploads: backend.max_concurrent_uploads,
            log_destination: LogDestination::default(),
            log_level: "info".to_string(),
        }
    }
}

impl ClientConfig {
    /// Reads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read config {path:?}"));
            }
        };
        ron::from_str(&content).with_context(|| format!("failed to parse config {path:?}"))
    }

    /// Command line values take precedence over the file.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(base_url) = &cli.base_url {
            self.base_url = base_url.clone();
        }
        if let Some(destination) = cli.log {
            self.log_destination = destination;
        }
        if let Some(level) = &cli.log_level {
            self.log_level = level.clone();
        }
    }

    pub fn level(&self) -> anyhow::Result<LevelFilter> {
        LevelFilter::from_str(self.log_level.trim())
            .map_err(|_| anyhow!("unknown log level {:?}", self.log_level))
    }

    pub fn backend_settings(&self) -> BackendSettings {
        BackendSettings {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_upload_bytes: self.max_upload_bytes,
            max_concurrent_uploads: self.max_concurrent_uploads,
        }
    }
}
