use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use lib_letterboxed::cache::RefreshPolicy;
use lib_letterboxed::puzzle::DEFAULT_SOURCE_URL;
use lib_letterboxed::retrieve::ApiClientOptions;

#[derive(Parser, Deserialize, Serialize, Debug, Clone, Default)]
#[clap(about = "Letter Boxed puzzle solutions server", version)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[clap(long, env = "LETTERBOXED_PORT", help = "Port to listen on for HTTP clients.")]
    pub port: Option<u16>,

    #[clap(long, env = "LETTERBOXED_BIND_ADDR", help = "Address to bind the HTTP listener to.")]
    pub bind_addr: Option<String>,

    #[clap(long, env = "LETTERBOXED_CONFIG_PATH", help = "Path to the JSON configuration file.")]
    pub config_path: Option<PathBuf>,

    #[clap(long, env = "LETTERBOXED_LOG_DIR", help = "Directory for log files.")]
    pub log_dir: Option<PathBuf>,

    #[clap(long, env = "LETTERBOXED_LOG_LEVEL", help = "Logging level (trace, debug, info, warn, error).")]
    pub log_level: Option<String>,

    #[clap(long, env = "LETTERBOXED_SOURCE_URL", help = "Page the puzzle is scraped from.")]
    pub source_url: Option<String>,

    #[clap(long, env = "LETTERBOXED_DATA_FILE", help = "JSON record the solved puzzle is persisted to.")]
    pub data_file: Option<PathBuf>,

    #[clap(long, env = "LETTERBOXED_IDLE_RETRY_SECONDS", help = "Seconds to wait before retrying when no puzzle is held.")]
    pub idle_retry_seconds: Option<u64>,

    #[clap(long, env = "LETTERBOXED_ERROR_BACKOFF_SECONDS", help = "Seconds to wait after a failed background refresh.")]
    pub error_backoff_seconds: Option<u64>,

    #[clap(long, env = "LETTERBOXED_HTTP_TIMEOUT_SECONDS", help = "Timeout in seconds for one request to the puzzle page.")]
    pub http_timeout_seconds: Option<u64>,

    #[clap(long, env = "LETTERBOXED_HTTP_MAX_RETRIES", help = "Retries on transient failures of the puzzle page request.")]
    pub http_max_retries: Option<u32>,
}

impl Config {
    // Merge two Config structs, where 'other' overrides 'self' for Some values
    fn merge(self, other: Config) -> Config {
        Config {
            port: other.port.or(self.port),
            bind_addr: other.bind_addr.or(self.bind_addr),
            config_path: other.config_path.or(self.config_path),
            log_dir: other.log_dir.or(self.log_dir),
            log_level: other.log_level.or(self.log_level),
            source_url: other.source_url.or(self.source_url),
            data_file: other.data_file.or(self.data_file),
            idle_retry_seconds: other.idle_retry_seconds.or(self.idle_retry_seconds),
            error_backoff_seconds: other.error_backoff_seconds.or(self.error_backoff_seconds),
            http_timeout_seconds: other.http_timeout_seconds.or(self.http_timeout_seconds),
            http_max_retries: other.http_max_retries.or(self.http_max_retries),
        }
    }

    fn defaults() -> Config {
        Config {
            port: Some(8000),
            bind_addr: Some("0.0.0.0".to_string()),
            log_dir: Some(PathBuf::from("./logs")),
            log_level: Some("info".to_string()),
            source_url: Some(DEFAULT_SOURCE_URL.to_string()),
            data_file: Some(PathBuf::from("letter_boxed_data.json")),
            idle_retry_seconds: Some(60),
            error_backoff_seconds: Some(300),
            http_timeout_seconds: Some(30),
            http_max_retries: Some(3),
            ..Default::default()
        }
    }

    pub fn refresh_policy(&self) -> RefreshPolicy {
        let fallback = RefreshPolicy::default();
        RefreshPolicy {
            idle_interval: self
                .idle_retry_seconds
                .map(Duration::from_secs)
                .unwrap_or(fallback.idle_interval),
            error_backoff: self
                .error_backoff_seconds
                .map(Duration::from_secs)
                .unwrap_or(fallback.error_backoff),
        }
    }

    pub fn client_options(&self) -> ApiClientOptions {
        let fallback = ApiClientOptions::default();
        ApiClientOptions {
            timeout: self
                .http_timeout_seconds
                .map(Duration::from_secs)
                .unwrap_or(fallback.timeout),
            max_retries: self.http_max_retries.unwrap_or(fallback.max_retries),
            ..fallback
        }
    }
}

/// Resolves defaults, then `server_letterboxed.conf`, then env/CLI.
///
/// Returns the merged config plus the notes gathered while reading the file;
/// logging is not set up yet when this runs.
pub fn load_config() -> (Config, Vec<String>) {
    let cli_args = Config::parse();
    resolve(cli_args)
}

fn resolve(cli_args: Config) -> (Config, Vec<String>) {
    let mut notes = Vec::new();
    let config_file_path = cli_args
        .config_path
        .clone()
        .unwrap_or_else(|| PathBuf::from("server_letterboxed.conf"));

    let mut current_config = Config::defaults();

    if config_file_path.exists() {
        match fs::read_to_string(&config_file_path) {
            Ok(config_str) => match serde_json::from_str::<Config>(&config_str) {
                Ok(file_config) => current_config = current_config.merge(file_config),
                Err(e) => notes.push(format!(
                    "Failed to parse config file: {} ({}). Falling back to other sources.",
                    config_file_path.display(),
                    e
                )),
            },
            Err(e) => notes.push(format!(
                "Failed to read config file: {} ({}). Falling back to other sources.",
                config_file_path.display(),
                e
            )),
        }
    } else {
        notes.push(format!(
            "Config file not found at {}. Using defaults and environment/CLI variables.",
            config_file_path.display()
        ));
    }

    // CLI args (which include env vars) win over the file.
    (current_config.merge(cli_args), notes)
}
