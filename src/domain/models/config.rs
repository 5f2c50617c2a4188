//! Configuration model with serde defaults, merged by the figment loader.

use serde::{Deserialize, Serialize};

/// Main configuration structure for the Collatz explorer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Computation engine configuration
    #[serde(default)]
    pub engine: EngineConfig,

    /// Query API configuration
    #[serde(default)]
    pub server: ServerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
            engine: EngineConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to the `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    "collatz.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Optional directory for a daily-rotated JSON log file
    #[serde(default)]
    pub log_dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}

/// Computation engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EngineConfig {
    /// Commit retry policy for transient store contention
    #[serde(default)]
    pub commit_retry: CommitRetryConfig,

    /// Emit a progress log line every N starting numbers
    #[serde(default = "default_report_interval")]
    pub report_interval: u64,
}

const fn default_report_interval() -> u64 {
    10_000
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            commit_retry: CommitRetryConfig::default(),
            report_interval: default_report_interval(),
        }
    }
}

/// Bounded exponential backoff for SQLITE_BUSY commit retries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CommitRetryConfig {
    /// Initial backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Give up after this much total elapsed retry time, in milliseconds
    #[serde(default = "default_max_elapsed_ms")]
    pub max_elapsed_ms: u64,
}

const fn default_initial_backoff_ms() -> u64 {
    50
}

const fn default_max_backoff_ms() -> u64 {
    2_000
}

const fn default_max_elapsed_ms() -> u64 {
    30_000
}

impl Default for CommitRetryConfig {
    fn default() -> Self {
        Self {
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            max_elapsed_ms: default_max_elapsed_ms(),
        }
    }
}

/// Query API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServerConfig {
    /// Bind address for the query API
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port for the query API
    #[serde(default = "default_port")]
    pub port: u16,

    /// Password gating the blocklist refresh endpoint; refresh is rejected when unset
    #[serde(default)]
    pub admin_password: Option<String>,

    /// Newline-separated file of blocked client IPs
    #[serde(default = "default_blocklist_path")]
    pub blocklist_path: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_port() -> u16 {
    8080
}

fn default_blocklist_path() -> String {
    "blocked_ips.txt".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            admin_password: None,
            blocklist_path: default_blocklist_path(),
        }
    }
}
