use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::models::ReportType;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub monitor: MonitorConfig,
    pub source: SourceConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

/// Reporting schedule and scope
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Interval between report cycles in seconds (default: 300)
    #[serde(deserialize_with = "deserialize_duration_secs")]
    pub interval_secs: u64,
    /// Run the first cycle immediately at startup (default: true)
    pub run_on_startup: bool,
    /// Categories included in each report (default: all three)
    #[serde(deserialize_with = "deserialize_categories")]
    pub categories: Vec<ReportType>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Directory holding the exported DMV result sets
    pub snapshot_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Root directory of persisted report documents
    pub documents_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

/// Command line arguments for configuration overrides
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "sqlmon")]
#[command(version, about = "sqlmon - SQL Server diagnostic report generator")]
pub struct CommandLineArgs {
    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Report interval (overrides config file, e.g., "300", "5m", "1h")
    #[arg(long, value_name = "DURATION")]
    pub interval: Option<String>,

    /// Comma separated categories (overrides config file, e.g., "missing_index,bad_query")
    #[arg(long, value_name = "LIST")]
    pub categories: Option<String>,

    /// Snapshot directory (overrides config file)
    #[arg(long, value_name = "DIR")]
    pub snapshot_dir: Option<String>,

    /// Report documents directory (overrides config file)
    #[arg(long, value_name = "DIR")]
    pub documents_dir: Option<String>,

    /// Logging level (overrides config file, e.g., "info,sqlmon=debug")
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Run a single report cycle and exit
    #[arg(long)]
    pub once: bool,
}

impl Config {
    /// Load configuration with command line, environment variable, and file support
    ///
    /// Loading order (priority from highest to lowest):
    /// 1. Command line arguments
    /// 2. Environment variables (prefixed with APP_)
    /// 3. Configuration file (config.toml)
    /// 4. Default values
    pub fn load(cli_args: &CommandLineArgs) -> Result<Self, anyhow::Error> {
        let config_path = cli_args.config.clone().or_else(Self::find_config_file);
        let mut config = if let Some(config_path) = config_path {
            Self::from_toml(&config_path)?
        } else {
            tracing::warn!("Configuration file not found, using defaults");
            Config::default()
        };

        config.apply_env_overrides();
        config.apply_cli_overrides(cli_args);
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - APP_MONITOR_INTERVAL_SECS: Report interval (accepts "300", "5m", "1h")
    /// - APP_MONITOR_RUN_ON_STARTUP: Run the first cycle at startup (true/false)
    /// - APP_MONITOR_CATEGORIES: Comma separated categories
    /// - APP_SNAPSHOT_DIR: Snapshot directory (default: data/snapshot)
    /// - APP_DOCUMENTS_DIR: Report documents directory (default: data/reports)
    /// - APP_LOG_LEVEL: Logging level (e.g., "info,sqlmon=debug")
    fn apply_env_overrides(&mut self) {
        if let Ok(interval) = std::env::var("APP_MONITOR_INTERVAL_SECS") {
            match parse_duration_to_secs(&interval) {
                Ok(val) => {
                    self.monitor.interval_secs = val;
                    tracing::info!(
                        "Override monitor.interval_secs from env: {}",
                        self.monitor.interval_secs
                    );
                },
                Err(e) => tracing::warn!(
                    "Invalid APP_MONITOR_INTERVAL_SECS '{}': {} (keep {})",
                    interval,
                    e,
                    self.monitor.interval_secs
                ),
            }
        }

        if let Ok(run) = std::env::var("APP_MONITOR_RUN_ON_STARTUP")
            && let Ok(run) = run.parse()
        {
            self.monitor.run_on_startup = run;
            tracing::info!(
                "Override monitor.run_on_startup from env: {}",
                self.monitor.run_on_startup
            );
        }

        if let Ok(categories) = std::env::var("APP_MONITOR_CATEGORIES") {
            match parse_categories(&categories) {
                Ok(val) => {
                    self.monitor.categories = val;
                    tracing::info!(
                        "Override monitor.categories from env: {:?}",
                        self.monitor.categories
                    );
                },
                Err(e) => tracing::warn!("Invalid APP_MONITOR_CATEGORIES '{}': {}", categories, e),
            }
        }

        if let Ok(dir) = std::env::var("APP_SNAPSHOT_DIR") {
            self.source.snapshot_dir = dir;
            tracing::info!("Override source.snapshot_dir from env: {}", self.source.snapshot_dir);
        }

        if let Ok(dir) = std::env::var("APP_DOCUMENTS_DIR") {
            self.store.documents_dir = dir;
            tracing::info!("Override store.documents_dir from env: {}", self.store.documents_dir);
        }

        if let Ok(level) = std::env::var("APP_LOG_LEVEL") {
            self.logging.level = level;
            tracing::info!("Override logging.level from env: {}", self.logging.level);
        }
    }

    /// Apply command line argument overrides (highest priority)
    fn apply_cli_overrides(&mut self, args: &CommandLineArgs) {
        if let Some(interval) = &args.interval {
            match parse_duration_to_secs(interval) {
                Ok(val) => {
                    self.monitor.interval_secs = val;
                    tracing::info!(
                        "Override monitor.interval_secs from CLI: {}",
                        self.monitor.interval_secs
                    );
                },
                Err(e) => tracing::warn!(
                    "Invalid --interval '{}': {} (keep {})",
                    interval,
                    e,
                    self.monitor.interval_secs
                ),
            }
        }

        if let Some(categories) = &args.categories {
            match parse_categories(categories) {
                Ok(val) => {
                    self.monitor.categories = val;
                    tracing::info!(
                        "Override monitor.categories from CLI: {:?}",
                        self.monitor.categories
                    );
                },
                Err(e) => tracing::warn!("Invalid --categories '{}': {}", categories, e),
            }
        }

        if let Some(dir) = &args.snapshot_dir {
            self.source.snapshot_dir = dir.clone();
            tracing::info!("Override source.snapshot_dir from CLI: {}", self.source.snapshot_dir);
        }

        if let Some(dir) = &args.documents_dir {
            self.store.documents_dir = dir.clone();
            tracing::info!("Override store.documents_dir from CLI: {}", self.store.documents_dir);
        }

        if let Some(level) = &args.log_level {
            self.logging.level = level.clone();
            tracing::info!("Override logging.level from CLI: {}", self.logging.level);
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<(), anyhow::Error> {
        if self.monitor.interval_secs == 0 {
            anyhow::bail!("monitor.interval_secs must be > 0");
        }
        if self.monitor.categories.is_empty() {
            anyhow::bail!("monitor.categories must name at least one category");
        }
        if self.source.snapshot_dir.trim().is_empty() {
            anyhow::bail!("source.snapshot_dir cannot be empty");
        }
        if self.store.documents_dir.trim().is_empty() {
            anyhow::bail!("store.documents_dir cannot be empty");
        }

        Ok(())
    }

    fn find_config_file() -> Option<String> {
        let possible_paths = ["conf/config.toml", "config.toml"];

        for path in &possible_paths {
            if Path::new(path).exists() {
                return Some(path.to_string());
            }
        }
        None
    }

    fn from_toml(path: &str) -> Result<Self, anyhow::Error> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    fn from_toml_str(content: &str) -> Result<Self, anyhow::Error> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self { interval_secs: 300, run_on_startup: true, categories: ReportType::ALL.to_vec() }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self { snapshot_dir: "data/snapshot".to_string() }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { documents_dir: "data/reports".to_string() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info,sqlmon=debug".to_string(), file: Some("logs/sqlmon.log".to_string()) }
    }
}

// =========================
// Helpers for parsing values
// =========================

fn parse_duration_to_secs(input: &str) -> Result<u64, String> {
    // Accept plain numbers (treated as seconds)
    if let Ok(val) = input.parse::<u64>() {
        return Ok(val);
    }

    let s = input.trim().to_lowercase();
    let (num_str, unit) = s.split_at(s.chars().take_while(|c| c.is_ascii_digit()).count());
    if num_str.is_empty() || unit.is_empty() {
        return Err("missing number or unit".into());
    }
    let n: u64 = num_str.parse().map_err(|_| "invalid number".to_string())?;
    match unit {
        "s" | "sec" | "secs" | "second" | "seconds" => Ok(n),
        "m" | "min" | "mins" | "minute" | "minutes" => Ok(n * 60),
        "h" | "hr" | "hour" | "hours" => Ok(n * 60 * 60),
        "d" | "day" | "days" => Ok(n * 60 * 60 * 24),
        _ => Err(format!("unsupported unit: {}", unit)),
    }
}

/// Comma separated category names, deduplicated in fixed report order
fn parse_categories(input: &str) -> Result<Vec<ReportType>, String> {
    let mut categories = input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<ReportType>().map_err(|e| e.to_string()))
        .collect::<Result<Vec<_>, _>>()?;
    categories.sort();
    categories.dedup();
    Ok(categories)
}

// Custom serde deserializers to support numeric or human-friendly string values
fn deserialize_duration_secs<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct Visitor;
    impl<'de> serde::de::Visitor<'de> for Visitor {
        type Value = u64;
        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a number of seconds or a string like '30s', '5m', '1h'")
        }
        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
            Ok(v)
        }
        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            if v >= 0 { Ok(v as u64) } else { Err(E::custom("negative not allowed")) }
        }
        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            parse_duration_to_secs(v).map_err(E::custom)
        }
    }
    deserializer.deserialize_any(Visitor)
}

/// Accepts a list of names or one comma separated string
fn deserialize_categories<'de, D>(deserializer: D) -> Result<Vec<ReportType>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Categories {
        List(Vec<String>),
        Joined(String),
    }

    let joined = match Categories::deserialize(deserializer)? {
        Categories::List(names) => names.join(","),
        Categories::Joined(joined) => joined,
    };
    parse_categories(&joined).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_to_secs() {
        assert_eq!(parse_duration_to_secs("300"), Ok(300));
        assert_eq!(parse_duration_to_secs("30s"), Ok(30));
        assert_eq!(parse_duration_to_secs("5m"), Ok(300));
        assert_eq!(parse_duration_to_secs("1H"), Ok(3600));
        assert!(parse_duration_to_secs("5 fortnights").is_err());
        assert!(parse_duration_to_secs("m").is_err());
    }

    #[test]
    fn test_parse_categories() {
        assert_eq!(
            parse_categories("bad_query, long-running-query,bad_query"),
            Ok(vec![ReportType::LongRunningQuery, ReportType::BadQuery])
        );
        assert!(parse_categories("blocking_sessions").is_err());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.monitor.interval_secs, 300);
        assert!(config.monitor.run_on_startup);
        assert_eq!(config.monitor.categories, ReportType::ALL.to_vec());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml() {
        let config = Config::from_toml_str(
            r#"
            [monitor]
            interval_secs = "10m"
            run_on_startup = false
            categories = ["missing_index"]

            [store]
            documents_dir = "/var/lib/sqlmon"
            "#,
        )
        .unwrap();

        assert_eq!(config.monitor.interval_secs, 600);
        assert!(!config.monitor.run_on_startup);
        assert_eq!(config.monitor.categories, vec![ReportType::MissingIndex]);
        assert_eq!(config.store.documents_dir, "/var/lib/sqlmon");
        assert_eq!(config.source.snapshot_dir, "data/snapshot");
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::default();
        let args = CommandLineArgs {
            interval: Some("1h".into()),
            categories: Some("bad_query".into()),
            snapshot_dir: Some("/tmp/snap".into()),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);

        assert_eq!(config.monitor.interval_secs, 3600);
        assert_eq!(config.monitor.categories, vec![ReportType::BadQuery]);
        assert_eq!(config.source.snapshot_dir, "/tmp/snap");
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = Config::default();
        config.monitor.interval_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.monitor.categories.clear();
        assert!(config.validate().is_err());
    }
}
