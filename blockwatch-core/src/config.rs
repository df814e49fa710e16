use config::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{BlockwatchError, BlockwatchResult, RetryConfig};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BlockwatchConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub tui: TuiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_ms: u64,

    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_retry_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_retry_initial_delay")]
    pub initial_delay_ms: u64,

    #[serde(default = "default_retry_max_delay")]
    pub max_delay_ms: u64,

    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    #[serde(default = "default_true")]
    pub jitter: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_time_format")]
    pub time_format: String,

    #[serde(default = "default_datetime_format")]
    pub datetime_format: String,

    /// Render record timestamps in UTC instead of the local zone.
    #[serde(default)]
    pub utc: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json_format: bool,

    /// Log file; empty means `<data_dir>/blockwatch/blockwatch.log`.
    #[serde(default)]
    pub file_path: String,

    #[serde(default)]
    pub component_levels: Vec<ComponentLevel>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComponentLevel {
    pub target: String,
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuiConfig {
    #[serde(default = "default_chart_surface")]
    pub chart_surface: String,

    /// Theme preference file; empty means `<config_dir>/blockwatch/theme.toml`.
    #[serde(default)]
    pub theme_file: String,

    #[serde(default = "default_start_route")]
    pub start_route: String,

    #[serde(default = "default_frame_rate")]
    pub frame_rate_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_request_timeout() -> u64 {
    1500
}

fn default_connect_timeout() -> u64 {
    500
}

fn default_refresh_interval() -> u64 {
    2000
}

fn default_tick_interval() -> u64 {
    1000
}

fn default_retry_attempts() -> u32 {
    2
}

fn default_retry_initial_delay() -> u64 {
    150
}

fn default_retry_max_delay() -> u64 {
    600
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

fn default_time_format() -> String {
    "%H:%M:%S".to_string()
}

fn default_datetime_format() -> String {
    "%Y-%m-%d %H:%M:%S".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_chart_surface() -> String {
    "statsChart".to_string()
}

fn default_start_route() -> String {
    "/".to_string()
}

fn default_frame_rate() -> u64 {
    250
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_ms: default_request_timeout(),
            connect_timeout_ms: default_connect_timeout(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: default_refresh_interval(),
            tick_interval_ms: default_tick_interval(),
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_retry_attempts(),
            initial_delay_ms: default_retry_initial_delay(),
            max_delay_ms: default_retry_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            time_format: default_time_format(),
            datetime_format: default_datetime_format(),
            utc: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
            file_path: String::new(),
            component_levels: Vec::new(),
        }
    }
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            chart_surface: default_chart_surface(),
            theme_file: String::new(),
            start_route: default_start_route(),
            frame_rate_ms: default_frame_rate(),
        }
    }
}

impl PollingConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl RetrySettings {
    pub fn to_retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.max_attempts,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            backoff_multiplier: self.backoff_multiplier,
            jitter: self.jitter,
        }
    }
}

impl BlockwatchConfig {
    pub fn load() -> BlockwatchResult<Self> {
        Self::load_from_paths(get_config_paths())
    }

    pub fn load_from_paths(paths: Vec<PathBuf>) -> BlockwatchResult<Self> {
        load_dotenv_files();

        let mut builder = ConfigBuilder::builder();

        for path in paths {
            if path.exists() {
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("BLOCKWATCH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let mut blockwatch_config: BlockwatchConfig = config.try_deserialize()?;

        if let Ok(level) = std::env::var("BLOCKWATCH_LOG_LEVEL") {
            blockwatch_config.logging.level = level;
        }

        blockwatch_config.validate()?;

        Ok(blockwatch_config)
    }

    pub fn validate(&self) -> BlockwatchResult<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(invalid("api.base_url", "Must not be empty"));
        }

        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://")
        {
            return Err(invalid(
                "api.base_url",
                "Must be an http:// or https:// URL",
            ));
        }

        if self.api.request_timeout_ms == 0 {
            return Err(invalid("api.request_timeout_ms", "Must be greater than 0"));
        }

        if self.polling.refresh_interval_ms == 0 {
            return Err(invalid("polling.refresh_interval_ms", "Must be greater than 0"));
        }

        if self.polling.tick_interval_ms == 0 {
            return Err(invalid("polling.tick_interval_ms", "Must be greater than 0"));
        }

        if self.retry.max_attempts == 0 {
            return Err(invalid("retry.max_attempts", "Must be at least 1"));
        }

        if self.retry.initial_delay_ms > self.retry.max_delay_ms {
            return Err(invalid(
                "retry.initial_delay_ms",
                "Cannot be greater than retry.max_delay_ms",
            ));
        }

        for (key, pattern) in [
            ("display.time_format", &self.display.time_format),
            ("display.datetime_format", &self.display.datetime_format),
        ] {
            if !crate::timefmt::is_valid_pattern(pattern) {
                return Err(invalid(
                    key,
                    &format!("Invalid time format '{}'", pattern),
                ));
            }
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        let level_lower = self.logging.level.to_lowercase();
        if !valid_levels.contains(&level_lower.as_str()) && !level_lower.contains('=') {
            return Err(invalid(
                "logging.level",
                &format!(
                    "Invalid log level '{}'. Must be one of: {:?}",
                    self.logging.level, valid_levels
                ),
            ));
        }

        for component in &self.logging.component_levels {
            if !valid_levels.contains(&component.level.to_lowercase().as_str()) {
                return Err(invalid(
                    "logging.component_levels",
                    &format!("Invalid level '{}' for '{}'", component.level, component.target),
                ));
            }
        }

        Ok(())
    }

    pub fn base_url(&self) -> &str {
        self.api.base_url.trim_end_matches('/')
    }

    pub fn log_level(&self) -> &str {
        &self.logging.level
    }

    pub fn theme_file(&self) -> PathBuf {
        if self.tui.theme_file.is_empty() {
            get_config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("theme.toml")
        } else {
            PathBuf::from(&self.tui.theme_file)
        }
    }

    pub fn log_file(&self) -> PathBuf {
        if self.logging.file_path.is_empty() {
            get_data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("blockwatch.log")
        } else {
            PathBuf::from(&self.logging.file_path)
        }
    }
}

fn invalid(key: &str, message: &str) -> BlockwatchError {
    BlockwatchError::InvalidConfigValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join("config").join("default.toml"));
        paths.push(cwd.join("config").join("local.toml"));
        paths.push(cwd.join("blockwatch.toml"));
    }

    if let Some(config_dir) = get_config_dir() {
        paths.push(config_dir.join("config.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".blockwatch").join("config.toml"));
    }

    paths
}

fn load_dotenv_files() {
    for path in get_dotenv_paths() {
        if path.exists() {
            let _ = dotenvy::from_path(&path);
        }
    }
}

fn get_dotenv_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".env"));
        paths.push(cwd.join(".env.local"));
    }

    if let Some(config_dir) = get_config_dir() {
        paths.push(config_dir.join(".env"));
    }

    paths
}

pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("blockwatch"))
}

pub fn get_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("blockwatch"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = BlockwatchConfig::default();

        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.polling.refresh_interval_ms, 2000);
        assert_eq!(config.polling.tick_interval_ms, 1000);
        assert_eq!(config.retry.max_attempts, 2);
        assert_eq!(config.display.time_format, "%H:%M:%S");
        assert!(!config.display.utc);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json_format);
        assert_eq!(config.tui.chart_surface, "statsChart");
        assert_eq!(config.tui.start_route, "/");
    }

    #[test]
    fn test_validation_valid_config() {
        let config = BlockwatchConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_non_http_url() {
        let mut config = BlockwatchConfig::default();
        config.api.base_url = "ftp://localhost".to_string();
        assert!(config.validate().is_err());

        config.api.base_url = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_intervals() {
        let mut config = BlockwatchConfig::default();
        config.polling.refresh_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = BlockwatchConfig::default();
        config.polling.tick_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_retry_bounds() {
        let mut config = BlockwatchConfig::default();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = BlockwatchConfig::default();
        config.retry.initial_delay_ms = 5000;
        config.retry.max_delay_ms = 100;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_log_levels() {
        let mut config = BlockwatchConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        config.logging.level = "blockwatch_core=debug,reqwest=warn".to_string();
        assert!(config.validate().is_ok());

        config.logging.component_levels.push(ComponentLevel {
            target: "blockwatch_core::sync".to_string(),
            level: "verbose".to_string(),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_time_format() {
        let mut config = BlockwatchConfig::default();
        config.display.time_format = "%Q".to_string();
        assert!(matches!(
            config.validate(),
            Err(BlockwatchError::InvalidConfigValue { ref key, .. }) if key == "display.time_format"
        ));

        let mut config = BlockwatchConfig::default();
        config.display.datetime_format = String::new();
        assert!(config.validate().is_err());

        let mut config = BlockwatchConfig::default();
        config.display.datetime_format = "%d/%m %H:%M".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[api]
base_url = "http://10.0.0.2:9090/"

[polling]
refresh_interval_ms = 5000

[display]
utc = true
"#
        )
        .unwrap();

        let config = BlockwatchConfig::load_from_paths(vec![file.path().to_path_buf()]).unwrap();
        assert_eq!(config.base_url(), "http://10.0.0.2:9090");
        assert_eq!(config.polling.refresh_interval_ms, 5000);
        assert_eq!(config.polling.tick_interval_ms, 1000);
        assert!(config.display.utc);
    }

    #[test]
    fn test_load_rejects_invalid_file_values() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[polling]\nrefresh_interval_ms = 0").unwrap();

        let result = BlockwatchConfig::load_from_paths(vec![file.path().to_path_buf()]);
        assert!(matches!(
            result,
            Err(BlockwatchError::InvalidConfigValue { .. })
        ));
    }

    #[test]
    fn test_retry_settings_conversion() {
        let retry = RetrySettings::default().to_retry_config();
        assert_eq!(retry.max_attempts, 2);
        assert_eq!(retry.initial_delay, Duration::from_millis(150));
        assert_eq!(retry.max_delay, Duration::from_millis(600));
    }

    #[test]
    fn test_path_helpers() {
        let mut config = BlockwatchConfig::default();
        assert!(config.theme_file().ends_with("theme.toml"));
        assert!(config.log_file().ends_with("blockwatch.log"));

        config.tui.theme_file = "/tmp/bw-theme.toml".to_string();
        assert_eq!(config.theme_file(), PathBuf::from("/tmp/bw-theme.toml"));
    }
}
