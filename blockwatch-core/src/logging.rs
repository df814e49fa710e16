//! Tracing subscriber setup.
//!
//! The terminal belongs to the UI, so log output goes to a file.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;
use crate::error::{BlockwatchError, BlockwatchResult};

/// Builds an `EnvFilter` directive string: the base level followed by one
/// `target=level` entry per configured component.
pub fn build_filter_directives(config: &LoggingConfig) -> String {
    let mut filter_str = config.level.clone();

    for component in &config.component_levels {
        filter_str.push_str(&format!(",{}={}", component.target, component.level));
    }

    filter_str
}

/// Installs the global subscriber writing to `log_file`. `RUST_LOG`, when
/// set, overrides the configured directives.
pub fn init_logging(config: &LoggingConfig, log_file: &Path) -> BlockwatchResult<()> {
    if let Some(parent) = log_file.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(build_filter_directives(config)))
        .map_err(|e| BlockwatchError::InvalidConfigValue {
            key: "logging.level".to_string(),
            message: e.to_string(),
        })?;

    let layer = if config.json_format {
        fmt::layer()
            .json()
            .with_writer(Mutex::new(file))
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .boxed()
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()
        .map_err(|e| BlockwatchError::Internal(format!("logging already initialized: {}", e)))
}
