//! Error types for the Blockwatch core library.
//!
//! # Error Codes Reference
//!
//! | Code Range | Category | Description |
//! |------------|----------|-------------|
//! | E1001-E1099 | API | Transport, HTTP status, timeout and decode errors |
//! | E2001-E2099 | Config | Config file, environment and validation errors |
//! | E3001-E3099 | Chart | Drawing surface and chart lifecycle errors |
//! | E4001-E4099 | Theme | Theme parsing and preference persistence errors |
//! | E5001-E5099 | Scheduler | Timer lifecycle errors |
//! | E9001-E9099 | General | Internal, IO and serialization errors |

use std::time::Duration;
use thiserror::Error;

/// Configuration for retry behavior with exponential backoff.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Initial delay between retries
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff (e.g., 2.0 for doubling)
    pub backoff_multiplier: f64,
    /// Whether to add jitter to prevent thundering herd
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            initial_delay: Duration::from_millis(150),
            max_delay: Duration::from_millis(600),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// A single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
            jitter: false,
        }
    }

    /// Calculate the delay for a given attempt number (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base_delay =
            self.initial_delay.as_millis() as f64 * self.backoff_multiplier.powi(attempt as i32);
        let capped_delay = base_delay.min(self.max_delay.as_millis() as f64);

        let final_delay = if self.jitter {
            // up to 25% extra
            let jitter_factor = 1.0 + (rand_jitter() * 0.25);
            capped_delay * jitter_factor
        } else {
            capped_delay
        };

        Duration::from_millis(final_delay as u64)
    }
}

/// Returns a value between 0.0 and 1.0 derived from the clock.
fn rand_jitter() -> f64 {
    use std::time::SystemTime;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    (nanos % 1000) as f64 / 1000.0
}

/// Coarse classification of a failed fetch, surfaced in refresh outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The request never produced a response (connect error, timeout).
    Network,
    /// The backend answered with a non-success status.
    Backend,
    /// The body could not be decoded or violated a shape invariant.
    Malformed,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FailureKind::Network => "network",
            FailureKind::Backend => "backend",
            FailureKind::Malformed => "malformed",
        };
        f.write_str(label)
    }
}

/// The main error type for the Blockwatch core library.
#[derive(Debug, Error)]
pub enum BlockwatchError {
    // ========================================================================
    // API Errors (E1001-E1099)
    // ========================================================================
    /// Request could not be sent or the connection dropped
    #[error("[E1001] API request failed: {0}")]
    ApiRequestFailed(String),

    /// Backend unreachable
    #[error("[E1002] API service unavailable: {0}")]
    ApiUnavailable(String),

    /// Request exceeded the configured timeout
    #[error("[E1003] API request timed out: {0}")]
    ApiTimeout(String),

    /// Non-success HTTP status
    #[error("[E1004] {endpoint} responded with HTTP {status}")]
    HttpStatus { endpoint: String, status: u16 },

    /// Body did not decode into the expected shape
    #[error("[E1005] Failed to decode {endpoint} response: {message}")]
    Decode { endpoint: String, message: String },

    /// Body decoded but violates a payload invariant
    #[error("[E1006] Invalid {endpoint} payload: {message}")]
    InvalidPayload { endpoint: String, message: String },

    // ========================================================================
    // Configuration Errors (E2001-E2099)
    // ========================================================================
    /// Configuration file parse error
    #[error("[E2001] Failed to parse configuration: {0}")]
    ConfigParseError(String),

    /// Invalid configuration value
    #[error("[E2002] Invalid configuration value for '{key}': {message}")]
    InvalidConfigValue { key: String, message: String },

    // ========================================================================
    // Chart Errors (E3001-E3099)
    // ========================================================================
    /// No drawing surface with the requested id
    #[error("[E3001] Chart surface '{0}' not found")]
    ChartSurfaceMissing(String),

    /// A chart instance is live and must be destroyed first
    #[error("[E3002] Chart already initialized (handle {0})")]
    ChartAlreadyInitialized(u64),

    /// Handle does not match the live chart instance
    #[error("[E3003] Unknown chart handle {0}")]
    UnknownChartHandle(u64),

    // ========================================================================
    // Theme Errors (E4001-E4099)
    // ========================================================================
    /// Unrecognized theme identifier
    #[error("[E4001] Unknown theme: {0}")]
    UnknownTheme(String),

    /// Reading or writing the theme preference failed
    #[error("[E4002] Theme preference error: {0}")]
    ThemePersistence(String),

    // ========================================================================
    // Scheduler Errors (E5001-E5099)
    // ========================================================================
    /// start() called on a running scheduler
    #[error("[E5001] Scheduler already running")]
    SchedulerAlreadyRunning,

    // ========================================================================
    // General Errors (E9001-E9099)
    // ========================================================================
    /// Internal error
    #[error("[E9001] Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("[E9002] IO error: {0}")]
    IoError(String),

    /// Serialization error
    #[error("[E9003] Serialization error: {0}")]
    SerializationError(String),
}

/// Result type alias for Blockwatch operations.
pub type BlockwatchResult<T> = Result<T, BlockwatchError>;

// ============================================================================
// From trait implementations
// ============================================================================

impl From<reqwest::Error> for BlockwatchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BlockwatchError::ApiTimeout(err.to_string())
        } else if err.is_connect() {
            BlockwatchError::ApiUnavailable(err.to_string())
        } else if let Some(status) = err.status() {
            BlockwatchError::HttpStatus {
                endpoint: err
                    .url()
                    .map(|u| u.path().to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
                status: status.as_u16(),
            }
        } else {
            BlockwatchError::ApiRequestFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BlockwatchError {
    fn from(err: serde_json::Error) -> Self {
        BlockwatchError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for BlockwatchError {
    fn from(err: std::io::Error) -> Self {
        BlockwatchError::IoError(err.to_string())
    }
}

impl From<toml::de::Error> for BlockwatchError {
    fn from(err: toml::de::Error) -> Self {
        BlockwatchError::ThemePersistence(err.to_string())
    }
}

impl From<toml::ser::Error> for BlockwatchError {
    fn from(err: toml::ser::Error) -> Self {
        BlockwatchError::SerializationError(err.to_string())
    }
}

impl From<config::ConfigError> for BlockwatchError {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound(key) => BlockwatchError::InvalidConfigValue {
                key,
                message: "Key not found".to_string(),
            },
            config::ConfigError::FileParse { uri, cause } => BlockwatchError::ConfigParseError(
                format!("Failed to parse {}: {}", uri.unwrap_or_default(), cause),
            ),
            config::ConfigError::Type {
                origin,
                unexpected,
                expected,
                key,
            } => BlockwatchError::InvalidConfigValue {
                key: key.unwrap_or_else(|| origin.map(|o| o.to_string()).unwrap_or_default()),
                message: format!("Expected {}, got {}", expected, unexpected),
            },
            _ => BlockwatchError::ConfigParseError(err.to_string()),
        }
    }
}

// ============================================================================
// Error categorization helpers
// ============================================================================

impl BlockwatchError {
    /// Returns true if this error came from talking to the backend API.
    pub fn is_api_error(&self) -> bool {
        matches!(
            self,
            BlockwatchError::ApiRequestFailed(_)
                | BlockwatchError::ApiUnavailable(_)
                | BlockwatchError::ApiTimeout(_)
                | BlockwatchError::HttpStatus { .. }
                | BlockwatchError::Decode { .. }
                | BlockwatchError::InvalidPayload { .. }
        )
    }

    /// Returns true if the operation might succeed on retry.
    ///
    /// Decode failures and 4xx statuses are never retried.
    pub fn is_transient(&self) -> bool {
        match self {
            BlockwatchError::ApiUnavailable(_)
            | BlockwatchError::ApiTimeout(_)
            | BlockwatchError::ApiRequestFailed(_) => true,
            BlockwatchError::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Maps API errors onto the coarse failure classification.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            BlockwatchError::HttpStatus { .. } => FailureKind::Backend,
            BlockwatchError::Decode { .. }
            | BlockwatchError::InvalidPayload { .. }
            | BlockwatchError::SerializationError(_) => FailureKind::Malformed,
            _ => FailureKind::Network,
        }
    }

    /// Returns an error code suitable for logging or external reporting.
    pub fn error_code(&self) -> &'static str {
        match self {
            BlockwatchError::ApiRequestFailed(_) => "E1001",
            BlockwatchError::ApiUnavailable(_) => "E1002",
            BlockwatchError::ApiTimeout(_) => "E1003",
            BlockwatchError::HttpStatus { .. } => "E1004",
            BlockwatchError::Decode { .. } => "E1005",
            BlockwatchError::InvalidPayload { .. } => "E1006",
            BlockwatchError::ConfigParseError(_) => "E2001",
            BlockwatchError::InvalidConfigValue { .. } => "E2002",
            BlockwatchError::ChartSurfaceMissing(_) => "E3001",
            BlockwatchError::ChartAlreadyInitialized(_) => "E3002",
            BlockwatchError::UnknownChartHandle(_) => "E3003",
            BlockwatchError::UnknownTheme(_) => "E4001",
            BlockwatchError::ThemePersistence(_) => "E4002",
            BlockwatchError::SchedulerAlreadyRunning => "E5001",
            BlockwatchError::Internal(_) => "E9001",
            BlockwatchError::IoError(_) => "E9002",
            BlockwatchError::SerializationError(_) => "E9003",
        }
    }

    /// Returns a user-friendly suggestion for how to resolve this error.
    pub fn user_suggestion(&self) -> Option<&'static str> {
        match self {
            BlockwatchError::ApiUnavailable(_) => {
                Some("Check that the DNS server is running and api.base_url is correct")
            }
            BlockwatchError::ApiTimeout(_) => {
                Some("The DNS server is slow to respond; raise api.request_timeout_ms")
            }
            BlockwatchError::HttpStatus { status, .. } if *status >= 500 => {
                Some("The DNS server reported an internal error; check its log")
            }
            BlockwatchError::Decode { .. } | BlockwatchError::InvalidPayload { .. } => {
                Some("The DNS server sent an unexpected payload; check that versions match")
            }
            BlockwatchError::ChartSurfaceMissing(_) => {
                Some("Enlarge the terminal so the chart panel fits")
            }
            BlockwatchError::InvalidConfigValue { .. } => {
                Some("Fix the value in blockwatch.toml or the BLOCKWATCH_* environment")
            }
            _ => None,
        }
    }
}
