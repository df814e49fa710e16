use chrono::{DateTime, Utc};
use std::fmt;

use crate::client::Endpoint;
use crate::error::{BlockwatchError, FailureKind};
use crate::models::{ClientStat, HourlyStats, Metrics, QueryRecord, ServiceStatus};

/// Identifies one refresh cycle. Sequence numbers increase monotonically per
/// session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CycleTicket {
    pub seq: u64,
}

/// Everything a fully successful cycle fetched, derived fields included.
#[derive(Debug, Clone, PartialEq)]
pub struct CyclePayload {
    pub metrics: Metrics,
    pub queries: Vec<QueryRecord>,
    pub status: ServiceStatus,
    pub backend_uptime: Option<String>,
    pub hourly: HourlyStats,
    pub clients: Vec<ClientStat>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointFailure {
    pub endpoint: Endpoint,
    pub kind: FailureKind,
    pub code: &'static str,
    pub message: String,
    pub attempts: u32,
    /// What the user can do about it, for backend-facing errors.
    pub hint: Option<&'static str>,
}

impl EndpointFailure {
    pub fn new(endpoint: Endpoint, error: &BlockwatchError, attempts: u32) -> Self {
        Self {
            endpoint,
            kind: error.failure_kind(),
            code: error.error_code(),
            message: error.to_string(),
            attempts,
            hint: if error.is_api_error() {
                error.user_suggestion()
            } else {
                None
            },
        }
    }
}

/// Why a cycle did not commit. Lists every endpoint that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReason {
    pub failures: Vec<EndpointFailure>,
}

impl FailureReason {
    pub fn endpoints(&self) -> impl Iterator<Item = Endpoint> + '_ {
        self.failures.iter().map(|f| f.endpoint)
    }

    pub fn has_kind(&self, kind: FailureKind) -> bool {
        self.failures.iter().any(|f| f.kind == kind)
    }

    /// First suggestion among the failed endpoints.
    pub fn hint(&self) -> Option<&'static str> {
        self.failures.iter().find_map(|f| f.hint)
    }

    /// Short single-line description for status bars.
    pub fn summary(&self) -> String {
        match self.failures.as_slice() {
            [] => "no failures recorded".to_string(),
            [only] => format!("{} ({})", only.endpoint, only.kind),
            [first, rest @ ..] => format!(
                "{} ({}) and {} more",
                first.endpoint,
                first.kind,
                rest.len()
            ),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .failures
            .iter()
            .map(|failure| failure.message.clone())
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Result of running one cycle, before it is applied to the view.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub seq: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub result: Result<CyclePayload, FailureReason>,
}

impl CycleReport {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

/// What applying a cycle did to the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Success { seq: u64 },
    PartialFailure { seq: u64, reason: FailureReason },
    FullFailure { seq: u64, reason: FailureReason },
    /// A newer cycle was already applied; nothing changed.
    Superseded { seq: u64, latest: u64 },
}

impl SyncOutcome {
    pub fn seq(&self) -> u64 {
        match self {
            SyncOutcome::Success { seq }
            | SyncOutcome::PartialFailure { seq, .. }
            | SyncOutcome::FullFailure { seq, .. }
            | SyncOutcome::Superseded { seq, .. } => *seq,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SyncOutcome::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            SyncOutcome::PartialFailure { .. } | SyncOutcome::FullFailure { .. }
        )
    }

    pub fn reason(&self) -> Option<&FailureReason> {
        match self {
            SyncOutcome::PartialFailure { reason, .. } | SyncOutcome::FullFailure { reason, .. } => {
                Some(reason)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(endpoint: Endpoint, status: u16) -> EndpointFailure {
        EndpointFailure::new(
            endpoint,
            &BlockwatchError::HttpStatus {
                endpoint: endpoint.path().to_string(),
                status,
            },
            1,
        )
    }

    #[test]
    fn test_failure_summary() {
        let reason = FailureReason {
            failures: vec![failure(Endpoint::Metrics, 500)],
        };
        assert_eq!(reason.summary(), "/api/v1/metrics (backend)");

        let reason = FailureReason {
            failures: vec![failure(Endpoint::Metrics, 500), failure(Endpoint::Clients, 502)],
        };
        assert_eq!(reason.summary(), "/api/v1/metrics (backend) and 1 more");
        assert!(reason.has_kind(FailureKind::Backend));
        assert!(!reason.has_kind(FailureKind::Malformed));
        assert!(reason.to_string().contains("HTTP 502"));
    }

    #[test]
    fn test_hint_comes_from_backend_errors() {
        let reason = FailureReason {
            failures: vec![failure(Endpoint::Metrics, 404), failure(Endpoint::Queries, 503)],
        };
        assert_eq!(reason.failures[0].hint, None);
        assert_eq!(
            reason.hint(),
            Some("The DNS server reported an internal error; check its log")
        );

        let unreachable = EndpointFailure::new(
            Endpoint::Status,
            &BlockwatchError::ApiUnavailable("connection refused".into()),
            3,
        );
        assert!(unreachable.hint.unwrap().contains("api.base_url"));

        let internal = EndpointFailure::new(
            Endpoint::Status,
            &BlockwatchError::InvalidConfigValue {
                key: "display".into(),
                message: "x".into(),
            },
            1,
        );
        assert_eq!(internal.hint, None);
    }

    #[test]
    fn test_outcome_accessors() {
        let reason = FailureReason {
            failures: vec![failure(Endpoint::Status, 503)],
        };
        let outcome = SyncOutcome::PartialFailure {
            seq: 4,
            reason: reason.clone(),
        };
        assert_eq!(outcome.seq(), 4);
        assert!(outcome.is_failure());
        assert_eq!(outcome.reason(), Some(&reason));

        let outcome = SyncOutcome::Superseded { seq: 2, latest: 3 };
        assert!(!outcome.is_failure());
        assert!(!outcome.is_success());
        assert!(outcome.reason().is_none());
    }
}
