use chrono::{DateTime, Utc};

use crate::client::Endpoint;
use crate::models::{
    BlocklistOverview, ClientStat, HourlyStats, Metrics, QueryRecord, ServiceStatus,
};
use crate::sync::{CycleReport, FailureReason, SyncOutcome};
use crate::theme::ThemeId;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncHealth {
    pub last_outcome: Option<SyncOutcome>,
    pub last_success_at: Option<DateTime<Utc>>,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
    /// Highest cycle sequence number applied so far; 0 before the first.
    pub last_applied_seq: u64,
}

/// The dashboard's observable state.
///
/// Data categories change only through [`ViewState::apply`], which either
/// replaces all of them from one successful cycle or leaves all of them
/// untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    status: ServiceStatus,
    backend_uptime: Option<String>,
    metrics: Metrics,
    queries: Vec<QueryRecord>,
    hourly: HourlyStats,
    clients: Vec<ClientStat>,
    theme: ThemeId,
    blocklists: Option<BlocklistOverview>,
    blocklists_error: Option<String>,
    health: SyncHealth,
    uptime_tick: u64,
    revision: u64,
}

impl ViewState {
    pub fn new(theme: ThemeId) -> Self {
        Self {
            status: ServiceStatus::Unknown,
            backend_uptime: None,
            metrics: Metrics::default(),
            queries: Vec::new(),
            hourly: HourlyStats::default(),
            clients: Vec::new(),
            theme,
            blocklists: None,
            blocklists_error: None,
            health: SyncHealth::default(),
            uptime_tick: 0,
            revision: 0,
        }
    }

    /// Commits a cycle report.
    ///
    /// Reports older than the last applied one are discarded. A failed
    /// report only forces the status to stopped.
    pub fn apply(&mut self, report: CycleReport) -> SyncOutcome {
        let latest = self.health.last_applied_seq;
        if report.seq <= latest {
            return SyncOutcome::Superseded {
                seq: report.seq,
                latest,
            };
        }

        let seq = report.seq;
        self.health.last_applied_seq = seq;
        self.health.last_attempt_at = Some(report.finished_at);

        let outcome = match report.result {
            Ok(payload) => {
                self.metrics = payload.metrics;
                self.queries = payload.queries;
                self.hourly = payload.hourly;
                self.clients = payload.clients;
                self.status = payload.status;
                self.backend_uptime = payload.backend_uptime;
                self.health.consecutive_failures = 0;
                self.health.last_success_at = Some(report.finished_at);
                SyncOutcome::Success { seq }
            }
            Err(reason) => {
                self.status = ServiceStatus::Stopped;
                self.health.consecutive_failures += 1;
                classify(seq, reason)
            }
        };

        self.health.last_outcome = Some(outcome.clone());
        self.revision += 1;
        outcome
    }

    pub fn apply_blocklists(&mut self, result: Result<BlocklistOverview, FailureReason>) {
        match result {
            Ok(overview) => {
                self.blocklists = Some(overview);
                self.blocklists_error = None;
            }
            Err(reason) => {
                // keep the last good overview on screen
                self.blocklists_error = Some(reason.summary());
            }
        }
        self.revision += 1;
    }

    /// Returns `true` if the theme changed.
    pub fn set_theme(&mut self, theme: ThemeId) -> bool {
        if self.theme == theme {
            return false;
        }
        self.theme = theme;
        self.revision += 1;
        true
    }

    /// Records the latest display tick. Ticks never go backwards.
    pub fn record_tick(&mut self, tick: u64) {
        self.uptime_tick = self.uptime_tick.max(tick);
    }

    pub fn status(&self) -> ServiceStatus {
        self.status
    }

    pub fn backend_uptime(&self) -> Option<&str> {
        self.backend_uptime.as_deref()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn queries(&self) -> &[QueryRecord] {
        &self.queries
    }

    pub fn hourly(&self) -> &HourlyStats {
        &self.hourly
    }

    pub fn clients(&self) -> &[ClientStat] {
        &self.clients
    }

    pub fn theme(&self) -> ThemeId {
        self.theme
    }

    pub fn blocklists(&self) -> Option<&BlocklistOverview> {
        self.blocklists.as_ref()
    }

    pub fn blocklists_error(&self) -> Option<&str> {
        self.blocklists_error.as_deref()
    }

    pub fn health(&self) -> &SyncHealth {
        &self.health
    }

    pub fn uptime_tick(&self) -> u64 {
        self.uptime_tick
    }

    /// Bumped on every commit, failed or not, and on theme changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

fn classify(seq: u64, reason: FailureReason) -> SyncOutcome {
    if reason.failures.len() >= Endpoint::CYCLE.len() {
        SyncOutcome::FullFailure { seq, reason }
    } else {
        SyncOutcome::PartialFailure { seq, reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BlockwatchError;
    use crate::sync::{CyclePayload, EndpointFailure};

    fn payload(total: u64) -> CyclePayload {
        CyclePayload {
            metrics: Metrics {
                total_queries: total,
                blocked_queries: 1,
                cache_hits: 2,
                cache_misses: 3,
            },
            queries: Vec::new(),
            status: ServiceStatus::Running,
            backend_uptime: Some("5m".to_string()),
            hourly: HourlyStats::new(vec!["00".into()], vec![total], vec![1]).unwrap(),
            clients: Vec::new(),
        }
    }

    fn report(seq: u64, result: Result<CyclePayload, FailureReason>) -> CycleReport {
        let now = Utc::now();
        CycleReport {
            seq,
            started_at: now,
            finished_at: now,
            result,
        }
    }

    fn reason(endpoints: &[Endpoint]) -> FailureReason {
        FailureReason {
            failures: endpoints
                .iter()
                .map(|e| {
                    EndpointFailure::new(*e, &BlockwatchError::ApiUnavailable("down".into()), 1)
                })
                .collect(),
        }
    }

    #[test]
    fn test_initial_state() {
        let state = ViewState::new(ThemeId::Cockpit);
        assert_eq!(state.status(), ServiceStatus::Unknown);
        assert_eq!(state.theme(), ThemeId::Cockpit);
        assert_eq!(state.metrics(), &Metrics::default());
        assert!(state.hourly().is_empty());
        assert_eq!(state.revision(), 0);
    }

    #[test]
    fn test_success_replaces_everything() {
        let mut state = ViewState::new(ThemeId::Tva);
        let outcome = state.apply(report(1, Ok(payload(10))));

        assert_eq!(outcome, SyncOutcome::Success { seq: 1 });
        assert_eq!(state.metrics().total_queries, 10);
        assert_eq!(state.status(), ServiceStatus::Running);
        assert_eq!(state.backend_uptime(), Some("5m"));
        assert_eq!(state.hourly().requests(), &[10]);
        assert!(state.health().last_success_at.is_some());
    }

    #[test]
    fn test_failure_leaves_data_and_stops_status() {
        let mut state = ViewState::new(ThemeId::Tva);
        state.apply(report(1, Ok(payload(10))));
        let before = state.clone();

        let outcome = state.apply(report(2, Err(reason(&[Endpoint::Metrics]))));

        assert!(matches!(outcome, SyncOutcome::PartialFailure { seq: 2, .. }));
        assert_eq!(state.status(), ServiceStatus::Stopped);
        assert_eq!(state.metrics(), before.metrics());
        assert_eq!(state.queries(), before.queries());
        assert_eq!(state.clients(), before.clients());
        assert_eq!(state.hourly(), before.hourly());
        assert_eq!(state.health().consecutive_failures, 1);
    }

    #[test]
    fn test_all_endpoints_failing_is_full_failure() {
        let mut state = ViewState::new(ThemeId::Tva);
        let outcome = state.apply(report(1, Err(reason(&Endpoint::CYCLE))));
        assert!(matches!(outcome, SyncOutcome::FullFailure { .. }));
    }

    #[test]
    fn test_stale_reports_are_discarded() {
        let mut state = ViewState::new(ThemeId::Tva);
        state.apply(report(3, Ok(payload(30))));
        let revision = state.revision();

        let outcome = state.apply(report(2, Ok(payload(20))));
        assert_eq!(outcome, SyncOutcome::Superseded { seq: 2, latest: 3 });
        assert_eq!(state.metrics().total_queries, 30);

        let outcome = state.apply(report(1, Err(reason(&[Endpoint::Status]))));
        assert!(matches!(outcome, SyncOutcome::Superseded { .. }));
        assert_eq!(state.status(), ServiceStatus::Running);
        assert_eq!(state.revision(), revision);
    }

    #[test]
    fn test_success_resets_failure_streak() {
        let mut state = ViewState::new(ThemeId::Tva);
        state.apply(report(1, Err(reason(&[Endpoint::Clients]))));
        state.apply(report(2, Err(reason(&[Endpoint::Clients]))));
        assert_eq!(state.health().consecutive_failures, 2);

        state.apply(report(3, Ok(payload(1))));
        assert_eq!(state.health().consecutive_failures, 0);
        assert_eq!(state.health().last_applied_seq, 3);
    }

    #[test]
    fn test_theme_and_ticks() {
        let mut state = ViewState::new(ThemeId::Tva);
        assert!(!state.set_theme(ThemeId::Tva));
        assert!(state.set_theme(ThemeId::Cockpit));
        assert_eq!(state.revision(), 1);

        state.record_tick(5);
        state.record_tick(3);
        assert_eq!(state.uptime_tick(), 5);
    }

    #[test]
    fn test_blocklist_failure_keeps_last_overview() {
        let mut state = ViewState::new(ThemeId::Tva);
        state.apply_blocklists(Ok(BlocklistOverview::default()));
        state.apply_blocklists(Err(reason(&[Endpoint::Regex])));

        assert!(state.blocklists().is_some());
        assert!(state.blocklists_error().unwrap().contains("/api/v1/regex"));
    }
}
