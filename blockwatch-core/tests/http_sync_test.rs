#![allow(dead_code, unused_imports, unused_variables)]

use blockwatch_core::chart::{ChartRenderer, ChartSurface, DrawingContext};
use blockwatch_core::timefmt::{DisplayFormat, DisplayZone, UptimeClock};
use blockwatch_core::{
    ApiConfig, CycleTicket, DashboardApi, DashboardSession, DataSyncController, Endpoint,
    FailureKind, HttpDashboardApi, Page, RetryConfig, ServiceStatus, SyncOutcome, ThemeId,
    ThemeStore,
};
use chrono::FixedOffset;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const METRICS: &str =
    r#"{"totalQueries":500,"blockedQueries":125,"cacheHits":300,"cacheMisses":200}"#;
const QUERIES: &str = r#"{"queries":[
    {"id":"a1","domain":"tracker.example","blocked":true,"timestamp":"2024-05-01T12:30:00Z","clientIp":"10.0.0.3"}]}"#;
const STATUS: &str = r#"{"status":"running","uptime":"2h3m"}"#;
const HOURLY: &str = r#"{"hours":["10","11","12"],"requests":[40,55,61],"blocks":[7,9,12]}"#;
const CLIENTS: &str = r#"{"clients":[
    {"ip":"10.0.0.3","totalQueries":77,"blockedQueries":11,"lastSeen":"2024-05-01T12:30:00Z"}]}"#;

#[derive(Default)]
struct CountingSurface {
    acquired: u64,
    released: u64,
    redraws: u64,
}

impl ChartSurface for CountingSurface {
    fn acquire_context(&mut self, _surface_id: &str) -> Option<DrawingContext> {
        self.acquired += 1;
        Some(DrawingContext::new(self.acquired))
    }

    fn release_context(&mut self, _context: DrawingContext) {
        self.released += 1;
    }

    fn request_redraw(&mut self, _context: DrawingContext) {
        self.redraws += 1;
    }
}

async fn mount(server: &MockServer, endpoint: Endpoint, body: &str) {
    Mock::given(method("GET"))
        .and(path(endpoint.path()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn healthy_server() -> MockServer {
    let server = MockServer::start().await;
    mount(&server, Endpoint::Metrics, METRICS).await;
    mount(&server, Endpoint::Queries, QUERIES).await;
    mount(&server, Endpoint::Status, STATUS).await;
    mount(&server, Endpoint::HourlyStats, HOURLY).await;
    mount(&server, Endpoint::Clients, CLIENTS).await;
    server
}

fn api_config(base_url: String) -> ApiConfig {
    ApiConfig {
        base_url,
        request_timeout_ms: 500,
        connect_timeout_ms: 200,
    }
}

fn utc() -> DisplayFormat {
    DisplayFormat::default().with_zone(DisplayZone::Fixed(FixedOffset::east_opt(0).unwrap()))
}

fn controller(base_url: String, retry: RetryConfig) -> DataSyncController {
    let api = HttpDashboardApi::new(&api_config(base_url)).unwrap();
    DataSyncController::new(Arc::new(api), retry, utc())
}

fn quick_retry(attempts: u32) -> RetryConfig {
    RetryConfig {
        max_attempts: attempts,
        initial_delay: Duration::from_millis(5),
        max_delay: Duration::from_millis(5),
        backoff_multiplier: 1.0,
        jitter: false,
    }
}

mod cycle {
    use super::*;

    #[tokio::test]
    async fn test_cycle_over_http() {
        let server = healthy_server().await;
        let report = controller(server.uri(), RetryConfig::none())
            .run_cycle(CycleTicket { seq: 1 })
            .await;

        let payload = report.result.unwrap();
        assert_eq!(payload.metrics.blocked_queries, 125);
        assert_eq!(payload.status, ServiceStatus::Running);
        assert_eq!(payload.queries[0].time, "12:30:00");
        assert!(payload.queries[0].extra.contains_key("clientIp"));
        assert_eq!(payload.clients[0].last_seen_display, "2024-05-01 12:30:00");
        assert_eq!(payload.hourly.requests(), &[40, 55, 61]);
    }

    #[tokio::test]
    async fn test_server_error_fails_cycle() {
        let server = MockServer::start().await;
        mount(&server, Endpoint::Metrics, METRICS).await;
        mount(&server, Endpoint::Queries, QUERIES).await;
        mount(&server, Endpoint::Status, STATUS).await;
        mount(&server, Endpoint::Clients, CLIENTS).await;
        Mock::given(method("GET"))
            .and(path(Endpoint::HourlyStats.path()))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let report = controller(server.uri(), RetryConfig::none())
            .run_cycle(CycleTicket { seq: 1 })
            .await;

        let reason = report.result.unwrap_err();
        assert_eq!(reason.failures.len(), 1);
        assert_eq!(reason.failures[0].endpoint, Endpoint::HourlyStats);
        assert_eq!(reason.failures[0].kind, FailureKind::Backend);
        assert_eq!(reason.failures[0].code, "E1004");
    }

    #[tokio::test]
    async fn test_malformed_body_fails_cycle() {
        let server = MockServer::start().await;
        mount(&server, Endpoint::Metrics, "<html>oops</html>").await;
        mount(&server, Endpoint::Queries, QUERIES).await;
        mount(&server, Endpoint::Status, STATUS).await;
        mount(&server, Endpoint::HourlyStats, HOURLY).await;
        mount(&server, Endpoint::Clients, CLIENTS).await;

        let report = controller(server.uri(), RetryConfig::none())
            .run_cycle(CycleTicket { seq: 1 })
            .await;

        let reason = report.result.unwrap_err();
        assert_eq!(reason.failures[0].kind, FailureKind::Malformed);
    }

    #[tokio::test]
    async fn test_unavailable_status_is_retried() {
        let server = MockServer::start().await;
        mount(&server, Endpoint::Queries, QUERIES).await;
        mount(&server, Endpoint::Status, STATUS).await;
        mount(&server, Endpoint::HourlyStats, HOURLY).await;
        mount(&server, Endpoint::Clients, CLIENTS).await;
        Mock::given(method("GET"))
            .and(path(Endpoint::Metrics.path()))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(Endpoint::Metrics.path()))
            .respond_with(ResponseTemplate::new(200).set_body_string(METRICS))
            .expect(1)
            .mount(&server)
            .await;

        let report = controller(server.uri(), quick_retry(2))
            .run_cycle(CycleTicket { seq: 1 })
            .await;

        assert!(report.is_success());
    }

    #[tokio::test]
    async fn test_slow_endpoint_times_out() {
        let server = MockServer::start().await;
        mount(&server, Endpoint::Metrics, METRICS).await;
        mount(&server, Endpoint::Queries, QUERIES).await;
        mount(&server, Endpoint::HourlyStats, HOURLY).await;
        mount(&server, Endpoint::Clients, CLIENTS).await;
        Mock::given(method("GET"))
            .and(path(Endpoint::Status.path()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(STATUS)
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let report = controller(server.uri(), RetryConfig::none())
            .run_cycle(CycleTicket { seq: 1 })
            .await;

        let reason = report.result.unwrap_err();
        assert_eq!(reason.failures[0].endpoint, Endpoint::Status);
        assert_eq!(reason.failures[0].kind, FailureKind::Network);
    }

    #[tokio::test]
    async fn test_unreachable_server_fails_every_endpoint() {
        let report = controller("http://127.0.0.1:9".to_string(), RetryConfig::none())
            .run_cycle(CycleTicket { seq: 1 })
            .await;

        let reason = report.result.unwrap_err();
        assert_eq!(reason.failures.len(), Endpoint::CYCLE.len());
        assert!(reason.has_kind(FailureKind::Network));
    }
}

mod session {
    use super::*;

    fn session(base_url: String, dir: &TempDir) -> DashboardSession<CountingSurface> {
        let store = ThemeStore::new(dir.path().join("theme.toml"));
        let chart = ChartRenderer::new(CountingSurface::default(), "statsChart");
        let mut session = DashboardSession::new(
            controller(base_url, RetryConfig::none()),
            store,
            chart,
            UptimeClock::start(),
            Page::Dashboard,
        );
        session.init_chart();
        session
    }

    #[tokio::test]
    async fn test_refresh_then_outage() {
        let dir = TempDir::new().unwrap();
        let server = healthy_server().await;
        let mut session = session(server.uri(), &dir);

        assert!(session.refresh().await.is_success());
        assert_eq!(session.view().metrics().total_queries, 500);
        assert_eq!(
            session.chart().instance().unwrap().labels(),
            ["10".to_string(), "11".to_string(), "12".to_string()]
        );

        drop(server);
        let outcome = session.refresh().await;

        assert!(matches!(outcome, SyncOutcome::FullFailure { seq: 2, .. }));
        assert_eq!(session.view().status(), ServiceStatus::Stopped);
        assert_eq!(session.view().metrics().total_queries, 500);
        assert_eq!(session.chart().instance().unwrap().secondary().data, vec![7, 9, 12]);
    }

    #[tokio::test]
    async fn test_theme_survives_restart() {
        let dir = TempDir::new().unwrap();
        let server = healthy_server().await;

        let mut first = session(server.uri(), &dir);
        first.refresh().await;
        assert_eq!(first.toggle_theme(), ThemeId::Cockpit);
        assert_eq!(first.chart().surface().released, 1);
        assert_eq!(first.chart().surface().acquired, 2);
        drop(first);

        let second = session(server.uri(), &dir);
        assert_eq!(second.view().theme(), ThemeId::Cockpit);
        assert_eq!(
            second.chart().instance().unwrap().config().theme,
            ThemeId::Cockpit
        );
    }
}
