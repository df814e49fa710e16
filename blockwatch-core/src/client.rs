use async_trait::async_trait;
use reqwest::Client;
use std::fmt;
use std::time::Duration;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::BlockwatchResult;

/// The fixed API paths polled by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Metrics,
    Queries,
    Status,
    HourlyStats,
    Clients,
    Blocklists,
    Whitelist,
    Regex,
}

impl Endpoint {
    /// The five endpoints that make up one refresh cycle.
    pub const CYCLE: [Endpoint; 5] = [
        Endpoint::Metrics,
        Endpoint::Queries,
        Endpoint::Status,
        Endpoint::HourlyStats,
        Endpoint::Clients,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Metrics => "/api/v1/metrics",
            Endpoint::Queries => "/api/v1/queries",
            Endpoint::Status => "/api/v1/status",
            Endpoint::HourlyStats => "/api/v1/stats/hourly",
            Endpoint::Clients => "/api/v1/clients",
            Endpoint::Blocklists => "/api/v1/blocklists",
            Endpoint::Whitelist => "/api/v1/whitelist",
            Endpoint::Regex => "/api/v1/regex",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A response that reached us, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport to the DNS server's HTTP API.
///
/// Implementations only report transport failures as errors; status checks
/// and decoding happen in the sync controller.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn get(&self, endpoint: Endpoint) -> BlockwatchResult<ApiResponse>;
}

pub struct HttpDashboardApi {
    client: Client,
    base_url: String,
}

impl HttpDashboardApi {
    pub fn new(config: &ApiConfig) -> BlockwatchResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }
}

#[async_trait]
impl DashboardApi for HttpDashboardApi {
    async fn get(&self, endpoint: Endpoint) -> BlockwatchResult<ApiResponse> {
        let url = self.url(endpoint);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_paths() {
        assert_eq!(Endpoint::Metrics.path(), "/api/v1/metrics");
        assert_eq!(Endpoint::HourlyStats.path(), "/api/v1/stats/hourly");
        assert_eq!(Endpoint::CYCLE.len(), 5);
        assert!(!Endpoint::CYCLE.contains(&Endpoint::Blocklists));
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let config = ApiConfig {
            base_url: "http://127.0.0.1:8080/".to_string(),
            ..ApiConfig::default()
        };
        let api = HttpDashboardApi::new(&config).unwrap();
        assert_eq!(api.url(Endpoint::Clients), "http://127.0.0.1:8080/api/v1/clients");
    }

    #[test]
    fn test_response_success_range() {
        assert!(ApiResponse::ok("{}").is_success());
        assert!(!ApiResponse {
            status: 503,
            body: String::new()
        }
        .is_success());
    }
}
