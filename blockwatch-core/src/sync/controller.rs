use chrono::Utc;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, warn};

use super::types::{CyclePayload, CycleReport, CycleTicket, EndpointFailure, FailureReason};
use crate::client::{DashboardApi, Endpoint};
use crate::error::{BlockwatchError, BlockwatchResult, RetryConfig};
use crate::models::{
    BlocklistOverview, BlocklistsPayload, ClientsPayload, HourlyStats, HourlyStatsPayload,
    Metrics, QueriesPayload, StatusPayload,
};
use crate::timefmt::DisplayFormat;

/// Runs refresh cycles against a [`DashboardApi`].
///
/// The controller never touches view state; it produces [`CycleReport`]s
/// that the session applies atomically.
#[derive(Clone)]
pub struct DataSyncController {
    api: Arc<dyn DashboardApi>,
    retry: RetryConfig,
    display: DisplayFormat,
}

impl DataSyncController {
    pub fn new(api: Arc<dyn DashboardApi>, retry: RetryConfig, display: DisplayFormat) -> Self {
        Self {
            api,
            retry,
            display,
        }
    }

    pub fn retry(&self) -> &RetryConfig {
        &self.retry
    }

    pub fn display(&self) -> &DisplayFormat {
        &self.display
    }

    /// Fetches the five cycle endpoints concurrently and waits for all of
    /// them. Any failure fails the whole cycle.
    pub async fn run_cycle(&self, ticket: CycleTicket) -> CycleReport {
        let started_at = Utc::now();
        debug!("Refresh cycle {} started", ticket.seq);

        let (metrics, queries, status, hourly, clients) = tokio::join!(
            self.fetch::<Metrics>(Endpoint::Metrics),
            self.fetch::<QueriesPayload>(Endpoint::Queries),
            self.fetch::<StatusPayload>(Endpoint::Status),
            self.fetch_validated(Endpoint::HourlyStats, |p: HourlyStatsPayload| {
                HourlyStats::try_from(p)
            }),
            self.fetch::<ClientsPayload>(Endpoint::Clients),
        );

        let result = match (metrics, queries, status, hourly, clients) {
            (Ok(metrics), Ok(queries), Ok(status), Ok(hourly), Ok(clients)) => {
                Ok(self.merge(metrics, queries, status, hourly, clients))
            }
            (metrics, queries, status, hourly, clients) => {
                let failures: Vec<EndpointFailure> = [
                    metrics.err(),
                    queries.err(),
                    status.err(),
                    hourly.err(),
                    clients.err(),
                ]
                .into_iter()
                .flatten()
                .collect();
                Err(FailureReason { failures })
            }
        };

        let report = CycleReport {
            seq: ticket.seq,
            started_at,
            finished_at: Utc::now(),
            result,
        };
        debug!(
            "Refresh cycle {} finished in {}ms (success={})",
            report.seq,
            report.duration_ms(),
            report.is_success()
        );
        report
    }

    /// Fetches the read-only filter configuration shown on the blocklists
    /// page. Independent of the refresh cycle.
    pub async fn fetch_blocklists(&self) -> Result<BlocklistOverview, FailureReason> {
        let (lists, whitelist, regex) = tokio::join!(
            self.fetch::<BlocklistsPayload>(Endpoint::Blocklists),
            self.fetch::<Vec<String>>(Endpoint::Whitelist),
            self.fetch::<Vec<String>>(Endpoint::Regex),
        );

        match (lists, whitelist, regex) {
            (Ok(lists), Ok(whitelist), Ok(regex)) => {
                Ok(BlocklistOverview::new(lists, whitelist, regex))
            }
            (lists, whitelist, regex) => Err(FailureReason {
                failures: [lists.err(), whitelist.err(), regex.err()]
                    .into_iter()
                    .flatten()
                    .collect(),
            }),
        }
    }

    fn merge(
        &self,
        metrics: Metrics,
        queries: QueriesPayload,
        status: StatusPayload,
        hourly: HourlyStats,
        clients: ClientsPayload,
    ) -> CyclePayload {
        CyclePayload {
            metrics,
            queries: queries
                .queries
                .into_iter()
                .map(|q| q.with_display(&self.display))
                .collect(),
            status: status.status,
            backend_uptime: status.uptime,
            hourly,
            clients: clients
                .clients
                .into_iter()
                .map(|c| c.with_display(&self.display))
                .collect(),
        }
    }

    async fn fetch<T>(&self, endpoint: Endpoint) -> Result<T, EndpointFailure>
    where
        T: DeserializeOwned + Send,
    {
        self.fetch_validated(endpoint, Ok).await
    }

    /// Request, status check, decode and validate, retrying transient
    /// failures per the retry config.
    async fn fetch_validated<T, U, F>(
        &self,
        endpoint: Endpoint,
        validate: F,
    ) -> Result<U, EndpointFailure>
    where
        T: DeserializeOwned + Send,
        U: Send,
        F: Fn(T) -> BlockwatchResult<U> + Send + Sync,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let result = match self.request(endpoint).await {
                Ok(body) => decode::<T>(endpoint, &body).and_then(&validate),
                Err(e) => Err(e),
            };

            match result {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay_for_attempt(attempt - 1);
                    warn!(
                        "{} failed (attempt {}/{}), retrying in {:?}: {}",
                        endpoint, attempt, self.retry.max_attempts, delay, e
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    warn!("{} failed after {} attempt(s): {}", endpoint, attempt, e);
                    return Err(EndpointFailure::new(endpoint, &e, attempt));
                }
            }
        }
    }

    async fn request(&self, endpoint: Endpoint) -> BlockwatchResult<String> {
        let response = self.api.get(endpoint).await?;
        if !response.is_success() {
            return Err(BlockwatchError::HttpStatus {
                endpoint: endpoint.path().to_string(),
                status: response.status,
            });
        }
        Ok(response.body)
    }
}

fn decode<T: DeserializeOwned>(endpoint: Endpoint, body: &str) -> BlockwatchResult<T> {
    serde_json::from_str(body).map_err(|e| BlockwatchError::Decode {
        endpoint: endpoint.path().to_string(),
        message: e.to_string(),
    })
}
