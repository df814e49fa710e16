use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{BlockwatchError, BlockwatchResult};
use crate::timefmt::{DisplayFormat, INVALID_TIMESTAMP};

/// Decodes `null` the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decodes an RFC 3339 timestamp; absent, `null` or unparseable values
/// become `None` so one bad row does not reject the whole payload.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|ts| ts.with_timezone(&Utc)))
}

/// Aggregate counters from `/api/v1/metrics`. Absent or `null` fields are 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_queries: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub blocked_queries: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cache_hits: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cache_misses: u64,
}

impl Metrics {
    /// Blocked share of all queries, in percent.
    pub fn block_rate(&self) -> f64 {
        percent(self.blocked_queries, self.total_queries)
    }

    /// Cache hit share of all cache lookups, in percent.
    pub fn cache_hit_rate(&self) -> f64 {
        percent(self.cache_hits, self.cache_hits + self.cache_misses)
    }
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// One entry of the recent-activity log.
///
/// Fields the dashboard does not interpret are kept in `extra`. `time` is
/// derived when the record is merged into the view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub blocked: bool,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(skip)]
    pub time: String,
}

impl QueryRecord {
    pub fn with_display(mut self, format: &DisplayFormat) -> Self {
        self.time = match &self.timestamp {
            Some(ts) => format.format_time(ts),
            None => INVALID_TIMESTAMP.to_string(),
        };
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QueriesPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub queries: Vec<QueryRecord>,
}

/// Per-client counters; `last_seen_display` is derived on merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientStat {
    #[serde(default)]
    pub ip: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_queries: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub blocked_queries: u64,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    #[serde(skip)]
    pub last_seen_display: String,
}

impl ClientStat {
    pub fn with_display(mut self, format: &DisplayFormat) -> Self {
        self.last_seen_display = match &self.last_seen {
            Some(ts) => format.format_datetime(ts),
            None => INVALID_TIMESTAMP.to_string(),
        };
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ClientsPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub clients: Vec<ClientStat>,
}

/// Raw `/api/v1/stats/hourly` body before alignment is checked.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HourlyStatsPayload {
    pub hours: Vec<String>,
    pub requests: Vec<u64>,
    pub blocks: Vec<u64>,
}

/// Positionally aligned hourly series. The three sequences always have the
/// same length.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HourlyStats {
    labels: Vec<String>,
    requests: Vec<u64>,
    blocks: Vec<u64>,
}

impl HourlyStats {
    pub fn new(labels: Vec<String>, requests: Vec<u64>, blocks: Vec<u64>) -> BlockwatchResult<Self> {
        if labels.len() != requests.len() || labels.len() != blocks.len() {
            return Err(BlockwatchError::InvalidPayload {
                endpoint: "/api/v1/stats/hourly".to_string(),
                message: format!(
                    "misaligned series: {} labels, {} requests, {} blocks",
                    labels.len(),
                    requests.len(),
                    blocks.len()
                ),
            });
        }
        Ok(Self {
            labels,
            requests,
            blocks,
        })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn requests(&self) -> &[u64] {
        &self.requests
    }

    pub fn blocks(&self) -> &[u64] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn peak(&self) -> u64 {
        self.requests
            .iter()
            .chain(self.blocks.iter())
            .copied()
            .max()
            .unwrap_or(0)
    }
}

impl TryFrom<HourlyStatsPayload> for HourlyStats {
    type Error = BlockwatchError;

    fn try_from(payload: HourlyStatsPayload) -> BlockwatchResult<Self> {
        HourlyStats::new(payload.hours, payload.requests, payload.blocks)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Running,
    #[default]
    Stopped,
    #[serde(other)]
    Unknown,
}

impl ServiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Running => "running",
            ServiceStatus::Stopped => "stopped",
            ServiceStatus::Unknown => "unknown",
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, ServiceStatus::Running)
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusPayload {
    pub status: ServiceStatus,
    /// Backend-reported uptime, free-form.
    #[serde(default)]
    pub uptime: Option<String>,
}

/// UI mode inferred from the route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Page {
    #[default]
    Dashboard,
    Blocklists,
    Settings,
    About,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Dashboard, Page::Blocklists, Page::Settings, Page::About];

    /// Substring match on the route; anything unrecognized is the dashboard.
    pub fn from_path(path: &str) -> Self {
        if path.contains("/blocklists") {
            Page::Blocklists
        } else if path.contains("/settings") {
            Page::Settings
        } else if path.contains("/about") {
            Page::About
        } else {
            Page::Dashboard
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Page::Dashboard => "/",
            Page::Blocklists => "/blocklists",
            Page::Settings => "/settings",
            Page::About => "/about",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Blocklists => "Blocklists",
            Page::Settings => "Settings",
            Page::About => "About",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Page::Dashboard => 0,
            Page::Blocklists => 1,
            Page::Settings => 2,
            Page::About => 3,
        }
    }

    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct BlocklistCounters {
    #[serde(default)]
    pub domains: u64,
    #[serde(default)]
    pub blocks: u64,
}

pub type BlocklistsPayload = BTreeMap<String, BlocklistCounters>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlocklistSummary {
    pub name: String,
    pub domains: u64,
    pub blocks: u64,
}

/// Read-only view of the filter configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlocklistOverview {
    pub lists: Vec<BlocklistSummary>,
    pub whitelist: Vec<String>,
    pub regex: Vec<String>,
}

impl BlocklistOverview {
    pub fn new(lists: BlocklistsPayload, whitelist: Vec<String>, regex: Vec<String>) -> Self {
        // BTreeMap iteration keeps lists sorted by name
        let lists = lists
            .into_iter()
            .map(|(name, counters)| BlocklistSummary {
                name,
                domains: counters.domains,
                blocks: counters.blocks,
            })
            .collect();
        Self {
            lists,
            whitelist,
            regex,
        }
    }

    pub fn total_domains(&self) -> u64 {
        self.lists.iter().map(|l| l.domains).sum()
    }
}
