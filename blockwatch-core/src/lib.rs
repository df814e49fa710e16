pub mod chart;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod sync;
pub mod theme;
pub mod timefmt;

pub use chart::{
    BoundGradient, ChartHandle, ChartInstance, ChartRenderer, ChartSurface, DrawingContext, Series,
};
pub use client::{ApiResponse, DashboardApi, Endpoint, HttpDashboardApi};
pub use config::{
    get_config_dir, get_data_dir, ApiConfig, BlockwatchConfig, ComponentLevel, DisplayConfig,
    LoggingConfig, PollingConfig, RetrySettings, TuiConfig,
};
pub use error::{BlockwatchError, BlockwatchResult, FailureKind, RetryConfig};
pub use logging::{build_filter_directives, init_logging};
pub use models::{
    BlocklistCounters, BlocklistOverview, BlocklistSummary, ClientStat, HourlyStats, Metrics,
    Page, QueryRecord, ServiceStatus,
};
pub use scheduler::{ScheduleEvent, Scheduler};
pub use session::DashboardSession;
pub use state::{SyncHealth, ViewState};
pub use sync::{
    CyclePayload, CycleReport, CycleTicket, DataSyncController, EndpointFailure, FailureReason,
    SyncOutcome,
};
pub use theme::{PointStyle, Rgba, ThemeConfig, ThemeId, ThemeStore};
pub use timefmt::{
    format_uptime, is_valid_pattern, uptime_percentage_within_hour, DisplayFormat, DisplayZone,
    UptimeClock, INVALID_TIMESTAMP,
};
