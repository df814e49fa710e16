use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::chart::{ChartRenderer, ChartSurface};
use crate::models::{BlocklistOverview, Page};
use crate::state::ViewState;
use crate::sync::{CycleReport, CycleTicket, DataSyncController, FailureReason, SyncOutcome};
use crate::theme::{self, ThemeConfig, ThemeId, ThemeStore};
use crate::timefmt::UptimeClock;

/// One running dashboard: view state, chart, theme and uptime clock.
///
/// All mutation goes through the session so that theme toggles, chart
/// rebuilds and cycle commits happen in a single owner.
pub struct DashboardSession<S: ChartSurface> {
    controller: DataSyncController,
    view: ViewState,
    store: ThemeStore,
    clock: UptimeClock,
    chart: ChartRenderer<S>,
    page: Page,
    next_seq: u64,
    revision_tx: watch::Sender<u64>,
}

impl<S: ChartSurface> DashboardSession<S> {
    /// Creates a session with the theme read from `store`.
    pub fn new(
        controller: DataSyncController,
        store: ThemeStore,
        chart: ChartRenderer<S>,
        clock: UptimeClock,
        page: Page,
    ) -> Self {
        let theme = store.load_or_default();
        let (revision_tx, _) = watch::channel(0);
        info!("Dashboard session starting on {:?} with theme '{}'", page, theme);

        Self {
            controller,
            view: ViewState::new(theme),
            store,
            clock,
            chart,
            page,
            next_seq: 1,
            revision_tx,
        }
    }

    /// Creates the chart for the current theme if the dashboard page is
    /// showing and no chart exists yet. A missing surface is logged by the
    /// renderer and leaves the session without a chart.
    pub fn init_chart(&mut self) -> bool {
        if self.page != Page::Dashboard || self.chart.handle().is_some() {
            return false;
        }
        match self.chart.initialize(&self.theme_config()) {
            Ok(_) => {
                self.restore_series();
                true
            }
            Err(_) => false,
        }
    }

    /// Issues the ticket for the next cycle.
    pub fn begin_cycle(&mut self) -> CycleTicket {
        let ticket = CycleTicket { seq: self.next_seq };
        self.next_seq += 1;
        ticket
    }

    /// Commits a finished cycle and pushes fresh hourly stats to the chart.
    pub fn apply(&mut self, report: CycleReport) -> SyncOutcome {
        let outcome = self.view.apply(report);

        match &outcome {
            SyncOutcome::Success { .. } => {
                self.replay_series();
            }
            SyncOutcome::PartialFailure { seq, reason } | SyncOutcome::FullFailure { seq, reason } => {
                error!("Refresh cycle {} failed: {}", seq, reason);
            }
            SyncOutcome::Superseded { seq, latest } => {
                warn!("Discarding cycle {} (cycle {} already applied)", seq, latest);
                return outcome;
            }
        }

        self.publish();
        outcome
    }

    /// Runs one full cycle inline.
    pub async fn refresh(&mut self) -> SyncOutcome {
        let ticket = self.begin_cycle();
        let report = self.controller.run_cycle(ticket).await;
        self.apply(report)
    }

    pub async fn refresh_blocklists(&mut self) {
        let result = self.controller.fetch_blocklists().await;
        self.apply_blocklists(result);
    }

    pub fn apply_blocklists(&mut self, result: Result<BlocklistOverview, FailureReason>) {
        if let Err(reason) = &result {
            warn!("Blocklist refresh failed: {}", reason);
        }
        self.view.apply_blocklists(result);
        self.publish();
    }

    /// Switches to the other theme, persists it, and rebuilds the chart when
    /// the dashboard is showing one.
    pub fn toggle_theme(&mut self) -> ThemeId {
        let theme = self.view.theme().toggled();
        self.view.set_theme(theme);

        if let Err(e) = self.store.save(theme) {
            warn!("Failed to save theme preference: {}", e);
        }

        if self.page == Page::Dashboard {
            if self.chart.handle().is_some() {
                self.release_chart();
                if self.chart.initialize(&self.theme_config()).is_ok() {
                    self.restore_series();
                }
            }
        }

        info!("Theme switched to '{}'", theme);
        self.publish();
        theme
    }

    /// Changes page. Entering the dashboard creates the chart; leaving it
    /// destroys it.
    pub fn set_page(&mut self, page: Page) {
        if self.page == page {
            return;
        }
        self.release_chart();
        self.page = page;
        self.init_chart();
        self.publish();
    }

    /// Destroys the live chart, if any. Used when the page changes or the
    /// drawing surface goes away; `init_chart` builds a fresh one later.
    pub fn release_chart(&mut self) -> bool {
        let Some(handle) = self.chart.handle() else {
            return false;
        };
        match self.chart.destroy(handle) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to destroy chart {}: {}", handle.id(), e);
                false
            }
        }
    }

    pub fn record_tick(&mut self, tick: u64) {
        self.view.record_tick(tick);
    }

    pub fn uptime(&self, now: DateTime<Utc>) -> String {
        self.clock.uptime(now)
    }

    pub fn uptime_percentage(&self, now: DateTime<Utc>) -> f64 {
        self.clock.percentage_within_hour(now)
    }

    pub fn theme_config(&self) -> ThemeConfig {
        theme::build(self.view.theme())
    }

    /// Receives the view revision after every commit or theme change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision_tx.subscribe()
    }

    pub fn controller(&self) -> &DataSyncController {
        &self.controller
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn chart(&self) -> &ChartRenderer<S> {
        &self.chart
    }

    pub fn chart_mut(&mut self) -> &mut ChartRenderer<S> {
        &mut self.chart
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn clock(&self) -> &UptimeClock {
        &self.clock
    }

    pub fn theme_store(&self) -> &ThemeStore {
        &self.store
    }

    fn replay_series(&mut self) {
        let hourly = self.view.hourly();
        self.chart
            .update_series(hourly.labels(), hourly.requests(), hourly.blocks());
    }

    /// Feeds a freshly built chart the last committed hourly stats.
    fn restore_series(&mut self) {
        if !self.view.hourly().is_empty() {
            self.replay_series();
        }
    }

    fn publish(&self) {
        self.revision_tx.send_replace(self.view.revision());
    }
}
