use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use blockwatch_core::{
    BlockwatchConfig, BlocklistOverview, ChartRenderer, CycleReport, DashboardSession,
    DataSyncController, DisplayFormat, FailureReason, HttpDashboardApi, Page, ScheduleEvent,
    Scheduler, SyncOutcome, ThemeStore, UptimeClock,
};
use crossterm::event::EventStream;
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::events::{Action, EventHandler};
use crate::surface::{SurfaceChange, TerminalSurface};
use crate::theme::TerminalTheme;
use crate::ui::layout::MainLayout;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadingState {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

impl LoadingState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadingState::Loading)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LoadingState::Error)
    }

    pub fn indicator(&self) -> &'static str {
        match self {
            LoadingState::Idle => "",
            LoadingState::Loading => "⟳",
            LoadingState::Success => "✓",
            LoadingState::Error => "✗",
        }
    }
}

/// Results of background fetches, delivered back to the UI loop.
#[derive(Debug)]
enum AppMessage {
    Cycle(CycleReport),
    Blocklists(Result<BlocklistOverview, FailureReason>),
}

pub struct App {
    pub should_quit: bool,
    pub session: DashboardSession<TerminalSurface>,
    pub config: BlockwatchConfig,
    pub theme: TerminalTheme,
    pub loading_state: LoadingState,
    pub status_message: Option<String>,
    pub scroll: usize,
    pub event_handler: EventHandler,
    in_flight: usize,
    needs_draw: bool,
    scheduler: Scheduler,
    schedule_rx: mpsc::UnboundedReceiver<ScheduleEvent>,
    messages_tx: mpsc::UnboundedSender<AppMessage>,
    messages_rx: mpsc::UnboundedReceiver<AppMessage>,
}

impl App {
    pub fn new(config: BlockwatchConfig) -> Result<Self> {
        let api = HttpDashboardApi::new(&config.api)?;
        let controller = DataSyncController::new(
            Arc::new(api),
            config.retry.to_retry_config(),
            DisplayFormat::from_config(&config.display),
        );

        let surface_id = config.tui.chart_surface.clone();
        let chart = ChartRenderer::new(TerminalSurface::new(surface_id.clone()), surface_id);
        let session = DashboardSession::new(
            controller,
            ThemeStore::new(config.theme_file()),
            chart,
            UptimeClock::start(),
            Page::from_path(&config.tui.start_route),
        );
        let theme = TerminalTheme::from_config(&session.theme_config());

        let (scheduler, schedule_rx) = Scheduler::from_config(&config.polling);
        let (messages_tx, messages_rx) = mpsc::unbounded_channel();

        Ok(Self {
            should_quit: false,
            session,
            config,
            theme,
            loading_state: LoadingState::Idle,
            status_message: Some("Connecting...".to_string()),
            scroll: 0,
            event_handler: EventHandler::new(),
            in_flight: 0,
            needs_draw: true,
            scheduler,
            schedule_rx,
            messages_tx,
            messages_rx,
        })
    }

    pub fn page(&self) -> Page {
        self.session.page()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        let size = terminal.size()?;
        self.fit(size.width, size.height);

        self.scheduler.start()?;
        self.request_refresh();
        if self.page() == Page::Blocklists {
            self.request_blocklists();
        }

        let mut events = EventStream::new();
        let mut frame = tokio::time::interval(Duration::from_millis(self.config.tui.frame_rate_ms));

        loop {
            let dirty = self.session.chart_mut().surface_mut().take_dirty();
            if self.needs_draw || dirty {
                terminal.draw(|f| MainLayout::render(f, self))?;
                self.needs_draw = false;
            }

            tokio::select! {
                maybe_event = events.next() => match maybe_event {
                    Some(Ok(event)) => {
                        if let Some(action) = self.event_handler.handle_event(event) {
                            self.execute_action(action);
                        }
                    }
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                },
                Some(event) = self.schedule_rx.recv() => self.on_schedule(event),
                Some(message) = self.messages_rx.recv() => self.on_message(message),
                _ = frame.tick() => {}
            }

            if self.should_quit {
                break;
            }
        }

        self.scheduler.stop();
        info!("Blockwatch exiting");
        Ok(())
    }

    pub fn execute_action(&mut self, action: Action) {
        self.needs_draw = true;
        match action {
            Action::Quit => self.should_quit = true,
            Action::NextPage => self.go_to(self.page().next()),
            Action::PrevPage => self.go_to(self.page().previous()),
            Action::GoToPage(index) => {
                if let Some(page) = Page::ALL.get(index) {
                    self.go_to(*page);
                }
            }
            Action::Down => {
                if self.scroll < self.max_scroll() {
                    self.scroll += 1;
                }
            }
            Action::Up => self.scroll = self.scroll.saturating_sub(1),
            Action::Top => self.scroll = 0,
            Action::Refresh => {
                self.scheduler.fire_refresh();
                self.status_message = Some("Refreshing...".to_string());
            }
            Action::ToggleTheme => self.toggle_theme(),
            Action::Resize { width, height } => self.fit(width, height),
        }
    }

    pub fn toggle_theme(&mut self) {
        let theme = self.session.toggle_theme();
        self.theme = TerminalTheme::from_config(&self.session.theme_config());
        self.status_message = Some(format!("Theme: {}", theme.display_name()));
    }

    pub fn go_to(&mut self, page: Page) {
        if page == self.page() {
            return;
        }
        self.session.set_page(page);
        self.scroll = 0;
        if page == Page::Blocklists {
            self.request_blocklists();
        }
    }

    /// Sizes the chart surface for a terminal of `width` x `height` and
    /// creates the chart once it fits.
    pub fn fit(&mut self, width: u16, height: u16) {
        let area = MainLayout::chart_area(Rect::new(0, 0, width, height));
        match self.session.chart_mut().surface_mut().fit(area.width, area.height) {
            SurfaceChange::Appeared => {
                self.session.init_chart();
            }
            SurfaceChange::Vanished => {
                self.session.release_chart();
            }
            SurfaceChange::Unchanged => {}
        }
        self.needs_draw = true;
    }

    fn on_schedule(&mut self, event: ScheduleEvent) {
        match event {
            ScheduleEvent::Refresh => {
                self.request_refresh();
                if self.page() == Page::Blocklists {
                    self.request_blocklists();
                }
            }
            ScheduleEvent::Tick(n) => {
                self.session.record_tick(n);
                self.needs_draw = true;
            }
        }
    }

    /// Starts a cycle in the background. Cycles are never queued behind one
    /// another; late results are discarded when applied.
    pub fn request_refresh(&mut self) {
        let ticket = self.session.begin_cycle();
        let controller = self.session.controller().clone();
        let tx = self.messages_tx.clone();

        self.in_flight += 1;
        self.loading_state = LoadingState::Loading;
        debug!("Spawning refresh cycle {} ({} in flight)", ticket.seq, self.in_flight);

        tokio::spawn(async move {
            let report = controller.run_cycle(ticket).await;
            let _ = tx.send(AppMessage::Cycle(report));
        });
    }

    fn request_blocklists(&mut self) {
        let controller = self.session.controller().clone();
        let tx = self.messages_tx.clone();
        tokio::spawn(async move {
            let result = controller.fetch_blocklists().await;
            let _ = tx.send(AppMessage::Blocklists(result));
        });
    }

    fn on_message(&mut self, message: AppMessage) {
        self.needs_draw = true;
        match message {
            AppMessage::Cycle(report) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                let outcome = self.session.apply(report);
                self.on_outcome(&outcome);
            }
            AppMessage::Blocklists(result) => self.session.apply_blocklists(result),
        }
    }

    fn on_outcome(&mut self, outcome: &SyncOutcome) {
        match outcome {
            SyncOutcome::Success { .. } => {
                self.status_message = None;
                self.loading_state = if self.in_flight > 0 {
                    LoadingState::Loading
                } else {
                    LoadingState::Success
                };
            }
            SyncOutcome::PartialFailure { reason, .. } | SyncOutcome::FullFailure { reason, .. } => {
                let mut message = format!("Refresh failed: {}", reason.summary());
                if let Some(hint) = reason.hint() {
                    message.push_str(" - ");
                    message.push_str(hint);
                }
                self.status_message = Some(message);
                self.loading_state = LoadingState::Error;
            }
            SyncOutcome::Superseded { .. } => {}
        }
    }

    fn max_scroll(&self) -> usize {
        let view = self.session.view();
        match self.page() {
            Page::Dashboard => view.queries().len().max(view.clients().len()).saturating_sub(1),
            Page::Blocklists => view
                .blocklists()
                .map(|b| b.lists.len().max(b.whitelist.len()).max(b.regex.len()))
                .unwrap_or(0)
                .saturating_sub(1),
            Page::Settings | Page::About => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockwatch_core::ThemeId;
    use tempfile::TempDir;

    fn app(dir: &TempDir) -> App {
        let mut config = BlockwatchConfig::default();
        config.api.base_url = "http://127.0.0.1:9".to_string();
        config.tui.theme_file = dir.path().join("theme.toml").display().to_string();
        App::new(config).unwrap()
    }

    #[test]
    fn test_loading_indicator() {
        assert_eq!(LoadingState::Idle.indicator(), "");
        assert!(LoadingState::Loading.is_loading());
        assert!(LoadingState::Error.is_error());
    }

    #[tokio::test]
    async fn test_chart_created_once_terminal_fits() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        assert!(app.session.chart().instance().is_none());

        app.fit(20, 10);
        assert!(app.session.chart().instance().is_none());

        app.fit(160, 50);
        assert!(app.session.chart().instance().is_some());
    }

    #[tokio::test]
    async fn test_chart_released_when_terminal_shrinks() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        app.fit(160, 50);
        let first = app.session.chart().handle().unwrap();

        app.fit(30, 12);
        assert!(app.session.chart().handle().is_none());

        app.fit(160, 50);
        let second = app.session.chart().handle().unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_failed_cycle_shows_suggestion() {
        use blockwatch_core::{BlockwatchError, Endpoint, EndpointFailure, FailureReason};

        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        let reason = FailureReason {
            failures: vec![EndpointFailure::new(
                Endpoint::Metrics,
                &BlockwatchError::ApiUnavailable("connection refused".into()),
                2,
            )],
        };

        app.on_outcome(&SyncOutcome::FullFailure { seq: 1, reason });

        let message = app.status_message.clone().unwrap();
        assert!(message.starts_with("Refresh failed: /api/v1/metrics (network)"));
        assert!(message.contains("api.base_url"));
        assert!(app.loading_state.is_error());
    }

    #[tokio::test]
    async fn test_toggle_theme_updates_colors_and_store() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        app.fit(160, 50);
        let before = app.theme.clone();

        app.execute_action(Action::ToggleTheme);

        assert_eq!(app.theme.id, ThemeId::Cockpit);
        assert_ne!(app.theme.primary, before.primary);
        assert_eq!(app.status_message.as_deref(), Some("Theme: Cockpit"));
        assert_eq!(
            app.session.theme_store().load().unwrap(),
            Some(ThemeId::Cockpit)
        );
    }

    #[tokio::test]
    async fn test_page_navigation() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);
        app.fit(160, 50);

        app.execute_action(Action::GoToPage(2));
        assert_eq!(app.page(), Page::Settings);
        assert!(app.session.chart().instance().is_none());

        app.execute_action(Action::NextPage);
        assert_eq!(app.page(), Page::About);
        app.execute_action(Action::NextPage);
        assert_eq!(app.page(), Page::Dashboard);
        assert!(app.session.chart().instance().is_some());

        app.execute_action(Action::GoToPage(9));
        assert_eq!(app.page(), Page::Dashboard);
    }

    #[tokio::test]
    async fn test_refresh_tracks_in_flight_cycles() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);

        app.request_refresh();
        app.request_refresh();
        assert_eq!(app.in_flight(), 2);
        assert!(app.loading_state.is_loading());
    }

    #[test]
    fn test_quit_and_scroll() {
        let dir = TempDir::new().unwrap();
        let mut app = app(&dir);

        app.execute_action(Action::Down);
        assert_eq!(app.scroll, 0);
        app.execute_action(Action::Up);
        assert_eq!(app.scroll, 0);

        app.execute_action(Action::Quit);
        assert!(app.should_quit);
    }
}
