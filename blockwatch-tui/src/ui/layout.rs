use ratatui::{
    layout::{Constraint, Direction, Layout, Margin, Rect},
    widgets::Block,
    Frame,
};

use blockwatch_core::Page;

use crate::app::App;
use crate::theme::ThemedStyles;
use crate::ui::views::{AboutView, BlocklistsView, DashboardView, SettingsView};
use crate::ui::widgets::{Footer, Header};

pub const HEADER_HEIGHT: u16 = 3;
pub const FOOTER_HEIGHT: u16 = 1;

pub struct MainLayout;

impl MainLayout {
    pub fn render(frame: &mut Frame, app: &App) {
        let size = frame.area();
        let styles = ThemedStyles::new(&app.theme);

        frame.render_widget(Block::default().style(styles.base()), size);

        let (header, content, footer) = Self::split(size);

        Header::render(frame, header, app);

        match app.page() {
            Page::Dashboard => DashboardView::render(frame, content, app),
            Page::Blocklists => BlocklistsView::render(frame, content, app),
            Page::Settings => SettingsView::render(frame, content, app),
            Page::About => AboutView::render(frame, content, app),
        }

        Footer::render(frame, footer, app);
    }

    /// Header, page content and footer areas.
    pub fn split(area: Rect) -> (Rect, Rect, Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(1),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        (chunks[0], chunks[1].inner(Margin::new(1, 0)), chunks[2])
    }

    /// Drawable chart area (inside its border) for a terminal of this size.
    pub fn chart_area(terminal: Rect) -> Rect {
        let (_, content, _) = Self::split(terminal);
        DashboardView::areas(content).chart.inner(Margin::new(1, 1))
    }

    pub fn create_two_column_layout(area: Rect, left_percent: u16) -> Vec<Rect> {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(left_percent),
                Constraint::Percentage(100 - left_percent),
            ])
            .split(area)
            .to_vec()
    }
}
