use chrono::Utc;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Gauge, Paragraph, Tabs},
    Frame,
};

use blockwatch_core::Page;

use crate::app::App;
use crate::theme::ThemedStyles;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct Header;

impl Header {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let styles = ThemedStyles::new(theme);
        let view = app.session.view();
        let now = Utc::now();

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(area);

        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(24)])
            .split(rows[0]);

        let title = Paragraph::new(Line::from(vec![
            Span::styled(" BLOCKWATCH ", styles.title()),
            Span::styled(format!("v{}", VERSION), styles.dimmed()),
            Span::styled(
                format!("  [{}]", theme.id.display_name()),
                styles.secondary(),
            ),
        ]));
        frame.render_widget(title, top[0]);

        let clock = Paragraph::new(Line::from(vec![
            Span::styled(
                format!("{} ", app.loading_state.indicator()),
                if app.loading_state.is_error() {
                    Style::default().fg(theme.error())
                } else {
                    styles.accent()
                },
            ),
            Span::styled(
                app.session.controller().display().format_time(&now),
                styles.dimmed(),
            ),
            Span::raw(" "),
        ]))
        .alignment(Alignment::Right);
        frame.render_widget(clock, top[1]);

        let mut status = vec![
            Span::styled(" STATUS ", styles.dimmed()),
            Span::styled(
                format!("● {}", view.status().as_str().to_uppercase()),
                styles.status(view.status()),
            ),
            Span::styled("   UPTIME ", styles.dimmed()),
            Span::styled(app.session.uptime(now), styles.accent_bold()),
        ];
        if let Some(backend) = view.backend_uptime() {
            status.push(Span::styled("   SERVER ", styles.dimmed()));
            status.push(Span::styled(backend.to_string(), styles.secondary()));
        }
        if view.health().consecutive_failures > 0 {
            status.push(Span::styled(
                format!("   {} failed refresh(es)", view.health().consecutive_failures),
                Style::default().fg(theme.warning()),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(status)), rows[1]);

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(30), Constraint::Length(26)])
            .split(rows[2]);

        let tab_titles: Vec<Line> = Page::ALL
            .iter()
            .map(|page| {
                let style = if *page == app.page() {
                    styles.accent_bold()
                } else {
                    styles.dimmed()
                };
                Line::from(Span::styled(
                    format!("{} {}", page.index() + 1, page.title()),
                    style,
                ))
            })
            .collect();

        let tabs = Tabs::new(tab_titles)
            .select(app.page().index())
            .highlight_style(styles.accent_bold().add_modifier(Modifier::UNDERLINED))
            .divider(Span::styled(" │ ", styles.dimmed()));
        frame.render_widget(tabs, bottom[0]);

        let percent = app.session.uptime_percentage(now);
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(theme.primary).bg(theme.background))
            .ratio((percent / 100.0).clamp(0.0, 1.0))
            .label(Span::styled(
                format!("HOUR {:.0}%", percent),
                Style::default().fg(theme.foreground),
            ));
        frame.render_widget(gauge, bottom[1]);
    }
}
