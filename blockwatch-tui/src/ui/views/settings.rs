use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::theme::ThemedStyles;

pub struct SettingsView;

impl SettingsView {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let styles = ThemedStyles::new(&app.theme);

        let lines: Vec<Line> = Self::entries(app)
            .into_iter()
            .map(|(key, value)| {
                if value.is_empty() {
                    Line::from(Span::styled(key, styles.table_header()))
                } else {
                    Line::from(vec![
                        Span::styled(format!("  {key:<22}"), styles.dimmed()),
                        Span::styled(value, styles.accent()),
                    ])
                }
            })
            .collect();

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .title(Span::styled(" Settings ", styles.title()))
                .borders(Borders::ALL)
                .border_style(styles.border()),
        );
        frame.render_widget(paragraph, area);
    }

    /// Effective configuration as label/value pairs; an empty value marks a
    /// section heading.
    pub fn entries(app: &App) -> Vec<(String, String)> {
        let config = &app.config;
        let session = &app.session;
        let retry = session.controller().retry();

        let pair = |k: &str, v: String| (k.to_string(), v);
        vec![
            pair("API", String::new()),
            pair("base url", config.base_url().to_string()),
            pair("request timeout", format!("{} ms", config.api.request_timeout_ms)),
            pair("connect timeout", format!("{} ms", config.api.connect_timeout_ms)),
            pair("Polling", String::new()),
            pair("refresh interval", format!("{} ms", config.polling.refresh_interval_ms)),
            pair("tick interval", format!("{} ms", config.polling.tick_interval_ms)),
            pair("retry attempts", retry.max_attempts.to_string()),
            pair("Display", String::new()),
            pair("theme", session.view().theme().display_name().to_string()),
            pair("theme file", session.theme_store().path().display().to_string()),
            pair("time format", config.display.time_format.clone()),
            pair("timestamps in UTC", config.display.utc.to_string()),
            pair("Logging", String::new()),
            pair("level", config.log_level().to_string()),
            pair("log file", config.log_file().display().to_string()),
        ]
    }
}
