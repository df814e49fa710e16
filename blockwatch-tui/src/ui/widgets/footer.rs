use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;
use crate::theme::ThemedStyles;

pub const KEYBINDS: [(&str, &str); 6] = [
    ("q", "Quit"),
    ("1-4", "Page"),
    ("Tab", "Next"),
    ("j/k", "Scroll"),
    ("t", "Theme"),
    ("r", "Refresh"),
];

pub struct Footer;

impl Footer {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let styles = ThemedStyles::new(&app.theme);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);

        let keybind_spans: Vec<Span> = KEYBINDS
            .iter()
            .flat_map(|(key, desc)| {
                vec![
                    Span::styled(format!(" {key}"), styles.accent_bold()),
                    Span::styled(format!(":{desc} "), styles.dimmed()),
                ]
            })
            .collect();
        frame.render_widget(Paragraph::new(Line::from(keybind_spans)), chunks[0]);

        let status = app.status_message.as_deref().unwrap_or("Ready");
        let status_style = if app.loading_state.is_error() {
            styles.blocked(true)
        } else {
            styles.dimmed()
        };
        let status_widget = Paragraph::new(Line::from(Span::styled(
            format!("{status} "),
            status_style,
        )))
        .alignment(Alignment::Right);
        frame.render_widget(status_widget, chunks[1]);
    }
}
