use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::theme::ThemedStyles;
use crate::ui::widgets::{KEYBINDS, VERSION};

pub struct AboutView;

impl AboutView {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let styles = ThemedStyles::new(&app.theme);

        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled("BLOCKWATCH", styles.title())),
            Line::from(Span::styled(format!("version {VERSION}"), styles.dimmed())),
            Line::from(""),
            Line::from(Span::styled(
                "Live monitor for a DNS filtering server",
                styles.secondary(),
            )),
            Line::from(""),
        ];
        lines.extend(KEYBINDS.iter().map(|(key, desc)| {
            Line::from(vec![
                Span::styled(format!("{key:>6}  "), styles.accent_bold()),
                Span::styled(format!("{desc:<8}"), styles.dimmed()),
            ])
        }));

        let paragraph = Paragraph::new(lines).alignment(Alignment::Center).block(
            Block::default()
                .title(Span::styled(" About ", styles.title()))
                .borders(Borders::ALL)
                .border_style(styles.border()),
        );
        frame.render_widget(paragraph, area);
    }
}
