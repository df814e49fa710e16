use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::theme::ThemedStyles;

/// A bordered card with one headline number and an optional detail line.
pub struct MetricCard;

impl MetricCard {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        styles: &ThemedStyles,
        title: &str,
        value: u64,
        detail: Option<String>,
    ) {
        let block = Block::default()
            .title(Span::styled(format!(" {title} "), styles.dimmed()))
            .borders(Borders::ALL)
            .border_style(styles.border());

        let mut lines = vec![Line::from(Span::styled(
            format_count(value),
            styles.accent_bold(),
        ))];
        if let Some(detail) = detail {
            lines.push(Line::from(Span::styled(detail, styles.secondary())));
        }

        let card = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(card, area);
    }
}

/// Thousands-separated integer, e.g. `12,345`.
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1,000");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }
}
