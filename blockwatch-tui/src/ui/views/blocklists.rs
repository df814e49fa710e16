use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::theme::ThemedStyles;
use crate::ui::layout::MainLayout;
use crate::ui::widgets::format_count;

/// Read-only view of the server's blocklists, whitelist and regex rules.
pub struct BlocklistsView;

impl BlocklistsView {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let styles = ThemedStyles::new(&app.theme);
        let view = app.session.view();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(5)])
            .split(area);

        let summary = match (view.blocklists(), view.blocklists_error()) {
            (_, Some(error)) => Line::from(Span::styled(
                format!(" Could not load filter configuration: {error}"),
                styles.blocked(true),
            )),
            (Some(overview), None) => Line::from(vec![
                Span::styled(" Lists ", styles.dimmed()),
                Span::styled(overview.lists.len().to_string(), styles.accent_bold()),
                Span::styled("   Domains ", styles.dimmed()),
                Span::styled(format_count(overview.total_domains()), styles.accent_bold()),
                Span::styled("   Whitelisted ", styles.dimmed()),
                Span::styled(overview.whitelist.len().to_string(), styles.accent_bold()),
                Span::styled("   Regex rules ", styles.dimmed()),
                Span::styled(overview.regex.len().to_string(), styles.accent_bold()),
            ]),
            (None, None) => Line::from(Span::styled(" Loading...", styles.dimmed())),
        };
        frame.render_widget(Paragraph::new(summary), chunks[0]);

        let Some(overview) = view.blocklists() else {
            let placeholder = Paragraph::new("No filter configuration loaded")
                .style(styles.dimmed())
                .alignment(Alignment::Center)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(styles.border()),
                );
            frame.render_widget(placeholder, chunks[1]);
            return;
        };

        let columns = MainLayout::create_two_column_layout(chunks[1], 50);
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(columns[1]);

        let rows: Vec<Row> = overview
            .lists
            .iter()
            .map(|list| {
                Row::new(vec![
                    list.name.clone(),
                    format_count(list.domains),
                    format_count(list.blocks),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Min(16),
                Constraint::Length(10),
                Constraint::Length(10),
            ],
        )
        .header(Row::new(vec!["LIST", "DOMAINS", "BLOCKS"]).style(styles.table_header()))
        .block(
            Block::default()
                .title(Span::styled(" Blocklists ", styles.title()))
                .borders(Borders::ALL)
                .border_style(styles.border()),
        );
        let mut state = TableState::default().with_offset(app.scroll.min(overview.lists.len()));
        frame.render_stateful_widget(table, columns[0], &mut state);

        Self::render_list(frame, right[0], &styles, " Whitelist ", &overview.whitelist, app.scroll);
        Self::render_list(frame, right[1], &styles, " Regex ", &overview.regex, app.scroll);
    }

    fn render_list(
        frame: &mut Frame,
        area: Rect,
        styles: &ThemedStyles,
        title: &str,
        entries: &[String],
        scroll: usize,
    ) {
        let items: Vec<ListItem> = entries
            .iter()
            .skip(scroll.min(entries.len()))
            .map(|entry| ListItem::new(entry.as_str()))
            .collect();

        let list = List::new(items).block(
            Block::default()
                .title(Span::styled(title.to_string(), styles.title()))
                .borders(Borders::ALL)
                .border_style(styles.border()),
        );
        frame.render_widget(list, area);
    }
}
