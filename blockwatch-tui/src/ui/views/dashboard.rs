use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Cell, Chart, Dataset, GraphType, LegendPosition, Paragraph, Row,
        Table, TableState,
    },
    Frame,
};

use blockwatch_core::ChartInstance;

use crate::app::App;
use crate::theme::{TerminalTheme, ThemedStyles};
use crate::ui::layout::MainLayout;
use crate::ui::widgets::{format_count, MetricCard};

pub struct DashboardAreas {
    pub cards: Rect,
    pub chart: Rect,
    pub tables: Rect,
}

pub struct DashboardView;

impl DashboardView {
    pub fn areas(area: Rect) -> DashboardAreas {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(10),
                Constraint::Length(12),
            ])
            .split(area);

        DashboardAreas {
            cards: chunks[0],
            chart: chunks[1],
            tables: chunks[2],
        }
    }

    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let areas = Self::areas(area);
        let styles = ThemedStyles::new(&app.theme);

        Self::render_cards(frame, areas.cards, app, &styles);
        Self::render_chart(frame, areas.chart, app, &styles);

        let columns = MainLayout::create_two_column_layout(areas.tables, 55);
        Self::render_queries(frame, columns[0], app, &styles);
        Self::render_clients(frame, columns[1], app, &styles);
    }

    fn render_cards(frame: &mut Frame, area: Rect, app: &App, styles: &ThemedStyles) {
        let metrics = app.session.view().metrics();
        let cards = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 4); 4])
            .split(area);

        MetricCard::render(frame, cards[0], styles, "Total Queries", metrics.total_queries, None);
        MetricCard::render(
            frame,
            cards[1],
            styles,
            "Blocked",
            metrics.blocked_queries,
            Some(format!("{:.1}% blocked", metrics.block_rate())),
        );
        MetricCard::render(frame, cards[2], styles, "Cache Hits", metrics.cache_hits, None);
        MetricCard::render(
            frame,
            cards[3],
            styles,
            "Cache Misses",
            metrics.cache_misses,
            Some(format!("{:.1}% hit rate", metrics.cache_hit_rate())),
        );
    }

    fn render_chart(frame: &mut Frame, area: Rect, app: &App, styles: &ThemedStyles) {
        let theme = &app.theme;
        let chart = app.session.chart();

        let Some(instance) = chart.instance().filter(|_| chart.surface().is_available()) else {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(styles.border());
            let message = Paragraph::new(Line::from(Span::styled(
                "Chart unavailable: enlarge the terminal",
                styles.dimmed(),
            )))
            .alignment(Alignment::Center)
            .block(block);
            frame.render_widget(message, area);
            return;
        };

        let config = instance.config();
        let scales = &config.options.scales;

        let primary = points(&instance.primary().data);
        let secondary = points(&instance.secondary().data);
        let (x_max, y_max) = bounds(instance);

        let datasets = vec![
            Dataset::default()
                .name(format!("{} {}", theme.primary_marker, instance.primary().style.label))
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(theme.primary))
                .data(&primary),
            Dataset::default()
                .name(format!(
                    "{} {}",
                    theme.secondary_marker,
                    instance.secondary().style.label
                ))
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(theme.secondary))
                .data(&secondary),
        ];

        let block = Block::default()
            .title(Span::styled(" Hourly Activity ", styles.title()))
            .title_bottom(tooltip_line(instance, theme))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border))
            .style(Style::default().bg(theme.background));

        let widget = Chart::new(datasets)
            .block(block)
            .legend_position(Some(LegendPosition::TopRight))
            .hidden_legend_constraints((Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)))
            .style(Style::default().fg(theme.legend))
            .x_axis(
                Axis::default()
                    .title(Span::styled(scales.x.title.text, styles.table_header()))
                    .style(Style::default().fg(theme.grid))
                    .bounds([0.0, x_max])
                    .labels(x_labels(instance.labels(), theme)),
            )
            .y_axis(
                Axis::default()
                    .title(Span::styled(scales.y.title.text, styles.table_header()))
                    .style(Style::default().fg(theme.grid))
                    .bounds([0.0, y_max])
                    .labels(vec![
                        Span::styled("0", styles.dimmed()),
                        Span::styled(format_count(y_max as u64 / 2), styles.dimmed()),
                        Span::styled(format_count(y_max as u64), styles.dimmed()),
                    ]),
            );

        frame.render_widget(widget, area);
    }

    fn render_queries(frame: &mut Frame, area: Rect, app: &App, styles: &ThemedStyles) {
        let queries = app.session.view().queries();

        let rows: Vec<Row> = queries
            .iter()
            .map(|q| {
                Row::new(vec![
                    Cell::from(Span::styled(q.time.clone(), styles.dimmed())),
                    Cell::from(q.domain.clone()),
                    Cell::from(Span::styled(
                        if q.blocked { "BLOCKED" } else { "ALLOWED" },
                        styles.blocked(q.blocked),
                    )),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(10),
                Constraint::Min(16),
                Constraint::Length(8),
            ],
        )
        .header(Row::new(vec!["TIME", "DOMAIN", "STATUS"]).style(styles.table_header()))
        .block(
            Block::default()
                .title(Span::styled(" Recent Queries ", styles.title()))
                .borders(Borders::ALL)
                .border_style(styles.border()),
        );

        let mut state = TableState::default().with_offset(app.scroll.min(queries.len()));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_clients(frame: &mut Frame, area: Rect, app: &App, styles: &ThemedStyles) {
        let clients = app.session.view().clients();

        let rows: Vec<Row> = clients
            .iter()
            .map(|c| {
                Row::new(vec![
                    Cell::from(c.ip.clone()),
                    Cell::from(format_count(c.total_queries)),
                    Cell::from(Span::styled(
                        format_count(c.blocked_queries),
                        styles.blocked(c.blocked_queries > 0),
                    )),
                    Cell::from(Span::styled(c.last_seen_display.clone(), styles.dimmed())),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Min(15),
                Constraint::Length(8),
                Constraint::Length(8),
                Constraint::Length(19),
            ],
        )
        .header(
            Row::new(vec!["CLIENT", "TOTAL", "BLOCKED", "LAST SEEN"]).style(styles.table_header()),
        )
        .block(
            Block::default()
                .title(Span::styled(" Clients ", styles.title()))
                .borders(Borders::ALL)
                .border_style(styles.border()),
        );

        let mut state = TableState::default().with_offset(app.scroll.min(clients.len()));
        frame.render_stateful_widget(table, area, &mut state);
    }
}

fn points(data: &[u64]) -> Vec<(f64, f64)> {
    data.iter()
        .enumerate()
        .map(|(i, v)| (i as f64, *v as f64))
        .collect()
}

/// X runs over the label indices; Y starts at zero with headroom above the
/// peak.
fn bounds(instance: &ChartInstance) -> (f64, f64) {
    let x_max = instance.labels().len().saturating_sub(1).max(1) as f64;
    let peak = instance.peak();
    let y_max = (peak + peak / 10).max(1) as f64;
    (x_max, y_max)
}

fn x_labels<'a>(labels: &'a [String], theme: &TerminalTheme) -> Vec<Span<'a>> {
    let style = Style::default().fg(theme.foreground_dim);
    match labels {
        [] => Vec::new(),
        [only] => vec![Span::styled(only.as_str(), style)],
        [first, .., last] => {
            let middle = &labels[labels.len() / 2];
            vec![
                Span::styled(first.as_str(), style),
                Span::styled(middle.as_str(), style),
                Span::styled(last.as_str(), style),
            ]
        }
    }
}

/// The tooltip for the most recent point.
fn tooltip_line(instance: &ChartInstance, theme: &TerminalTheme) -> Line<'static> {
    let tooltip = &instance.config().options.plugins.tooltip;
    let Some(label) = instance.labels().last() else {
        return Line::default();
    };
    let a = instance.primary().data.last().copied().unwrap_or(0);
    let b = instance.secondary().data.last().copied().unwrap_or(0);

    Line::from(vec![
        Span::styled(
            format!(" {} ", tooltip.title_for(label)),
            Style::default()
                .fg(theme.tooltip_foreground)
                .bg(theme.tooltip_background),
        ),
        Span::styled(format!(" {} {} ", theme.primary_marker, a), Style::default().fg(theme.primary)),
        Span::styled(format!("{} {} ", theme.secondary_marker, b), Style::default().fg(theme.secondary)),
    ])
}
