mod styles;

pub use styles::ThemedStyles;

use blockwatch_core::theme::{PointStyle, Rgba, ThemeConfig, ThemeId};
use ratatui::style::Color;

/// Terminal colors for one dashboard theme.
///
/// Every translucent color from the chart configuration is composited over
/// the chart background, since terminals have no alpha channel.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalTheme {
    pub id: ThemeId,
    pub background: Color,
    pub foreground: Color,
    pub foreground_dim: Color,
    pub border: Color,
    pub primary: Color,
    pub secondary: Color,
    pub grid: Color,
    pub axis_title: Color,
    pub legend: Color,
    pub tooltip_background: Color,
    pub tooltip_foreground: Color,
    pub primary_marker: &'static str,
    pub secondary_marker: &'static str,
}

impl TerminalTheme {
    pub fn from_config(config: &ThemeConfig) -> Self {
        let bg = config.container.background_color;
        let scales = &config.options.scales;
        let tooltip = &config.options.plugins.tooltip;
        let tooltip_bg = tooltip.background_color.over(bg);

        Self {
            id: config.theme,
            background: to_color(bg, bg),
            foreground: to_color(config.default_color, bg),
            foreground_dim: to_color(scales.y.ticks.color, bg),
            border: to_color(config.container.border_color, bg),
            primary: to_color(config.primary().border_color, bg),
            secondary: to_color(config.secondary().border_color, bg),
            grid: to_color(scales.y.grid.color, bg),
            axis_title: to_color(scales.y.title.color, bg),
            legend: to_color(config.options.plugins.legend.labels.color, bg),
            tooltip_background: to_color(tooltip_bg, bg),
            tooltip_foreground: to_color(tooltip.title_color, tooltip_bg),
            primary_marker: marker(config.primary().point_style),
            secondary_marker: marker(config.secondary().point_style),
        }
    }

    pub fn success(&self) -> Color {
        Color::Rgb(0x22, 0xC5, 0x5E)
    }

    pub fn error(&self) -> Color {
        Color::Rgb(0xEF, 0x44, 0x44)
    }

    pub fn warning(&self) -> Color {
        Color::Rgb(0xF5, 0x9E, 0x0B)
    }
}

/// Converts a CSS color to a terminal RGB color over `background`.
pub fn to_color(color: Rgba, background: Rgba) -> Color {
    let c = if color.is_opaque() {
        color
    } else {
        color.over(background)
    };
    Color::Rgb(c.r, c.g, c.b)
}

pub fn marker(style: PointStyle) -> &'static str {
    match style {
        PointStyle::Circle => "●",
        PointStyle::RectRot => "◆",
        PointStyle::Triangle => "▲",
    }
}
