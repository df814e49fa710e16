//! The chart option tree derived from a [`ThemeId`].
//!
//! A [`ThemeConfig`] is a plain value: building it twice for the same theme
//! yields equal configs. Gradients are kept as [`GradientSpec`]s here and
//! only become drawable once the chart renderer binds them to a context.

use serde::Serialize;

use super::palette::{palette, PointStyle, Rgba, ThemePalette};
use super::ThemeId;

/// Vertical extent of the fill gradients, in surface pixels.
pub const GRADIENT_HEIGHT: f32 = 300.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorStop {
    pub offset: f32,
    pub color: Rgba,
}

/// A linear gradient that is not yet bound to any drawing context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradientSpec {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    pub stops: Vec<ColorStop>,
}

impl GradientSpec {
    pub fn vertical(top: Rgba, bottom: Rgba) -> Self {
        Self {
            x0: 0.0,
            y0: 0.0,
            x1: 0.0,
            y1: GRADIENT_HEIGHT,
            stops: vec![
                ColorStop {
                    offset: 0.0,
                    color: top,
                },
                ColorStop {
                    offset: 1.0,
                    color: bottom,
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Normal,
    Bold,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FontSpec {
    pub family: &'static str,
    pub size: u8,
    pub weight: FontWeight,
}

impl FontSpec {
    fn new(family: &'static str, size: u8) -> Self {
        Self {
            family,
            size,
            weight: FontWeight::Normal,
        }
    }

    fn bold(mut self) -> Self {
        self.weight = FontWeight::Bold;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetStyle {
    pub label: &'static str,
    pub border_color: Rgba,
    pub fill: GradientSpec,
    pub border_width: u8,
    pub border_dash: Vec<u8>,
    pub point_background_color: Rgba,
    pub point_border_color: Rgba,
    pub point_radius: u8,
    pub point_hover_radius: u8,
    pub point_style: PointStyle,
    pub filled: bool,
    pub tension: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Animation {
    pub duration_ms: u32,
    pub easing: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendLabels {
    pub box_width: u8,
    pub use_point_style: bool,
    pub point_style: PointStyle,
    pub padding: u8,
    pub font: FontSpec,
    pub color: Rgba,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub position: &'static str,
    pub labels: LegendLabels,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tooltip {
    pub background_color: Rgba,
    pub title_font: FontSpec,
    pub body_font: FontSpec,
    pub border_color: Rgba,
    pub border_width: u8,
    pub title_color: Rgba,
    pub body_color: Rgba,
    pub padding: u8,
    pub box_padding: u8,
    pub display_colors: bool,
    pub title_prefix: &'static str,
}

impl Tooltip {
    /// Title line shown for the hovered x-axis label.
    pub fn title_for(&self, label: &str) -> String {
        format!("{}{}", self.title_prefix, label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plugins {
    pub legend: Legend,
    pub tooltip: Tooltip,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ticks {
    pub font: FontSpec,
    pub color: Rgba,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Grid {
    pub color: Rgba,
    pub draw_border: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTitle {
    pub display: bool,
    pub text: &'static str,
    pub font: FontSpec,
    pub color: Rgba,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Axis {
    pub begin_at_zero: bool,
    pub ticks: Ticks,
    pub grid: Grid,
    pub title: AxisTitle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scales {
    pub x: Axis,
    pub y: Axis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineElement {
    pub border_width: u8,
    pub border_cap_style: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointElement {
    pub hit_radius: u8,
    pub hover_radius: u8,
    pub hover_border_width: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Elements {
    pub line: LineElement,
    pub point: PointElement,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub responsive: bool,
    pub maintain_aspect_ratio: bool,
    pub animation: Animation,
    pub plugins: Plugins,
    pub scales: Scales,
    pub elements: Elements,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerStyle {
    pub background_color: Rgba,
    pub border_width: u8,
    pub border_color: Rgba,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeConfig {
    pub theme: ThemeId,
    pub default_color: Rgba,
    pub default_font: &'static str,
    pub datasets: [DatasetStyle; 2],
    pub options: ChartOptions,
    pub container: ContainerStyle,
}

impl ThemeConfig {
    pub fn primary(&self) -> &DatasetStyle {
        &self.datasets[0]
    }

    pub fn secondary(&self) -> &DatasetStyle {
        &self.datasets[1]
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Builds the full visual configuration for `theme`.
pub fn build(theme: ThemeId) -> ThemeConfig {
    let p = palette(theme);

    ThemeConfig {
        theme,
        default_color: p.default_text,
        default_font: p.body_font,
        datasets: [
            DatasetStyle {
                label: p.primary_label,
                border_color: p.primary,
                fill: GradientSpec::vertical(p.primary_fill[0], p.primary_fill[1]),
                border_width: 3,
                border_dash: Vec::new(),
                point_background_color: p.primary,
                point_border_color: p.point_border,
                point_radius: 6,
                point_hover_radius: 8,
                point_style: p.primary_point,
                filled: true,
                tension: 0.2,
            },
            DatasetStyle {
                label: p.secondary_label,
                border_color: p.secondary,
                fill: GradientSpec::vertical(p.secondary_fill[0], p.secondary_fill[1]),
                border_width: 2,
                border_dash: vec![5, 5],
                point_background_color: p.secondary,
                point_border_color: p.point_border,
                point_radius: 6,
                point_hover_radius: 8,
                point_style: p.secondary_point,
                filled: true,
                tension: 0.2,
            },
        ],
        options: ChartOptions {
            responsive: true,
            maintain_aspect_ratio: false,
            animation: Animation {
                duration_ms: 1500,
                easing: "easeOutQuart",
            },
            plugins: Plugins {
                legend: Legend {
                    position: "top",
                    labels: LegendLabels {
                        box_width: 15,
                        use_point_style: true,
                        point_style: p.legend_point,
                        padding: 20,
                        font: FontSpec::new(p.body_font, 12),
                        color: p.legend_text,
                    },
                },
                tooltip: Tooltip {
                    background_color: p.tooltip_background,
                    title_font: FontSpec::new(p.title_font, 14).bold(),
                    body_font: FontSpec::new(p.body_font, 12),
                    border_color: p.tooltip_border,
                    border_width: 2,
                    title_color: p.tooltip_text,
                    body_color: p.tooltip_text,
                    padding: 12,
                    box_padding: 5,
                    display_colors: true,
                    title_prefix: p.tooltip_prefix,
                },
            },
            scales: Scales {
                x: axis(p, p.grid_x, p.x_title, false),
                y: axis(p, p.grid_y, p.y_title, true),
            },
            elements: Elements {
                line: LineElement {
                    border_width: 3,
                    border_cap_style: "round",
                },
                point: PointElement {
                    hit_radius: 10,
                    hover_radius: 8,
                    hover_border_width: 2,
                },
            },
        },
        container: ContainerStyle {
            background_color: p.chart_background,
            border_width: 1,
            border_color: p.container_border,
        },
    }
}

fn axis(p: &ThemePalette, grid: Rgba, title: &'static str, begin_at_zero: bool) -> Axis {
    Axis {
        begin_at_zero,
        ticks: Ticks {
            font: FontSpec::new(p.body_font, 10),
            color: p.ticks,
        },
        grid: Grid {
            color: grid,
            draw_border: false,
        },
        title: AxisTitle {
            display: true,
            text: title,
            font: FontSpec::new(p.body_font, 10).bold(),
            color: p.axis_title,
        },
    }
}
