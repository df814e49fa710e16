use serde::{Serialize, Serializer};
use std::fmt;

use super::ThemeId;

/// An sRGB color with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xFF) as u8,
            g: ((rgb >> 8) & 0xFF) as u8,
            b: (rgb & 0xFF) as u8,
            a: 1.0,
        }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn is_opaque(&self) -> bool {
        self.a >= 1.0
    }

    /// Composites this color over an opaque background.
    pub fn over(&self, background: Rgba) -> Rgba {
        let a = self.a.clamp(0.0, 1.0);
        let mix = |fg: u8, bg: u8| (fg as f32 * a + bg as f32 * (1.0 - a)).round() as u8;
        Rgba::rgba(
            mix(self.r, background.r),
            mix(self.g, background.g),
            mix(self.b, background.b),
            1.0,
        )
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_opaque() {
            write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
        }
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Marker shape for data points and legend entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PointStyle {
    Circle,
    RectRot,
    Triangle,
}

pub const MONO_FONT: &str = "'B612 Mono', monospace";
pub const SERIF_FONT: &str = "'DM Serif Display', serif";

/// Every per-theme visual parameter. No field is optional, so both themes
/// define all of them.
#[derive(Debug, Clone, PartialEq)]
pub struct ThemePalette {
    pub id: ThemeId,
    pub primary: Rgba,
    pub secondary: Rgba,
    pub chart_background: Rgba,
    pub container_border: Rgba,
    pub primary_fill: [Rgba; 2],
    pub secondary_fill: [Rgba; 2],
    pub default_text: Rgba,
    pub legend_text: Rgba,
    pub legend_point: PointStyle,
    pub body_font: &'static str,
    pub title_font: &'static str,
    pub grid_x: Rgba,
    pub grid_y: Rgba,
    pub ticks: Rgba,
    pub axis_title: Rgba,
    pub tooltip_background: Rgba,
    pub tooltip_border: Rgba,
    pub tooltip_text: Rgba,
    pub tooltip_prefix: &'static str,
    pub x_title: &'static str,
    pub y_title: &'static str,
    pub primary_label: &'static str,
    pub secondary_label: &'static str,
    pub primary_point: PointStyle,
    pub secondary_point: PointStyle,
    pub point_border: Rgba,
}

pub static PALETTES: [ThemePalette; 2] = [
    ThemePalette {
        id: ThemeId::Tva,
        primary: Rgba::hex(0xFF6B00),
        secondary: Rgba::hex(0x794B28),
        chart_background: Rgba::hex(0x1A1512),
        container_border: Rgba::hex(0x794B28),
        primary_fill: [
            Rgba::rgba(255, 107, 0, 0.8),
            Rgba::rgba(255, 139, 40, 0.3),
        ],
        secondary_fill: [
            Rgba::rgba(121, 75, 40, 0.8),
            Rgba::rgba(121, 75, 40, 0.3),
        ],
        default_text: Rgba::hex(0x794B28),
        legend_text: Rgba::hex(0x794B28),
        legend_point: PointStyle::RectRot,
        body_font: MONO_FONT,
        title_font: SERIF_FONT,
        grid_x: Rgba::rgba(121, 75, 40, 0.15),
        grid_y: Rgba::rgba(121, 75, 40, 0.15),
        ticks: Rgba::hex(0xD6BC97),
        axis_title: Rgba::hex(0xD6BC97),
        tooltip_background: Rgba::rgba(214, 188, 151, 0.9),
        tooltip_border: Rgba::hex(0xFF6B00),
        tooltip_text: Rgba::hex(0x251F17),
        tooltip_prefix: "TIMELINE POINT: ",
        x_title: "TEMPORAL COORDINATES",
        y_title: "TIMELINE MAGNITUDE",
        primary_label: "Sacred Timeline",
        secondary_label: "Variant Branches",
        primary_point: PointStyle::RectRot,
        secondary_point: PointStyle::RectRot,
        point_border: Rgba::hex(0x1A1512),
    },
    ThemePalette {
        id: ThemeId::Cockpit,
        primary: Rgba::hex(0x10B981),
        secondary: Rgba::hex(0x38BDF8),
        chart_background: Rgba::hex(0x051826),
        container_border: Rgba::hex(0x38BDF8),
        primary_fill: [
            Rgba::rgba(16, 185, 129, 0.8),
            Rgba::rgba(16, 185, 129, 0.2),
        ],
        secondary_fill: [
            Rgba::rgba(56, 189, 248, 0.8),
            Rgba::rgba(56, 189, 248, 0.2),
        ],
        default_text: Rgba::hex(0xE0F2F1),
        legend_text: Rgba::hex(0xE0F2F1),
        legend_point: PointStyle::RectRot,
        body_font: MONO_FONT,
        title_font: SERIF_FONT,
        grid_x: Rgba::rgba(16, 185, 129, 0.1),
        grid_y: Rgba::rgba(16, 185, 129, 0.1),
        ticks: Rgba::hex(0x10B981),
        axis_title: Rgba::hex(0xE0F2F1),
        tooltip_background: Rgba::rgba(16, 185, 129, 0.8),
        tooltip_border: Rgba::hex(0x10B981),
        tooltip_text: Rgba::hex(0xE0F2F1),
        tooltip_prefix: "SIGNAL DATA: ",
        x_title: "SURVEILLANCE INTERVAL",
        y_title: "SIGNAL STRENGTH",
        primary_label: "Primary Signals",
        secondary_label: "Secondary Signals",
        primary_point: PointStyle::Circle,
        secondary_point: PointStyle::Triangle,
        point_border: Rgba::hex(0x0A0E17),
    },
];

pub fn palette(theme: ThemeId) -> &'static ThemePalette {
    match theme {
        ThemeId::Tva => &PALETTES[0],
        ThemeId::Cockpit => &PALETTES[1],
    }
}
