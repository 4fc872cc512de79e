//! Resolved exporter styles.
//!
//! Every field is concrete; the compiler never has to fall back to a default.

use crate::config::{AxisConfig, GridlineStyle};
use crate::RenderOptions;

pub type Rgb = (u8, u8, u8);

/// Line type variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineType {
    Solid,
    Dashed,
    Dotted,
}

impl LineType {
    /// `(on, off)` lengths in pixels, `None` for a continuous stroke.
    pub fn dash_pattern(self) -> Option<(f64, f64)> {
        match self {
            LineType::Solid => None,
            LineType::Dashed => Some((6.0, 4.0)),
            LineType::Dotted => Some((1.5, 3.0)),
        }
    }
}

/// Fully resolved line style ready for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLine {
    pub color: Rgb,
    pub width: f64,
    pub line_type: LineType,
}

impl Default for ResolvedLine {
    fn default() -> Self {
        ResolvedLine { color: (0, 0, 0), width: 1.0, line_type: LineType::Solid }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForestTheme {
    pub background: Rgb,
    pub text_color: Rgb,
    pub text_size: f64,
    pub axis_line: ResolvedLine,
    /// `None` when gridlines are off.
    pub gridline: Option<ResolvedLine>,
    pub null_line: ResolvedLine,
    pub interval_width: f64,
    /// Colour per series: the primary columns first, then each effect in order.
    pub series_colors: Vec<Rgb>,
}

const DEFAULT_SERIES: [Rgb; 5] = [
    (33, 33, 33),
    (31, 119, 180),
    (214, 39, 40),
    (44, 160, 44),
    (148, 103, 189),
];

impl ForestTheme {
    /// Colour for series `index`, cycling through the palette.
    pub fn series_color(&self, index: usize) -> Rgb {
        if self.series_colors.is_empty() {
            return (0, 0, 0);
        }
        self.series_colors[index % self.series_colors.len()]
    }
}

/// Resolve exporter styles from the axis config and render options.
pub fn resolve_theme(config: &AxisConfig, options: &RenderOptions) -> ForestTheme {
    let gridline = match (config.gridlines, config.gridline_style) {
        (false, _) | (_, GridlineStyle::None) => None,
        (true, GridlineStyle::Dashed) => Some(ResolvedLine {
            color: (190, 190, 190),
            width: 1.0,
            line_type: LineType::Dashed,
        }),
        (true, GridlineStyle::Dotted) => Some(ResolvedLine {
            color: (170, 170, 170),
            width: 1.0,
            line_type: LineType::Dotted,
        }),
    };

    let mut series_colors = DEFAULT_SERIES.to_vec();
    if let Some(color) = options.color.as_deref() {
        match parse_color(color) {
            Some(c) => series_colors[0] = c,
            None => tracing::warn!(color, "unrecognised colour, keeping default"),
        }
    }

    ForestTheme {
        background: (255, 255, 255),
        text_color: (0, 0, 0),
        text_size: 12.0,
        axis_line: ResolvedLine::default(),
        gridline,
        null_line: ResolvedLine { color: (90, 90, 90), width: 1.0, line_type: LineType::Solid },
        interval_width: 1.5,
        series_colors,
    }
}

/// Parse a color string, supporting hex (#RRGGBB, #RGB) and a few names
pub fn parse_color(color_str: &str) -> Option<Rgb> {
    let color_str = color_str.trim();

    if color_str.starts_with('#') {
        return parse_hex_color(color_str);
    }

    match color_str.to_lowercase().as_str() {
        "white" => Some((255, 255, 255)),
        "black" => Some((0, 0, 0)),
        "red" => Some((255, 0, 0)),
        "green" => Some((0, 128, 0)),
        "blue" => Some((0, 0, 255)),
        "orange" => Some((255, 165, 0)),
        "purple" => Some((128, 0, 128)),
        "gray" | "grey" => Some((128, 128, 128)),
        "darkgray" | "darkgrey" => Some((64, 64, 64)),
        "lightgray" | "lightgrey" => Some((192, 192, 192)),
        // gray0 = black, gray100 = white
        s if s.starts_with("gray") || s.starts_with("grey") => {
            let n = s[4..].parse::<u8>().ok().filter(|n| *n <= 100)?;
            let v = (n as f64 * 2.55).round() as u8;
            Some((v, v, v))
        }
        _ => None,
    }
}

fn parse_hex_color(hex: &str) -> Option<Rgb> {
    let hex = hex.trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some((r, g, b))
        }
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
            Some((r, g, b))
        }
        _ => None,
    }
}
