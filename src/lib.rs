// Library exports for forestaxis

pub mod config;
pub mod data;
pub mod parser;
pub mod runtime;

// Axis engine
pub mod axis;
pub mod domain;
pub mod normalize;
pub mod region;
pub mod ticks;

// Adapters
pub mod compiler;
pub mod graph;
pub mod ir;
pub mod resolve;
pub mod scale;
pub mod theme;
pub mod transform;
pub mod view;

pub use axis::{compute_axis, compute_axis_limits, AxisRequest};
pub use config::{AxisConfig, GridlineStyle, PlotConfig, ScaleKind};
pub use data::{EffectRef, MetaValue, PlotData, Row};
pub use ir::{AxisLayout, AxisLimits, PlotRegion, Ticks};
pub use ticks::generate_ticks;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputFormat {
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "png")]
    #[default]
    Png,
    #[serde(rename = "svg")]
    Svg,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "png" => Ok(OutputFormat::Png),
            "svg" => Ok(OutputFormat::Svg),
            other => Err(anyhow::anyhow!("Unknown output format '{}' (expected json, png or svg)", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Png => write!(f, "png"),
            OutputFormat::Svg => write!(f, "svg"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default, rename = "type", alias = "format")]
    pub format: OutputFormat,
    /// Marker size in pixels.
    #[serde(default = "default_point_size")]
    pub point_size: f64,
    /// Colour of the primary interval and marker.
    #[serde(default)]
    pub color: Option<String>,
}

fn default_width() -> u32 { 800 }
fn default_height() -> u32 { 600 }
fn default_point_size() -> f64 { 6.0 }

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            format: OutputFormat::Png,
            point_size: default_point_size(),
            color: None,
        }
    }
}
