use serde::{Deserialize, Serialize};

use crate::theme::LineType;

// =============================================================================
// Phase 1: Axis computation
// =============================================================================

/// Labelled axis domain `[min, max]`.
pub type AxisLimits = [f64; 2];

/// Drawable span `[min, max]`; always contains the axis limits.
pub type PlotRegion = [f64; 2];

/// Ascending, deduplicated tick positions.
pub type Ticks = Vec<f64>;

/// Everything a renderer needs from the axis engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisLayout {
    pub axis_limits: AxisLimits,
    pub plot_region: PlotRegion,
    pub ticks: Ticks,
}

// =============================================================================
// Phase 2: Compilation (Scene Graph)
// =============================================================================

/// A list of primitive drawing commands in pixel space.
/// The exporter backend executes these blindly.
#[derive(Debug, Clone)]
pub struct ForestScene {
    pub width: u32,
    pub height: u32,
    pub background: (u8, u8, u8),
    pub commands: Vec<DrawCommand>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone)]
pub enum DrawCommand {
    DrawLine {
        from: (f64, f64),
        to: (f64, f64),
        color: (u8, u8, u8),
        width: f64,
        line_type: LineType,
    },
    /// Filled square marker centred on `center`, `size` pixels wide.
    DrawMarker {
        center: (f64, f64),
        size: f64,
        color: (u8, u8, u8),
    },
    /// Small triangle showing that an interval continues past the plot region.
    DrawArrow {
        tip: (f64, f64),
        pointing_right: bool,
        size: f64,
        color: (u8, u8, u8),
    },
    DrawText {
        position: (f64, f64),
        text: String,
        size: f64,
        anchor: TextAnchor,
        color: (u8, u8, u8),
    },
}
