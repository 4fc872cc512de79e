//! Plot region: the drawable span around the axis limits.

use crate::config::ScaleKind;
use crate::domain::span_floor;
use crate::ir::{AxisLimits, PlotRegion};

/// Share of the axis span added on each side when a marker margin is requested.
pub const MARKER_MARGIN_FRACTION: f64 = 0.05;

/// Expand the limits outward (additively on linear, multiplicatively on log)
/// so markers drawn at the domain edges are not cut off.
pub fn plot_region(limits: AxisLimits, scale: ScaleKind, marker_margin: bool) -> PlotRegion {
    let [min, max] = limits;
    if !marker_margin {
        return limits;
    }

    let region = match scale {
        ScaleKind::Linear => {
            let span = max - min;
            let basis = if span > 0.0 { span } else { span_floor(scale, min, max) };
            let pad = basis * MARKER_MARGIN_FRACTION;
            [min - pad, max + pad]
        }
        ScaleKind::Log => {
            let log_span = if max > min { (max / min).ln() } else { span_floor(scale, min, max) };
            let factor = (log_span * MARKER_MARGIN_FRACTION).exp();
            [min / factor, max * factor]
        }
    };

    // Never narrower than the limits, whatever the float rounding did.
    [region[0].min(min), region[1].max(max)]
}
