//! Axis composition: the single entry point renderers call.
//!
//! Aggregation and normalization produce the axis limits; ticks and the plot
//! region are then derived independently from that same finalized domain.

use std::borrow::Cow;

use crate::config::{AxisConfig, ScaleKind};
use crate::data::{EffectRef, Row};
use crate::domain::{aggregate, Columns};
use crate::ir::{AxisLayout, AxisLimits};
use crate::normalize::normalize;
use crate::region::plot_region;
use crate::ticks::{generate_ticks, tick_target, tick_target_for_width};

/// Everything one axis computation depends on.
#[derive(Debug, Clone, Copy)]
pub struct AxisRequest<'a> {
    pub rows: &'a [Row],
    pub config: &'a AxisConfig,
    pub scale: ScaleKind,
    pub null_value: f64,
    /// Pixel width of the forest column; drives the default tick density.
    pub forest_width: f64,
    /// Marker size in pixels. Only renderers use it.
    pub point_size: f64,
    pub point_col: &'a str,
    pub lower_col: &'a str,
    pub upper_col: &'a str,
    pub effects: &'a [EffectRef],
}

impl<'a> AxisRequest<'a> {
    fn columns(&self) -> Columns<'a> {
        Columns { point: self.point_col, lower: self.lower_col, upper: self.upper_col }
    }
}

/// Aggregate and normalize into the final axis limits.
#[allow(clippy::too_many_arguments)]
pub fn compute_axis_limits(
    rows: &[Row],
    config: &AxisConfig,
    scale: ScaleKind,
    null_value: f64,
    effects: &[EffectRef],
    point_col: &str,
    lower_col: &str,
    upper_col: &str,
) -> AxisLimits {
    let primary = Columns { point: point_col, lower: lower_col, upper: upper_col };
    let raw = aggregate(rows, config, scale, null_value, effects, primary);
    normalize(raw, config, scale, null_value, tick_target(config))
}

/// Limits, plot region and ticks for one forest column.
///
/// `axis_limits` equal [`compute_axis_limits`] for the same rows and config;
/// the column width only sets how many ticks are generated inside them. The
/// plot region widens the limits by a fixed fraction, whatever the marker size.
pub fn compute_axis(request: &AxisRequest<'_>) -> AxisLayout {
    let raw = aggregate(
        request.rows,
        request.config,
        request.scale,
        request.null_value,
        request.effects,
        request.columns(),
    );
    let axis_limits = normalize(
        raw,
        request.config,
        request.scale,
        request.null_value,
        tick_target(request.config),
    );

    let target = tick_target_for_width(request.config, request.forest_width);
    let tick_config: Cow<'_, AxisConfig> = if request.config.tick_count == Some(target) {
        Cow::Borrowed(request.config)
    } else {
        Cow::Owned(AxisConfig { tick_count: Some(target), ..request.config.clone() })
    };
    let ticks = generate_ticks(axis_limits, &tick_config, request.scale, request.null_value);
    let plot_region = plot_region(axis_limits, request.scale, request.config.marker_margin);

    tracing::debug!(
        rows = request.rows.len(),
        effects = request.effects.len(),
        forest_width = request.forest_width,
        target,
        ?axis_limits,
        ?plot_region,
        ticks = ticks.len(),
        "computed axis"
    );

    AxisLayout { axis_limits, plot_region, ticks }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(point: f64, lower: f64, upper: f64) -> Row {
        Row::new("r", "Study")
            .with_number("est", point)
            .with_number("lo", lower)
            .with_number("hi", upper)
    }

    fn request<'a>(rows: &'a [Row], config: &'a AxisConfig, scale: ScaleKind) -> AxisRequest<'a> {
        AxisRequest {
            rows,
            config,
            scale,
            null_value: scale.default_null_value(),
            forest_width: 400.0,
            point_size: 6.0,
            point_col: "est",
            lower_col: "lo",
            upper_col: "hi",
            effects: &[],
        }
    }

    #[test]
    fn test_empty_rows_use_fallback() {
        let config = AxisConfig::default();
        let linear = compute_axis_limits(&[], &config, ScaleKind::Linear, 0.0, &[], "est", "lo", "hi");
        assert_eq!(linear, [-1.0, 1.0]);
        let log = compute_axis_limits(&[], &config, ScaleKind::Log, 1.0, &[], "est", "lo", "hi");
        assert_eq!(log, [0.1, 10.0]);
    }

    #[test]
    fn test_extreme_interval_is_clipped() {
        let rows = vec![row(1.0, -10.0, 12.0)];
        let limits = compute_axis_limits(
            &rows,
            &AxisConfig::default(),
            ScaleKind::Linear,
            0.0,
            &[],
            "est",
            "lo",
            "hi",
        );
        assert!(limits[0] > -10.0, "{:?}", limits);
        assert!(limits[1] < 12.0, "{:?}", limits);
        assert!(limits[0] <= 0.0 && limits[1] >= 1.0);
    }

    #[test]
    fn test_explicit_range_is_exact() {
        let rows = vec![row(1.0, 0.5, 1.5)];
        let config = AxisConfig { range_min: Some(-0.37), range_max: Some(4.2), ..Default::default() };
        let layout = compute_axis(&request(&rows, &config, ScaleKind::Linear));
        assert_eq!(layout.axis_limits, [-0.37, 4.2]);
        assert!(layout.plot_region[0] <= -0.37 && layout.plot_region[1] >= 4.2);
    }

    #[test]
    fn test_log_layout() {
        let rows = vec![row(0.8, 0.5, 1.2), row(1.6, 1.1, 2.4)];
        let layout = compute_axis(&request(&rows, &AxisConfig::default(), ScaleKind::Log));
        let [min, max] = layout.axis_limits;
        assert!(min > 0.0 && min <= 0.5);
        assert!(max >= 2.4);
        assert!(layout.ticks.contains(&1.0));
        assert!(layout.ticks.iter().all(|t| *t >= min && *t <= max));
        assert!(layout.plot_region[0] > 0.0);
    }

    #[test]
    fn test_null_tick_present() {
        let rows = vec![row(0.3, 0.05, 0.6)];
        let layout = compute_axis(&request(&rows, &AxisConfig::default(), ScaleKind::Linear));
        assert!(layout.ticks.contains(&0.0), "{:?}", layout.ticks);
    }

    #[test]
    fn test_explicit_ticks_filtered() {
        let rows = vec![row(1.0, 0.5, 1.5)];
        let config = AxisConfig {
            range_min: Some(0.0),
            range_max: Some(2.0),
            tick_values: Some(vec![3.0, 1.0, -1.0, 0.5]),
            ..Default::default()
        };
        let layout = compute_axis(&request(&rows, &config, ScaleKind::Linear));
        assert_eq!(layout.ticks, vec![0.5, 1.0]);
    }

    #[test]
    fn test_narrow_column_gets_fewer_ticks() {
        let rows = vec![row(2.0, -3.0, 9.0), row(5.0, 1.0, 8.0)];
        let config = AxisConfig::default();
        let wide = compute_axis(&AxisRequest { forest_width: 560.0, ..request(&rows, &config, ScaleKind::Linear) });
        let narrow = compute_axis(&AxisRequest { forest_width: 160.0, ..request(&rows, &config, ScaleKind::Linear) });
        assert!(narrow.ticks.len() <= wide.ticks.len());
    }

    #[test]
    fn test_limits_do_not_depend_on_width() {
        let rows = vec![row(2.0, -3.0, 9.0), row(5.0, 1.0, 8.0), row(13.7, 11.0, 17.3)];
        let config = AxisConfig::default();
        let limits = compute_axis_limits(&rows, &config, ScaleKind::Linear, 0.0, &[], "est", "lo", "hi");
        assert_eq!(limits, [-5.0, 20.0]);
        for width in [80.0, 160.0, 400.0, 560.0, 2000.0] {
            let layout = compute_axis(&AxisRequest { forest_width: width, ..request(&rows, &config, ScaleKind::Linear) });
            assert_eq!(layout.axis_limits, limits, "width {}", width);
        }
    }

    #[test]
    fn test_idempotent() {
        let rows = vec![row(0.4, -0.2, 1.3), row(-0.1, -0.9, 0.4)];
        let config = AxisConfig::default();
        let req = request(&rows, &config, ScaleKind::Linear);
        let a = compute_axis(&req);
        let b = compute_axis(&req);
        assert_eq!(a, b);
        for (x, y) in a.ticks.iter().zip(&b.ticks) {
            assert_eq!(x.to_bits(), y.to_bits());
        }
    }

    #[test]
    fn test_layout_serializes_camel_case() {
        let layout = compute_axis(&request(&[], &AxisConfig::default(), ScaleKind::Linear));
        let json = serde_json::to_value(&layout).unwrap();
        assert!(json.get("axisLimits").is_some());
        assert!(json.get("plotRegion").is_some());
        assert!(json.get("ticks").is_some());
    }
}
