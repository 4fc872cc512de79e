//! Interactive adapter: keeps an axis layout in sync with the forest column
//! width and turns it into pixel positions for gridlines and labels.

use crate::axis::{compute_axis, AxisRequest};
use crate::config::{AxisConfig, GridlineStyle, ScaleKind};
use crate::data::{EffectRef, Row};
use crate::ir::AxisLayout;
use crate::scale::{prune_ticks, tick_marks, PixelScale, TickMark};

/// What a renderer draws for one forest column at one width.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisFrame {
    pub width: f64,
    /// Canonical engine output, untouched by pruning.
    pub layout: AxisLayout,
    pub ticks: Vec<TickMark>,
    /// Gridline style, `None` when gridlines are switched off.
    pub gridlines: Option<GridlineStyle>,
    /// Pixel position of the reference line when it lies inside the region.
    pub null_x: Option<f64>,
}

/// A forest column whose axis follows the rendered width.
#[derive(Debug, Clone)]
pub struct AxisView {
    rows: Vec<Row>,
    effects: Vec<EffectRef>,
    config: AxisConfig,
    scale: ScaleKind,
    null_value: f64,
    point_col: String,
    lower_col: String,
    upper_col: String,
    point_size: f64,
    width: f64,
    layout: AxisLayout,
    recomputes: usize,
}

impl AxisView {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        rows: Vec<Row>,
        config: AxisConfig,
        scale: ScaleKind,
        null_value: f64,
        point_col: &str,
        lower_col: &str,
        upper_col: &str,
        width: f64,
    ) -> Self {
        let mut view = Self {
            rows,
            effects: Vec::new(),
            config,
            scale,
            null_value,
            point_col: point_col.to_string(),
            lower_col: lower_col.to_string(),
            upper_col: upper_col.to_string(),
            point_size: 6.0,
            width,
            layout: AxisLayout { axis_limits: [0.0, 0.0], plot_region: [0.0, 0.0], ticks: Vec::new() },
            recomputes: 0,
        };
        view.recompute();
        view
    }

    pub fn with_effects(mut self, effects: Vec<EffectRef>) -> Self {
        self.effects = effects;
        self.recompute();
        self
    }

    pub fn with_point_size(mut self, point_size: f64) -> Self {
        self.point_size = point_size;
        self
    }

    fn recompute(&mut self) {
        let request = AxisRequest {
            rows: &self.rows,
            config: &self.config,
            scale: self.scale,
            null_value: self.null_value,
            forest_width: self.width,
            point_size: self.point_size,
            point_col: &self.point_col,
            lower_col: &self.lower_col,
            upper_col: &self.upper_col,
            effects: &self.effects,
        };
        self.layout = compute_axis(&request);
        self.recomputes += 1;
    }

    /// Update the column width. Returns whether the layout was recomputed.
    pub fn resize(&mut self, width: f64) -> bool {
        if width == self.width {
            return false;
        }
        tracing::trace!(from = self.width, to = width, "forest column resized");
        self.width = width;
        self.recompute();
        true
    }

    /// Swap the axis configuration and recompute.
    pub fn set_config(&mut self, config: AxisConfig) {
        self.config = config;
        self.recompute();
    }

    pub fn layout(&self) -> &AxisLayout {
        &self.layout
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn recompute_count(&self) -> usize {
        self.recomputes
    }

    /// Pixel scale for the current width.
    pub fn pixel_scale(&self) -> PixelScale {
        PixelScale::new(self.scale, self.layout.plot_region, (0.0, self.width))
    }

    pub fn frame(&self) -> AxisFrame {
        let scale = self.pixel_scale();
        let ticks = prune_ticks(tick_marks(&scale, &self.layout.ticks, self.null_value));

        let gridlines = (self.config.gridlines && self.config.gridline_style != GridlineStyle::None)
            .then_some(self.config.gridline_style);
        let null_usable = !self.scale.is_log() || self.null_value > 0.0;
        let null_x = (null_usable && scale.contains(self.null_value)).then(|| scale.map(self.null_value));

        AxisFrame { width: self.width, layout: self.layout.clone(), ticks, gridlines, null_x }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<Row> {
        vec![
            Row::new("a", "Alpha").with_number("est", 0.4).with_number("lo", -0.3).with_number("hi", 1.2),
            Row::new("b", "Beta").with_number("est", -0.5).with_number("lo", -1.1).with_number("hi", 0.2),
        ]
    }

    fn view(width: f64) -> AxisView {
        AxisView::new(rows(), AxisConfig::default(), ScaleKind::Linear, 0.0, "est", "lo", "hi", width)
    }

    #[test]
    fn test_resize_only_recomputes_on_change() {
        let mut v = view(400.0);
        assert_eq!(v.recompute_count(), 1);
        assert!(!v.resize(400.0));
        assert_eq!(v.recompute_count(), 1);
        assert!(v.resize(240.0));
        assert_eq!(v.recompute_count(), 2);
    }

    #[test]
    fn test_frame_positions_follow_region() {
        let v = view(400.0);
        let frame = v.frame();
        let [r0, r1] = frame.layout.plot_region;
        assert!(r0 <= frame.layout.axis_limits[0]);
        assert!(r1 >= frame.layout.axis_limits[1]);
        for tick in &frame.ticks {
            assert!(tick.x >= 0.0 && tick.x <= 400.0, "{:?}", tick);
        }
        let null_x = frame.null_x.unwrap();
        assert!(null_x > 0.0 && null_x < 400.0);
    }

    #[test]
    fn test_pruning_never_touches_layout() {
        let v = view(60.0);
        let frame = v.frame();
        assert_eq!(&frame.layout, v.layout());
        assert!(frame.ticks.len() <= frame.layout.ticks.len());
        assert!(frame.ticks.iter().any(|t| t.is_null));
    }

    #[test]
    fn test_gridlines_off() {
        let mut v = view(400.0);
        v.set_config(AxisConfig { gridlines: false, ..Default::default() });
        assert!(v.frame().gridlines.is_none());
        assert_eq!(v.recompute_count(), 2);
    }
}
