use crate::config::ScaleKind;
use crate::ir::PlotRegion;
use crate::ticks::format_tick_label;

/// Approximate advance of one label character, in pixels.
const LABEL_CHAR_WIDTH: f64 = 7.0;
/// Free space required between two neighbouring labels.
const LABEL_GAP: f64 = 8.0;

/// Maps axis values onto a pixel range.
///
/// Both the interactive view and the static exporter build their scales
/// through this type, so a value lands on the same pixel in either.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelScale {
    kind: ScaleKind,
    domain: (f64, f64),
    range: (f64, f64),
}

impl PixelScale {
    pub fn new(kind: ScaleKind, region: PlotRegion, range: (f64, f64)) -> Self {
        Self { kind, domain: (region[0], region[1]), range }
    }

    pub fn kind(&self) -> ScaleKind {
        self.kind
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    fn forward(&self, value: f64) -> f64 {
        match self.kind {
            ScaleKind::Linear => value,
            ScaleKind::Log => value.ln(),
        }
    }

    /// Position of `value` as a fraction of the domain (0 at the start).
    pub fn normalized(&self, value: f64) -> f64 {
        let (d0, d1) = (self.forward(self.domain.0), self.forward(self.domain.1));
        let span = d1 - d0;
        if span == 0.0 || !span.is_finite() {
            return 0.5;
        }
        (self.forward(value) - d0) / span
    }

    /// Pixel coordinate for `value`. Values outside the domain extrapolate.
    pub fn map(&self, value: f64) -> f64 {
        let (r0, r1) = self.range;
        r0 + self.normalized(value) * (r1 - r0)
    }

    /// Axis value at pixel `px`.
    pub fn invert(&self, px: f64) -> f64 {
        let (r0, r1) = self.range;
        let t = if r1 == r0 { 0.5 } else { (px - r0) / (r1 - r0) };
        match self.kind {
            ScaleKind::Linear => self.domain.0 + t * (self.domain.1 - self.domain.0),
            ScaleKind::Log => {
                let (l0, l1) = (self.domain.0.ln(), self.domain.1.ln());
                (l0 + t * (l1 - l0)).exp()
            }
        }
    }

    /// True when `value` falls inside the domain.
    pub fn contains(&self, value: f64) -> bool {
        let (lo, hi) = (self.domain.0.min(self.domain.1), self.domain.0.max(self.domain.1));
        value >= lo && value <= hi
    }

    /// Pull `value` back onto the domain.
    pub fn clamp(&self, value: f64) -> f64 {
        let (lo, hi) = (self.domain.0.min(self.domain.1), self.domain.0.max(self.domain.1));
        value.clamp(lo, hi)
    }
}

/// A tick placed on a pixel axis.
#[derive(Debug, Clone, PartialEq)]
pub struct TickMark {
    pub value: f64,
    pub x: f64,
    pub label: String,
    pub is_null: bool,
}

/// Place and label every tick.
pub fn tick_marks(scale: &PixelScale, ticks: &[f64], null_value: f64) -> Vec<TickMark> {
    ticks
        .iter()
        .map(|&value| TickMark {
            value,
            x: scale.map(value),
            label: format_tick_label(value),
            is_null: value == null_value,
        })
        .collect()
}

fn min_spacing(ticks: &[TickMark]) -> f64 {
    let longest = ticks.iter().map(|t| t.label.chars().count()).max().unwrap_or(0);
    longest as f64 * LABEL_CHAR_WIDTH + LABEL_GAP
}

/// Drop ticks whose labels would collide at their pixel positions.
///
/// The reference tick is kept first, then the outermost ticks, then the rest
/// from left to right. The engine's tick list is never modified.
pub fn prune_ticks(ticks: Vec<TickMark>) -> Vec<TickMark> {
    if ticks.len() <= 1 {
        return ticks;
    }
    let spacing = min_spacing(&ticks);
    let last = ticks.len() - 1;

    let mut order: Vec<usize> = ticks.iter().position(|t| t.is_null).into_iter().collect();
    for i in [0, last].into_iter().chain(1..last) {
        if !order.contains(&i) {
            order.push(i);
        }
    }

    let mut kept: Vec<usize> = Vec::with_capacity(ticks.len());
    for i in order {
        if kept.iter().all(|&k| (ticks[k].x - ticks[i].x).abs() >= spacing) {
            kept.push(i);
        }
    }
    kept.sort_unstable();

    let mut ticks: Vec<Option<TickMark>> = ticks.into_iter().map(Some).collect();
    kept.into_iter().filter_map(|i| ticks[i].take()).collect()
}
