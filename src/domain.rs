//! Domain aggregation: collect point/lower/upper values from every row and
//! effect, apply the null-inclusion and interval-clipping policies, and hand
//! back a raw (not yet rounded) domain.

use crate::config::{AxisConfig, ScaleKind};
use crate::data::{EffectRef, Row};

/// Domain used when no usable value exists at all.
pub const LINEAR_FALLBACK: (f64, f64) = (-1.0, 1.0);
pub const LOG_FALLBACK: (f64, f64) = (0.1, 10.0);

/// Raw domain before rounding. The `*_fixed` flags record which sides came
/// from explicit configuration; those sides must never move afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawDomain {
    pub min: f64,
    pub max: f64,
    pub min_fixed: bool,
    pub max_fixed: bool,
}

impl RawDomain {
    pub fn free(min: f64, max: f64) -> Self {
        Self { min, max, min_fixed: false, max_fixed: false }
    }

    pub fn is_explicit(&self) -> bool {
        self.min_fixed && self.max_fixed
    }
}

/// Field names of one point/lower/upper triple.
#[derive(Debug, Clone, Copy)]
pub struct Columns<'a> {
    pub point: &'a str,
    pub lower: &'a str,
    pub upper: &'a str,
}

#[derive(Debug, Default)]
struct Samples {
    points: Vec<f64>,
    lowers: Vec<f64>,
    uppers: Vec<f64>,
}

impl Samples {
    fn is_empty(&self) -> bool {
        self.points.is_empty() && self.lowers.is_empty() && self.uppers.is_empty()
    }
}

/// Values in "axis space": identity on linear, natural log on log scales.
/// Clipping arithmetic happens here so the log side stays multiplicative.
fn to_axis(scale: ScaleKind, v: f64) -> f64 {
    match scale {
        ScaleKind::Linear => v,
        ScaleKind::Log => v.ln(),
    }
}

fn from_axis(scale: ScaleKind, v: f64) -> f64 {
    match scale {
        ScaleKind::Linear => v,
        ScaleKind::Log => v.exp(),
    }
}

/// Smallest span the core may have, in axis space.
///
/// Linear: a tenth of the largest magnitude involved (or 1 around zero).
/// Log: a factor of two.
pub fn span_floor(scale: ScaleKind, lo: f64, hi: f64) -> f64 {
    match scale {
        ScaleKind::Linear => {
            let magnitude = lo.abs().max(hi.abs());
            if magnitude > 0.0 {
                magnitude * 0.1
            } else {
                1.0
            }
        }
        ScaleKind::Log => std::f64::consts::LN_2,
    }
}

fn collect(
    rows: &[Row],
    scale: ScaleKind,
    primary: Columns<'_>,
    effects: &[EffectRef],
) -> Samples {
    let usable = |v: f64| !scale.is_log() || v > 0.0;
    let mut samples = Samples::default();
    let mut skipped = 0usize;

    let triples = std::iter::once(primary).chain(effects.iter().map(|e| Columns {
        point: &e.point_col,
        lower: &e.lower_col,
        upper: &e.upper_col,
    }));
    let triples: Vec<Columns<'_>> = triples.collect();

    for row in rows {
        for cols in &triples {
            for (field, sink) in [
                (cols.point, &mut samples.points),
                (cols.lower, &mut samples.lowers),
                (cols.upper, &mut samples.uppers),
            ] {
                match row.number(field) {
                    Some(v) if usable(v) => sink.push(v),
                    Some(_) => skipped += 1,
                    None => {}
                }
            }
        }
    }

    if skipped > 0 {
        tracing::trace!(skipped, "ignored non-positive values on log scale");
    }
    samples
}

fn min_of(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

fn max_of(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Derive the raw domain from row data.
///
/// Explicit `range_min`/`range_max` win per side; with both present the data
/// is not even looked at.
pub fn aggregate(
    rows: &[Row],
    config: &AxisConfig,
    scale: ScaleKind,
    null_value: f64,
    effects: &[EffectRef],
    primary: Columns<'_>,
) -> RawDomain {
    if let Some((min, max)) = config.explicit_range() {
        return RawDomain { min, max, min_fixed: true, max_fixed: true };
    }

    let samples = collect(rows, scale, primary, effects);
    let null_usable = config.include_null && (!scale.is_log() || null_value > 0.0);

    let (lo, hi) = if samples.is_empty() {
        let fallback = match scale {
            ScaleKind::Linear => LINEAR_FALLBACK,
            ScaleKind::Log => LOG_FALLBACK,
        };
        tracing::debug!(?fallback, "no usable values, using fallback domain");
        fallback
    } else {
        clipped_extent(&samples, config, scale, null_usable.then_some(null_value))
    };

    let mut domain = RawDomain::free(lo, hi);
    if let Some(min) = config.range_min {
        domain.min = min;
        domain.min_fixed = true;
    }
    if let Some(max) = config.range_max {
        domain.max = max;
        domain.max_fixed = true;
    }

    // A single explicit side may sit on the wrong side of the derived one.
    if domain.min > domain.max {
        if domain.min_fixed {
            domain.max = domain.min;
        } else {
            domain.min = domain.max;
        }
    }

    domain
}

/// Extent of the samples in data space with interval bounds capped per side.
///
/// Comparisons happen in axis space; unclipped values are returned exactly
/// as they appeared in the data.
fn clipped_extent(
    samples: &Samples,
    config: &AxisConfig,
    scale: ScaleKind,
    null_value: Option<f64>,
) -> (f64, f64) {
    // Core span: point estimates plus the reference value. Without any point
    // estimate the interval bounds themselves form the core and nothing is clipped.
    let mut core: Vec<f64> = samples.points.clone();
    if core.is_empty() {
        core.extend(samples.lowers.iter().chain(samples.uppers.iter()).copied());
    }
    core.extend(null_value);

    let (Some(core_lo), Some(core_hi)) = (min_of(&core), max_of(&core)) else {
        return match scale {
            ScaleKind::Linear => LINEAR_FALLBACK,
            ScaleKind::Log => LOG_FALLBACK,
        };
    };

    let (ax_lo, ax_hi) = (to_axis(scale, core_lo), to_axis(scale, core_hi));
    let span = (ax_hi - ax_lo).max(span_floor(scale, core_lo, core_hi));
    let allowance = if config.ci_clip_factor.is_infinite() {
        f64::INFINITY
    } else {
        config.ci_clip_factor * span
    };

    let bounds = || samples.lowers.iter().chain(samples.uppers.iter()).copied();

    let lo = match bounds().reduce(f64::min) {
        Some(bound) if bound >= core_lo => core_lo,
        Some(bound) if to_axis(scale, bound) >= ax_lo - allowance => bound,
        Some(_) => from_axis(scale, ax_lo - allowance),
        None => core_lo,
    };
    let hi = match bounds().reduce(f64::max) {
        Some(bound) if bound <= core_hi => core_hi,
        Some(bound) if to_axis(scale, bound) <= ax_hi + allowance => bound,
        Some(_) => from_axis(scale, ax_hi + allowance),
        None => core_hi,
    };

    tracing::trace!(core_lo, core_hi, span, allowance, lo, hi, "clipped extent");
    (lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLS: Columns<'static> = Columns { point: "est", lower: "lo", upper: "hi" };

    fn row(id: &str, est: f64, lo: f64, hi: f64) -> Row {
        Row::new(id, id)
            .with_number("est", est)
            .with_number("lo", lo)
            .with_number("hi", hi)
    }

    fn run(rows: &[Row], config: &AxisConfig, scale: ScaleKind) -> RawDomain {
        aggregate(rows, config, scale, scale.default_null_value(), &[], COLS)
    }

    #[test]
    fn test_explicit_range_bypasses_data() {
        let config = AxisConfig {
            range_min: Some(-3.0),
            range_max: Some(7.0),
            ..Default::default()
        };
        let domain = run(&[row("a", 100.0, 50.0, 200.0)], &config, ScaleKind::Linear);
        assert_eq!((domain.min, domain.max), (-3.0, 7.0));
        assert!(domain.is_explicit());
    }

    #[test]
    fn test_empty_rows_fall_back() {
        let config = AxisConfig::default();
        let lin = run(&[], &config, ScaleKind::Linear);
        assert_eq!((lin.min, lin.max), LINEAR_FALLBACK);
        let log = run(&[], &config, ScaleKind::Log);
        assert_eq!((log.min, log.max), LOG_FALLBACK);
    }

    #[test]
    fn test_includes_null_by_default() {
        let domain = run(&[row("a", 2.0, 1.5, 3.0)], &AxisConfig::default(), ScaleKind::Linear);
        assert_eq!(domain.min, 0.0);
        assert_eq!(domain.max, 3.0);
    }

    #[test]
    fn test_exclude_null() {
        let config = AxisConfig { include_null: false, ..Default::default() };
        let domain = run(&[row("a", 2.0, 1.5, 3.0), row("b", 2.5, 2.0, 3.5)], &config, ScaleKind::Linear);
        assert_eq!(domain.min, 1.5);
        assert_eq!(domain.max, 3.5);
    }

    #[test]
    fn test_extreme_interval_is_clipped() {
        let domain = run(&[row("a", 1.0, -10.0, 12.0)], &AxisConfig::default(), ScaleKind::Linear);
        // core [0, 1], allowance 2 × 1
        assert_eq!(domain.min, -2.0);
        assert_eq!(domain.max, 3.0);
    }

    #[test]
    fn test_clipping_is_per_side() {
        let rows = [row("a", 1.0, 0.5, 40.0), row("b", 2.0, 1.5, 2.5)];
        let domain = run(&rows, &AxisConfig::default(), ScaleKind::Linear);
        assert_eq!(domain.min, 0.0);
        // core [0, 2], allowance 4
        assert_eq!(domain.max, 6.0);
    }

    #[test]
    fn test_infinite_clip_factor_disables_clipping() {
        let config = AxisConfig { ci_clip_factor: f64::INFINITY, ..Default::default() };
        let domain = run(&[row("a", 1.0, -10.0, 12.0)], &config, ScaleKind::Linear);
        assert_eq!((domain.min, domain.max), (-10.0, 12.0));
    }

    #[test]
    fn test_single_point_keeps_non_zero_span() {
        let config = AxisConfig { include_null: false, ..Default::default() };
        let domain = run(&[row("a", 5.0, -100.0, 100.0)], &config, ScaleKind::Linear);
        assert!(domain.min < 5.0 && domain.min > -100.0);
        assert!(domain.max > 5.0 && domain.max < 100.0);
    }

    #[test]
    fn test_malformed_values_are_skipped() {
        let rows = vec![
            row("a", 1.0, 0.5, 1.5),
            Row::new("b", "b")
                .with("est", crate::data::MetaValue::Text("n/a".into()))
                .with_number("lo", f64::NAN),
            Row::new("c", "c"),
        ];
        let domain = run(&rows, &AxisConfig::default(), ScaleKind::Linear);
        assert_eq!((domain.min, domain.max), (0.0, 1.5));
    }

    #[test]
    fn test_log_excludes_non_positive_values() {
        let rows = [row("a", 2.0, 0.0, 4.0), row("b", -1.0, -2.0, 3.0)];
        let domain = run(&rows, &AxisConfig::default(), ScaleKind::Log);
        assert!(domain.min > 0.0);
        assert_eq!(domain.min, 1.0);
        assert_eq!(domain.max, 4.0);
    }

    #[test]
    fn test_log_clipping_is_multiplicative() {
        let domain = run(&[row("a", 2.0, 0.001, 1000.0)], &AxisConfig::default(), ScaleKind::Log);
        // core [1, 2] in ratio terms, allowance 2 × ln 2 → ×4 either side
        assert!((domain.min - 0.25).abs() < 1e-12);
        assert!((domain.max - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_effects_widen_the_domain() {
        let rows = [row("a", 1.0, 0.5, 1.5)
            .with_number("adj", 3.0)
            .with_number("adj_lo", 2.5)
            .with_number("adj_hi", 3.5)];
        let effects = [EffectRef::new("adj", "adj", "adj_lo", "adj_hi")];
        let domain = aggregate(&rows, &AxisConfig::default(), ScaleKind::Linear, 0.0, &effects, COLS);
        assert_eq!(domain.max, 3.5);
    }

    #[test]
    fn test_single_side_override() {
        let config = AxisConfig { range_min: Some(-5.0), ..Default::default() };
        let domain = run(&[row("a", 1.0, 0.5, 2.0)], &config, ScaleKind::Linear);
        assert_eq!(domain.min, -5.0);
        assert!(domain.min_fixed && !domain.max_fixed);
        assert_eq!(domain.max, 2.0);
    }

    #[test]
    fn test_single_side_override_beyond_data() {
        let config = AxisConfig { range_min: Some(10.0), ..Default::default() };
        let domain = run(&[row("a", 1.0, 0.5, 2.0)], &config, ScaleKind::Linear);
        assert_eq!(domain.min, 10.0);
        assert_eq!(domain.max, 10.0);
    }
}
