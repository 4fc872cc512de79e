//! Tick generation for a finalized domain.
//!
//! Linear axes use step-aligned values from the 1 / 2 / 2.5 / 5 / 10 family.
//! Log axes pick whichever of the 1 / 2 / 5 multiples, the 1 / 5 multiples or
//! the (thinned) decades lands closest to the target count. Pixel-aware
//! pruning is left to renderers.

use crate::config::{AxisConfig, ScaleKind};
use crate::ir::{AxisLimits, Ticks};

pub const DEFAULT_TICK_COUNT: usize = 5;
pub const MIN_TICK_COUNT: usize = 2;
/// Upper bound for the width-derived default; an explicit `tick_count` may exceed it.
pub const MAX_DEFAULT_TICK_COUNT: usize = 7;
/// Roughly one labelled tick per this many pixels of forest column.
pub const PIXELS_PER_TICK: f64 = 80.0;

const NICE_MULTIPLIERS: [f64; 5] = [1.0, 2.0, 2.5, 5.0, 10.0];
/// Sub-decade multiples tried on log axes, densest first.
const LOG_MANTISSA_SETS: [&[f64]; 2] = [&[1.0, 2.0, 5.0], &[1.0, 5.0]];
const EPS: f64 = 1e-9;

/// Target tick count for a direct call: `tick_count` or the default.
pub fn tick_target(config: &AxisConfig) -> usize {
    config
        .tick_count
        .map(|n| n.max(MIN_TICK_COUNT))
        .unwrap_or(DEFAULT_TICK_COUNT)
}

/// Target tick count when the forest column width is known.
pub fn tick_target_for_width(config: &AxisConfig, forest_width: f64) -> usize {
    if let Some(n) = config.tick_count {
        return n.max(MIN_TICK_COUNT);
    }
    if forest_width.is_finite() && forest_width > 0.0 {
        ((forest_width / PIXELS_PER_TICK).round() as usize)
            .clamp(MIN_TICK_COUNT, MAX_DEFAULT_TICK_COUNT)
    } else {
        DEFAULT_TICK_COUNT
    }
}

/// Number of multiples of `step` inside `[min, max]`.
fn count_steps(min: f64, max: f64, step: f64) -> usize {
    let first = (min / step - EPS).ceil();
    let last = (max / step + EPS).floor();
    if last < first {
        0
    } else {
        (last - first) as usize + 1
    }
}

/// Pick the human-friendly step whose tick count over `[min, max]` is
/// closest to `target`. Ties go to the denser set.
pub fn nice_linear_step(min: f64, max: f64, target: usize) -> f64 {
    let span = max - min;
    if !(span > 0.0) || !span.is_finite() {
        return 0.0;
    }

    let intervals = (target.max(MIN_TICK_COUNT) - 1) as f64;
    let raw = span / intervals;
    let magnitude = 10f64.powf(raw.log10().floor());

    let mut best = magnitude;
    let mut best_error = usize::MAX;
    for base in [magnitude / 10.0, magnitude] {
        for m in NICE_MULTIPLIERS {
            let step = snap(base * m);
            let count = count_steps(min, max, step);
            let error = count.abs_diff(target);
            if error < best_error || (error == best_error && step < best) {
                best = step;
                best_error = error;
            }
        }
    }
    best
}

/// Round `value` to the decimal precision implied by `step`, dropping
/// accumulated floating point noise and negative zero.
pub fn round_to_step(value: f64, step: f64) -> f64 {
    if !(step > 0.0) {
        return value;
    }
    let decimals = (1.0 - step.log10().floor()).clamp(0.0, 15.0) as i32;
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor + 0.0
}

/// Snap to 12 significant digits.
pub(crate) fn snap(value: f64) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }
    let digits = 11 - value.abs().log10().floor() as i32;
    if digits.abs() > 300 {
        return value;
    }
    if digits >= 0 {
        let factor = 10f64.powi(digits);
        (value * factor).round() / factor
    } else {
        let factor = 10f64.powi(-digits);
        (value / factor).round() * factor
    }
}

pub(crate) fn decade(exponent: i32) -> f64 {
    snap(10f64.powi(exponent))
}

fn within(value: f64, min: f64, max: f64, tol: f64) -> bool {
    value >= min - tol && value <= max + tol
}

fn linear_ticks(min: f64, max: f64, target: usize) -> Ticks {
    if !(max > min) {
        return vec![min];
    }
    let step = nice_linear_step(min, max, target);
    if !(step > 0.0) {
        return vec![min, max];
    }
    let first = (min / step - EPS).ceil() as i64;
    let last = (max / step + EPS).floor() as i64;
    let tol = (max - min) * EPS;

    (first..=last)
        .map(|k| round_to_step(k as f64 * step, step))
        .filter(|&v| within(v, min, max, tol))
        .map(|v| v.clamp(min, max))
        .collect()
}

fn log_ticks(min: f64, max: f64, target: usize) -> Ticks {
    if !(min > 0.0) || !(max > min) {
        return vec![min].into_iter().filter(|v| *v > 0.0).collect();
    }

    let inside = |v: f64| v >= min * (1.0 - EPS) && v <= max * (1.0 + EPS);
    let lo_e = (min.log10() - EPS).floor() as i32;
    let hi_e = (max.log10() + EPS).ceil() as i32;
    let multiples = |mantissas: &[f64]| -> Ticks {
        (lo_e..=hi_e)
            .flat_map(|e| mantissas.iter().map(move |m| snap(m * 10f64.powi(e))))
            .filter(|&v| inside(v))
            .collect()
    };

    let decades: Vec<(i32, f64)> = (lo_e..=hi_e)
        .map(|e| (e, decade(e)))
        .filter(|&(_, v)| inside(v))
        .collect();

    // Densest first, so ties on distance to the target keep more ticks.
    let mut candidates: Vec<Ticks> = LOG_MANTISSA_SETS.iter().map(|m| multiples(*m)).collect();
    if decades.len() >= MIN_TICK_COUNT {
        candidates.push(thin_decades(&decades, target));
    }

    let cap = target.max(MAX_DEFAULT_TICK_COUNT);
    let chosen = candidates
        .into_iter()
        .filter(|c| (MIN_TICK_COUNT..=cap).contains(&c.len()))
        .min_by_key(|c| c.len().abs_diff(target));

    let ticks = match chosen {
        Some(ticks) => ticks,
        // Narrower than any 1-2-5 pair: plain nice steps, all positive here.
        None => linear_ticks(min, max, target),
    };

    ticks.into_iter().map(|v| v.clamp(min, max)).collect()
}

/// Keep every n-th decade when there are more decades than wanted,
/// aligned on exponent multiples so 10^0 survives when present.
fn thin_decades(decades: &[(i32, f64)], target: usize) -> Ticks {
    if decades.len() <= target {
        return decades.iter().map(|&(_, v)| v).collect();
    }
    let stride = decades.len().div_ceil(target) as i32;
    let kept: Ticks = decades
        .iter()
        .filter(|(e, _)| e.rem_euclid(stride) == 0)
        .map(|&(_, v)| v)
        .collect();

    if kept.len() >= MIN_TICK_COUNT {
        kept
    } else {
        // `decades` holds at least two entries on this path.
        vec![decades[0].1, decades[decades.len() - 1].1]
    }
}

fn approx_eq(a: f64, b: f64, scale: ScaleKind, span: f64) -> bool {
    match scale {
        ScaleKind::Linear => (a - b).abs() <= span.abs() * EPS,
        ScaleKind::Log => (a - b).abs() <= a.abs().max(b.abs()) * EPS,
    }
}

fn sort_dedup(mut ticks: Ticks, scale: ScaleKind, span: f64) -> Ticks {
    ticks.sort_by(f64::total_cmp);
    ticks.dedup_by(|b, a| approx_eq(*a, *b, scale, span));
    ticks
}

/// Ordered, deduplicated tick positions for a finalized domain.
///
/// Explicit `tick_values` win and are only filtered to the domain; nothing
/// is generated past the domain bounds.
pub fn generate_ticks(
    domain: AxisLimits,
    config: &AxisConfig,
    scale: ScaleKind,
    null_value: f64,
) -> Ticks {
    let [min, max] = domain;

    if let Some(explicit) = config.explicit_ticks() {
        let mut ticks: Ticks = explicit
            .iter()
            .copied()
            .filter(|v| *v >= min && *v <= max)
            .collect();
        ticks.sort_by(f64::total_cmp);
        ticks.dedup();
        return ticks;
    }

    let target = tick_target(config);
    let generated = match scale {
        ScaleKind::Linear => linear_ticks(min, max, target),
        ScaleKind::Log => log_ticks(min, max, target),
    };
    let mut ticks = sort_dedup(generated, scale, max - min);

    // The reference value replaces any generated tick that merely rounds to it.
    let null_allowed = !scale.is_log() || null_value > 0.0;
    if config.null_tick && null_allowed && null_value >= min && null_value <= max {
        ticks.retain(|t| !approx_eq(*t, null_value, scale, max - min));
        ticks.push(null_value);
        ticks.sort_by(f64::total_cmp);
    }

    tracing::trace!(?ticks, target, %scale, "generated ticks");
    ticks
}

/// Human-readable tick label: trailing zeros trimmed, precision adapted to
/// magnitude, scientific notation for very small or very large values.
pub fn format_tick_label(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let magnitude = value.abs();
    if !(1e-4..1e5).contains(&magnitude) {
        return format!("{:e}", snap(value));
    }
    let decimals = (2.0 - magnitude.log10().floor()).clamp(0.0, 8.0) as usize;
    let text = format!("{:.*}", decimals, value);
    let text = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    };
    if text == "-0" {
        "0".to_string()
    } else {
        text
    }
}
