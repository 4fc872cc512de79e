//! Range normalization: widen a raw domain to round bounds.

use crate::config::{AxisConfig, ScaleKind};
use crate::domain::{span_floor, RawDomain};
use crate::ir::AxisLimits;
use crate::ticks::{decade, nice_linear_step, round_to_step, snap};

const EPS: f64 = 1e-9;
/// Finer subdivisions of the tick step tried when a round bound would cross the reference value.
const STEP_DIVISORS: [f64; 4] = [1.0, 2.0, 5.0, 10.0];
const LOG_MANTISSAS: [f64; 3] = [1.0, 2.0, 5.0];
const FINE_LOG_MANTISSAS: [f64; 9] = [1.0, 1.5, 2.0, 2.5, 3.0, 4.0, 5.0, 6.0, 8.0];

/// Widen `raw` to round bounds, honouring explicit sides and the symmetry policy.
pub fn normalize(
    raw: RawDomain,
    config: &AxisConfig,
    scale: ScaleKind,
    null_value: f64,
    target: usize,
) -> AxisLimits {
    if raw.is_explicit() {
        return [raw.min, raw.max];
    }

    let (mut min, mut max) = widen_degenerate(raw, scale, null_value);

    // A round bound may not cross the reference value the data stays clear of.
    let floor_guard = (raw.min > null_value).then_some(null_value);
    let ceil_guard = (raw.max < null_value).then_some(null_value);

    match scale {
        ScaleKind::Linear => {
            let step = nice_linear_step(min, max, target);
            if step > 0.0 {
                if !raw.min_fixed {
                    min = round_down(min, step, floor_guard);
                }
                if !raw.max_fixed {
                    max = round_up(max, step, ceil_guard);
                }
            }
        }
        ScaleKind::Log => {
            if !raw.min_fixed {
                min = log_round_down(min, floor_guard);
            }
            if !raw.max_fixed {
                max = log_round_up(max, ceil_guard);
            }
        }
    }

    if !raw.min_fixed && !raw.max_fixed && wants_symmetry(config, scale, null_value, min, max) {
        (min, max) = symmetric_around(scale, null_value, min, max);
    }

    tracing::debug!(raw_min = raw.min, raw_max = raw.max, min, max, %scale, "normalized domain");
    [min, max]
}

/// Give a zero-width domain some room, moving only the free sides.
fn widen_degenerate(raw: RawDomain, scale: ScaleKind, null_value: f64) -> (f64, f64) {
    let (mut min, mut max) = (raw.min, raw.max);
    if max > min {
        return (min, max);
    }

    let pad = span_floor(scale, min, max);
    match scale {
        ScaleKind::Linear => {
            if !raw.min_fixed {
                min -= pad;
                if raw.min > null_value && min <= null_value {
                    min = (raw.min + null_value) / 2.0;
                }
            }
            if !raw.max_fixed {
                max += pad;
                if raw.max < null_value && max >= null_value {
                    max = (raw.max + null_value) / 2.0;
                }
            }
        }
        ScaleKind::Log => {
            let factor = pad.exp();
            if !raw.min_fixed {
                min /= factor;
                if raw.min > null_value && min <= null_value {
                    min = (raw.min * null_value).sqrt();
                }
            }
            if !raw.max_fixed {
                max *= factor;
                if raw.max < null_value && max >= null_value {
                    max = (raw.max * null_value).sqrt();
                }
            }
        }
    }
    (min, max)
}

fn round_down(value: f64, step: f64, guard: Option<f64>) -> f64 {
    for divisor in STEP_DIVISORS {
        let s = step / divisor;
        let candidate = round_to_step((value / s + EPS).floor() * s, s).min(value);
        if guard.map_or(true, |g| candidate > g) {
            return candidate;
        }
    }
    value
}

fn round_up(value: f64, step: f64, guard: Option<f64>) -> f64 {
    for divisor in STEP_DIVISORS {
        let s = step / divisor;
        let candidate = round_to_step((value / s - EPS).ceil() * s, s).max(value);
        if guard.map_or(true, |g| candidate < g) {
            return candidate;
        }
    }
    value
}

/// Largest `m × 10^e` (m from `mantissas`) not above `value`.
fn log_floor(value: f64, mantissas: &[f64]) -> f64 {
    let e = (value.log10() + EPS).floor() as i32;
    [e, e - 1]
        .iter()
        .flat_map(|&e| mantissas.iter().map(move |m| snap(m * decade(e))))
        .filter(|c| *c <= value * (1.0 + EPS))
        .fold(f64::NAN, f64::max)
        .min(value)
}

/// Smallest `m × 10^e` (m from `mantissas`, or the next decade) not below `value`.
fn log_ceil(value: f64, mantissas: &[f64]) -> f64 {
    let e = (value.log10() - EPS).floor() as i32;
    [e, e + 1]
        .iter()
        .flat_map(|&e| mantissas.iter().map(move |m| snap(m * decade(e))))
        .filter(|c| *c >= value * (1.0 - EPS))
        .fold(f64::NAN, f64::min)
        .max(value)
}

fn log_round_down(value: f64, guard: Option<f64>) -> f64 {
    for mantissas in [&LOG_MANTISSAS[..], &FINE_LOG_MANTISSAS[..]] {
        let candidate = log_floor(value, mantissas);
        if candidate > 0.0 && guard.map_or(true, |g| candidate > g) {
            return candidate;
        }
    }
    value
}

fn log_round_up(value: f64, guard: Option<f64>) -> f64 {
    for mantissas in [&LOG_MANTISSAS[..], &FINE_LOG_MANTISSAS[..]] {
        let candidate = log_ceil(value, mantissas);
        if guard.map_or(true, |g| candidate < g) {
            return candidate;
        }
    }
    value
}

fn axis_distance(scale: ScaleKind, from: f64, to: f64) -> f64 {
    match scale {
        ScaleKind::Linear => (to - from).abs(),
        ScaleKind::Log => (to / from).ln().abs(),
    }
}

/// `Some(b)` forces the choice; `None` turns symmetry on only when the
/// domain straddles the reference value and both sides are within a factor
/// of two of each other.
fn wants_symmetry(config: &AxisConfig, scale: ScaleKind, null_value: f64, min: f64, max: f64) -> bool {
    if scale.is_log() && null_value <= 0.0 {
        return false;
    }
    match config.symmetric {
        Some(forced) => forced,
        None => {
            if !(min < null_value && null_value < max) {
                return false;
            }
            let below = axis_distance(scale, min, null_value);
            let above = axis_distance(scale, null_value, max);
            below.min(above) >= 0.5 * below.max(above)
        }
    }
}

/// Mirror the longer side around the reference value.
fn symmetric_around(scale: ScaleKind, null_value: f64, min: f64, max: f64) -> (f64, f64) {
    let below = axis_distance(scale, min.min(null_value), null_value);
    let above = axis_distance(scale, null_value, max.max(null_value));
    match scale {
        ScaleKind::Linear => {
            let r = below.max(above);
            (null_value - r, null_value + r)
        }
        ScaleKind::Log => {
            if below >= above {
                let lo = min.min(null_value);
                (lo, snap(null_value * null_value / lo))
            } else {
                let hi = max.max(null_value);
                (snap(null_value * null_value / hi), hi)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(raw: RawDomain, config: &AxisConfig, scale: ScaleKind) -> AxisLimits {
        normalize(raw, config, scale, scale.default_null_value(), 5)
    }

    fn no_symmetry() -> AxisConfig {
        AxisConfig { symmetric: Some(false), ..Default::default() }
    }

    #[test]
    fn test_explicit_passes_through() {
        let raw = RawDomain { min: 0.13, max: 7.7, min_fixed: true, max_fixed: true };
        assert_eq!(norm(raw, &AxisConfig::default(), ScaleKind::Linear), [0.13, 7.7]);
    }

    #[test]
    fn test_linear_rounds_outward() {
        let limits = norm(RawDomain::free(-2.0, 3.0), &no_symmetry(), ScaleKind::Linear);
        assert_eq!(limits, [-2.0, 3.0]);
        let limits = norm(RawDomain::free(-1.7, 2.6), &no_symmetry(), ScaleKind::Linear);
        assert_eq!(limits, [-2.0, 3.0]);
    }

    #[test]
    fn test_fixed_side_does_not_move() {
        let raw = RawDomain { min: -1.7, max: 2.6, min_fixed: true, max_fixed: false };
        let limits = norm(raw, &AxisConfig::default(), ScaleKind::Linear);
        assert_eq!(limits[0], -1.7);
        assert_eq!(limits[1], 3.0);
    }

    #[test]
    fn test_does_not_cross_reference_value() {
        let config = AxisConfig { include_null: false, ..no_symmetry() };
        let limits = norm(RawDomain::free(0.5, 10.0), &config, ScaleKind::Linear);
        assert!(limits[0] > 0.0, "crossed null: {:?}", limits);
        assert!(limits[0] <= 0.5);
        assert_eq!(limits[1], 10.0);
    }

    #[test]
    fn test_log_rounds_to_one_two_five() {
        let limits = norm(RawDomain::free(0.25, 8.0), &no_symmetry(), ScaleKind::Log);
        assert_eq!(limits, [0.2, 10.0]);
        let limits = norm(RawDomain::free(0.03, 0.07), &no_symmetry(), ScaleKind::Log);
        assert_eq!(limits, [0.02, 0.1]);
    }

    #[test]
    fn test_log_stays_above_reference() {
        let limits = norm(RawDomain::free(1.3, 4.0), &no_symmetry(), ScaleKind::Log);
        assert!(limits[0] > 1.0 && limits[0] <= 1.3, "{:?}", limits);
        assert_eq!(limits[1], 5.0);
    }

    #[test]
    fn test_symmetric_linear() {
        let config = AxisConfig { symmetric: Some(true), ..Default::default() };
        let limits = norm(RawDomain::free(-1.0, 3.0), &config, ScaleKind::Linear);
        assert_eq!(limits, [-3.0, 3.0]);
    }

    #[test]
    fn test_symmetric_log() {
        let config = AxisConfig { symmetric: Some(true), ..Default::default() };
        let limits = norm(RawDomain::free(0.5, 4.0), &config, ScaleKind::Log);
        assert_eq!(limits, [0.2, 5.0]);
    }

    #[test]
    fn test_auto_symmetry_only_when_balanced() {
        let auto = AxisConfig::default();
        let balanced = norm(RawDomain::free(-1.6, 2.1), &auto, ScaleKind::Linear);
        assert_eq!(balanced[0], -balanced[1]);
        let lopsided = norm(RawDomain::free(-0.2, 3.0), &auto, ScaleKind::Linear);
        assert!(lopsided[0] > -lopsided[1]);
    }

    #[test]
    fn test_degenerate_domain_widens() {
        let limits = norm(RawDomain::free(5.0, 5.0), &no_symmetry(), ScaleKind::Linear);
        assert!(limits[0] < 5.0 && limits[1] > 5.0);
        assert!(limits[0] > 0.0);
        let limits = norm(RawDomain::free(1.5, 1.5), &no_symmetry(), ScaleKind::Log);
        assert!(limits[0] > 1.0 && limits[0] < 1.5);
        assert!(limits[1] > 1.5);
    }
}
