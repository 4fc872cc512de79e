use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::RenderOptions;

/// Axis scale variant. The reference ("null") value travels next to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleKind {
    #[default]
    Linear,
    Log,
}

impl ScaleKind {
    /// Conventional "no effect" value: 0 for differences, 1 for ratios.
    pub fn default_null_value(self) -> f64 {
        match self {
            ScaleKind::Linear => 0.0,
            ScaleKind::Log => 1.0,
        }
    }

    pub fn is_log(self) -> bool {
        matches!(self, ScaleKind::Log)
    }
}

impl FromStr for ScaleKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(ScaleKind::Linear),
            "log" => Ok(ScaleKind::Log),
            other => Err(anyhow!("Unknown scale '{}' (expected 'linear' or 'log')", other)),
        }
    }
}

impl fmt::Display for ScaleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleKind::Linear => write!(f, "linear"),
            ScaleKind::Log => write!(f, "log"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridlineStyle {
    #[default]
    Dashed,
    Dotted,
    None,
}

impl FromStr for GridlineStyle {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dashed" => Ok(GridlineStyle::Dashed),
            "dotted" => Ok(GridlineStyle::Dotted),
            "none" => Ok(GridlineStyle::None),
            other => Err(anyhow!("Unknown gridline style '{}'", other)),
        }
    }
}

/// Fully resolved axis configuration.
///
/// The engine never merges partial configs: whatever builds this value
/// (serde defaults, the `--axis` mini-language, a host binding) must hand
/// over a complete structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AxisConfig {
    pub range_min: Option<f64>,
    pub range_max: Option<f64>,
    pub tick_count: Option<usize>,
    pub tick_values: Option<Vec<f64>>,
    pub gridlines: bool,
    pub gridline_style: GridlineStyle,
    pub ci_clip_factor: f64,
    pub include_null: bool,
    pub symmetric: Option<bool>,
    pub null_tick: bool,
    pub marker_margin: bool,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            range_min: None,
            range_max: None,
            tick_count: None,
            tick_values: None,
            gridlines: true,
            gridline_style: GridlineStyle::Dashed,
            ci_clip_factor: 2.0,
            include_null: true,
            symmetric: None,
            null_tick: true,
            marker_margin: true,
        }
    }
}

impl AxisConfig {
    /// Both bounds supplied: the domain is taken verbatim.
    pub fn explicit_range(&self) -> Option<(f64, f64)> {
        match (self.range_min, self.range_max) {
            (Some(min), Some(max)) => Some((min, max)),
            _ => None,
        }
    }

    /// Explicit tick values, treating an empty list as "not configured".
    pub fn explicit_ticks(&self) -> Option<&[f64]> {
        self.tick_values
            .as_deref()
            .filter(|values| !values.is_empty())
    }

    /// Reject configurations that are programming errors in the caller.
    ///
    /// Data quality is never checked here; only the configuration contract.
    pub fn validate(&self, scale: ScaleKind, null_value: f64) -> Result<()> {
        if !null_value.is_finite() {
            bail!("Null value must be finite, got {}", null_value);
        }
        if scale.is_log() && null_value <= 0.0 {
            bail!("Null value must be positive on a log scale, got {}", null_value);
        }

        for (name, bound) in [("rangeMin", self.range_min), ("rangeMax", self.range_max)] {
            if let Some(v) = bound {
                if !v.is_finite() {
                    bail!("{} must be finite, got {}", name, v);
                }
                if scale.is_log() && v <= 0.0 {
                    bail!("{} must be positive on a log scale, got {}", name, v);
                }
            }
        }

        if let Some((min, max)) = self.explicit_range() {
            if min >= max {
                bail!("rangeMin ({}) must be less than rangeMax ({})", min, max);
            }
        }

        if self.ci_clip_factor.is_nan() || self.ci_clip_factor < 0.0 {
            bail!("ciClipFactor must be a non-negative number, got {}", self.ci_clip_factor);
        }

        if let Some(values) = &self.tick_values {
            if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
                bail!("tickValues must be finite, got {}", bad);
            }
        }

        Ok(())
    }
}

/// Configuration file layout: scale, reference value, axis and render options.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlotConfig {
    pub scale: ScaleKind,
    pub null_value: Option<f64>,
    pub axis: AxisConfig,
    pub render: RenderOptions,
}

impl PlotConfig {
    pub fn from_json_str(input: &str) -> Result<Self> {
        serde_json::from_str(input).context("Failed to parse plot configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn null_value(&self) -> f64 {
        self.null_value
            .unwrap_or_else(|| self.scale.default_null_value())
    }

    pub fn validate(&self) -> Result<()> {
        self.axis.validate(self.scale, self.null_value())
    }
}
