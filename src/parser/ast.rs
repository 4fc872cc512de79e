// AST for the --axis option language

use crate::config::{GridlineStyle, ScaleKind};

/// One `name(args)` step of an axis option pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum AxisCommand {
    Scale(ScaleKind),
    Null(f64),
    Range(f64, f64),
    Min(f64),
    Max(f64),
    Ticks(Vec<f64>),
    TickCount(usize),
    Gridlines(GridlineStyle),
    Clip(f64),
    IncludeNull(bool),
    /// `None` means auto.
    Symmetric(Option<bool>),
    NullTick(bool),
    Margin(bool),
}
