// Pipeline parser for the --axis option language

use super::ast::AxisCommand;
use super::command::parse_command;
use super::lexer::ws;
use crate::config::PlotConfig;
use nom::{
    bytes::complete::tag,
    combinator::{eof, opt},
    multi::separated_list0,
    IResult,
};

/// Parse a complete option string
/// Format: command | command | ...
pub fn parse_axis_spec(input: &str) -> IResult<&str, Vec<AxisCommand>> {
    // A leading "|" is allowed
    let (input, _) = opt(ws(tag("|")))(input)?;

    let (input, commands) = separated_list0(ws(tag("|")), parse_command)(input)?;

    // Consume trailing whitespace and ensure end of input
    let (input, _) = ws(eof)(input)?;

    Ok((input, commands))
}

/// Apply parsed commands on top of a configuration, later commands winning.
pub fn apply_commands(config: &mut PlotConfig, commands: Vec<AxisCommand>) {
    let axis = &mut config.axis;
    for command in commands {
        match command {
            AxisCommand::Scale(kind) => config.scale = kind,
            AxisCommand::Null(v) => config.null_value = Some(v),
            AxisCommand::Range(min, max) => {
                axis.range_min = Some(min);
                axis.range_max = Some(max);
            }
            AxisCommand::Min(v) => axis.range_min = Some(v),
            AxisCommand::Max(v) => axis.range_max = Some(v),
            AxisCommand::Ticks(values) => axis.tick_values = Some(values),
            AxisCommand::TickCount(n) => axis.tick_count = Some(n),
            AxisCommand::Gridlines(style) => axis.gridline_style = style,
            AxisCommand::Clip(factor) => axis.ci_clip_factor = factor,
            AxisCommand::IncludeNull(on) => axis.include_null = on,
            AxisCommand::Symmetric(choice) => axis.symmetric = choice,
            AxisCommand::NullTick(on) => axis.null_tick = on,
            AxisCommand::Margin(on) => axis.marker_margin = on,
        }
    }
}
