// Command parsers for the --axis option language

use super::ast::AxisCommand;
use super::lexer::{bool_literal, identifier, number_literal, ws};
use crate::config::{GridlineStyle, ScaleKind};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1},
    combinator::{map, map_res, value},
    multi::separated_list1,
    IResult,
};

/// `name(` ... `)` with whitespace allowed anywhere.
fn call<'a, O, F>(name: &'static str, args: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    let mut args = args;
    move |input: &'a str| {
        let (input, _) = ws(tag(name))(input)?;
        let (input, _) = ws(char('('))(input)?;
        let (input, out) = args(input)?;
        let (input, _) = ws(char(')'))(input)?;
        Ok((input, out))
    }
}

/// Parse scale(linear) or scale(log)
pub fn parse_scale(input: &str) -> IResult<&str, AxisCommand> {
    map(
        call("scale", map_res(ws(identifier), |s: &str| s.parse::<ScaleKind>())),
        AxisCommand::Scale,
    )(input)
}

/// Parse null(1)
pub fn parse_null(input: &str) -> IResult<&str, AxisCommand> {
    map(call("null", ws(number_literal)), AxisCommand::Null)(input)
}

/// Parse range(0.1, 10)
pub fn parse_range(input: &str) -> IResult<&str, AxisCommand> {
    let (input, _) = ws(tag("range"))(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, min) = ws(number_literal)(input)?;
    let (input, _) = ws(char(','))(input)?;
    let (input, max) = ws(number_literal)(input)?;
    let (input, _) = ws(char(')'))(input)?;
    Ok((input, AxisCommand::Range(min, max)))
}

/// Parse min(-2)
pub fn parse_min(input: &str) -> IResult<&str, AxisCommand> {
    map(call("min", ws(number_literal)), AxisCommand::Min)(input)
}

/// Parse max(3)
pub fn parse_max(input: &str) -> IResult<&str, AxisCommand> {
    map(call("max", ws(number_literal)), AxisCommand::Max)(input)
}

/// Parse ticks(0.5, 1, 2)
pub fn parse_ticks(input: &str) -> IResult<&str, AxisCommand> {
    map(
        call("ticks", separated_list1(ws(char(',')), ws(number_literal))),
        AxisCommand::Ticks,
    )(input)
}

/// Parse tick_count(5)
pub fn parse_tick_count(input: &str) -> IResult<&str, AxisCommand> {
    map(
        call("tick_count", map_res(ws(digit1), |s: &str| s.parse::<usize>())),
        AxisCommand::TickCount,
    )(input)
}

/// Parse gridlines(dashed|dotted|none)
pub fn parse_gridlines(input: &str) -> IResult<&str, AxisCommand> {
    map(
        call("gridlines", map_res(ws(identifier), |s: &str| s.parse::<GridlineStyle>())),
        AxisCommand::Gridlines,
    )(input)
}

/// Parse clip(2.0)
pub fn parse_clip(input: &str) -> IResult<&str, AxisCommand> {
    map(call("clip", ws(number_literal)), AxisCommand::Clip)(input)
}

/// Parse include_null(true)
pub fn parse_include_null(input: &str) -> IResult<&str, AxisCommand> {
    map(call("include_null", ws(bool_literal)), AxisCommand::IncludeNull)(input)
}

/// Parse symmetric(true|false|auto)
pub fn parse_symmetric(input: &str) -> IResult<&str, AxisCommand> {
    map(
        call(
            "symmetric",
            ws(alt((map(bool_literal, Some), value(None, tag("auto"))))),
        ),
        AxisCommand::Symmetric,
    )(input)
}

/// Parse null_tick(false)
pub fn parse_null_tick(input: &str) -> IResult<&str, AxisCommand> {
    map(call("null_tick", ws(bool_literal)), AxisCommand::NullTick)(input)
}

/// Parse margin(false)
pub fn parse_margin(input: &str) -> IResult<&str, AxisCommand> {
    map(call("margin", ws(bool_literal)), AxisCommand::Margin)(input)
}

/// Any single axis command.
pub fn parse_command(input: &str) -> IResult<&str, AxisCommand> {
    alt((
        parse_scale,
        parse_null_tick,
        parse_null,
        parse_range,
        parse_min,
        parse_max,
        parse_ticks,
        parse_tick_count,
        parse_gridlines,
        parse_clip,
        parse_include_null,
        parse_symmetric,
        parse_margin,
    ))(input)
}
