use crate::config::ScaleKind;
use crate::data::{EffectRef, Row};
use crate::domain::Columns;
use crate::ir::{AxisLayout, DrawCommand, ForestScene, TextAnchor};
use crate::scale::{prune_ticks, tick_marks, PixelScale};
use crate::theme::{ForestTheme, LineType};

/// Outer padding around the whole figure, in pixels.
const MARGIN: f64 = 16.0;
/// Share of the width reserved for row labels.
const LABEL_COLUMN_FRACTION: f64 = 0.3;
/// Height of the tick label strip under the forest column.
const AXIS_AREA: f64 = 36.0;
const TICK_LENGTH: f64 = 4.0;

/// Everything the exporter needs to lay out one forest plot.
#[derive(Debug, Clone, Copy)]
pub struct SceneInput<'a> {
    pub rows: &'a [Row],
    pub effects: &'a [EffectRef],
    pub primary: Columns<'a>,
    pub layout: &'a AxisLayout,
    pub scale: ScaleKind,
    pub null_value: f64,
    pub point_size: f64,
    pub width: u32,
    pub height: u32,
}

/// Pixel frame of the forest column.
#[derive(Debug, Clone, Copy)]
struct Frame {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

impl Frame {
    fn new(width: u32, height: u32) -> Self {
        let (w, h) = (width as f64, height as f64);
        let left = (w * LABEL_COLUMN_FRACTION).max(MARGIN);
        let right = (w - MARGIN).max(left + 1.0);
        let top = MARGIN;
        let bottom = (h - AXIS_AREA).max(top + 1.0);
        Frame { left, right, top, bottom }
    }
}

/// Width of the forest column for a figure `width` pixels wide.
pub fn forest_width(width: u32) -> f64 {
    let frame = Frame::new(width, AXIS_AREA as u32 + 2 * MARGIN as u32);
    frame.right - frame.left
}

/// Compile rows and a finished axis layout into primitive draw commands.
pub fn compile_scene(input: &SceneInput<'_>, theme: &ForestTheme) -> ForestScene {
    let frame = Frame::new(input.width, input.height);
    let scale = PixelScale::new(input.scale, input.layout.plot_region, (frame.left, frame.right));
    let mut commands = Vec::new();

    let marks = prune_ticks(tick_marks(&scale, &input.layout.ticks, input.null_value));

    // Gridlines first so everything else draws over them.
    if let Some(grid) = &theme.gridline {
        for mark in marks.iter().filter(|m| !m.is_null) {
            commands.push(DrawCommand::DrawLine {
                from: (mark.x, frame.top),
                to: (mark.x, frame.bottom),
                color: grid.color,
                width: grid.width,
                line_type: grid.line_type,
            });
        }
    }

    let null_usable = !input.scale.is_log() || input.null_value > 0.0;
    if null_usable && scale.contains(input.null_value) {
        let x = scale.map(input.null_value);
        commands.push(DrawCommand::DrawLine {
            from: (x, frame.top),
            to: (x, frame.bottom),
            color: theme.null_line.color,
            width: theme.null_line.width,
            line_type: theme.null_line.line_type,
        });
    }

    // Axis line, tick marks and labels.
    commands.push(DrawCommand::DrawLine {
        from: (frame.left, frame.bottom),
        to: (frame.right, frame.bottom),
        color: theme.axis_line.color,
        width: theme.axis_line.width,
        line_type: LineType::Solid,
    });
    for mark in &marks {
        commands.push(DrawCommand::DrawLine {
            from: (mark.x, frame.bottom),
            to: (mark.x, frame.bottom + TICK_LENGTH),
            color: theme.axis_line.color,
            width: theme.axis_line.width,
            line_type: LineType::Solid,
        });
        commands.push(DrawCommand::DrawText {
            position: (mark.x, frame.bottom + TICK_LENGTH + theme.text_size),
            text: mark.label.clone(),
            size: theme.text_size,
            anchor: TextAnchor::Middle,
            color: theme.text_color,
        });
    }

    // Rows
    let n = input.rows.len().max(1) as f64;
    let row_height = (frame.bottom - frame.top) / n;
    let series: Vec<Columns<'_>> = std::iter::once(input.primary)
        .chain(input.effects.iter().map(|e| Columns {
            point: &e.point_col,
            lower: &e.lower_col,
            upper: &e.upper_col,
        }))
        .collect();
    let offset_step = (row_height / (series.len() + 1) as f64).min(input.point_size * 1.5);

    for (i, row) in input.rows.iter().enumerate() {
        let y_center = frame.top + row_height * (i as f64 + 0.5);
        commands.push(DrawCommand::DrawText {
            position: (MARGIN, y_center),
            text: row.label.clone(),
            size: theme.text_size,
            anchor: TextAnchor::Start,
            color: theme.text_color,
        });

        let center_index = (series.len() as f64 - 1.0) / 2.0;
        for (j, columns) in series.iter().enumerate() {
            let y = y_center + (j as f64 - center_index) * offset_step;
            let color = theme.series_color(j);
            compile_interval(&mut commands, row, *columns, &scale, y, color, input, theme);
        }
    }

    ForestScene { width: input.width, height: input.height, background: theme.background, commands }
}

fn usable(scale: ScaleKind, value: Option<f64>) -> Option<f64> {
    value.filter(|v| !scale.is_log() || *v > 0.0)
}

#[allow(clippy::too_many_arguments)]
fn compile_interval(
    commands: &mut Vec<DrawCommand>,
    row: &Row,
    columns: Columns<'_>,
    scale: &PixelScale,
    y: f64,
    color: (u8, u8, u8),
    input: &SceneInput<'_>,
    theme: &ForestTheme,
) {
    let (start, end) = scale.domain();
    let lower = usable(input.scale, row.number(columns.lower));
    let upper = usable(input.scale, row.number(columns.upper));
    let arrow_size = input.point_size.max(4.0);

    if let (Some(a), Some(b)) = (lower, upper) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        if hi >= start && lo <= end {
            commands.push(DrawCommand::DrawLine {
                from: (scale.map(scale.clamp(lo)), y),
                to: (scale.map(scale.clamp(hi)), y),
                color,
                width: theme.interval_width,
                line_type: LineType::Solid,
            });
        }
        if lo < start {
            commands.push(DrawCommand::DrawArrow {
                tip: (scale.map(start), y),
                pointing_right: false,
                size: arrow_size,
                color,
            });
        }
        if hi > end {
            commands.push(DrawCommand::DrawArrow {
                tip: (scale.map(end), y),
                pointing_right: true,
                size: arrow_size,
                color,
            });
        }
    }

    if let Some(point) = usable(input.scale, row.number(columns.point)) {
        if scale.contains(point) {
            commands.push(DrawCommand::DrawMarker { center: (scale.map(point), y), size: input.point_size, color });
        }
    }
}
