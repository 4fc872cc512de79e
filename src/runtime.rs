// Runtime executor: table in, axis layout or rendered figure out

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::axis::{compute_axis, AxisRequest};
use crate::compiler::{compile_scene, forest_width, SceneInput};
use crate::config::PlotConfig;
use crate::data::{PlotData, Row};
use crate::domain::Columns;
use crate::graph;
use crate::ir::AxisLayout;
use crate::resolve::{resolve_columns, ColumnSpec, ResolvedColumns};
use crate::theme::resolve_theme;
use crate::transform::rows_from_table;
use crate::OutputFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    #[default]
    Csv,
    Json,
}

impl FromStr for InputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(InputFormat::Csv),
            "json" => Ok(InputFormat::Json),
            other => Err(anyhow::anyhow!("Unknown input format '{}' (expected csv or json)", other)),
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFormat::Csv => write!(f, "csv"),
            InputFormat::Json => write!(f, "json"),
        }
    }
}

/// Parse raw input text into a table.
pub fn load_table(input: &str, format: InputFormat) -> Result<PlotData> {
    match format {
        InputFormat::Csv => PlotData::from_csv_str(input).context("Failed to read CSV input"),
        InputFormat::Json => PlotData::from_json_str(input).context("Failed to read JSON input"),
    }
}

/// Rows, resolved columns and the computed layout for one table.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub rows: Vec<Row>,
    pub columns: ResolvedColumns,
    pub layout: AxisLayout,
}

/// Validate, shape and run the axis engine.
pub fn prepare(table: &PlotData, spec: &ColumnSpec, config: &PlotConfig) -> Result<Prepared> {
    config.validate().context("Invalid axis configuration")?;
    let columns = resolve_columns(spec, table)?;
    let rows = rows_from_table(
        table,
        columns.id_col.as_deref(),
        columns.label_col.as_deref(),
        columns.group_col.as_deref(),
    )?;

    let request = AxisRequest {
        rows: &rows,
        config: &config.axis,
        scale: config.scale,
        null_value: config.null_value(),
        forest_width: forest_width(config.render.width),
        point_size: config.render.point_size,
        point_col: &columns.point,
        lower_col: &columns.lower,
        upper_col: &columns.upper,
        effects: &columns.effects,
    };
    let layout = compute_axis(&request);

    Ok(Prepared { rows, columns, layout })
}

/// Render prepared rows in the configured output format.
pub fn render(prepared: &Prepared, config: &PlotConfig) -> Result<Vec<u8>> {
    let options = &config.render;
    match options.format {
        OutputFormat::Json => {
            let mut bytes = serde_json::to_vec_pretty(&prepared.layout).context("Failed to serialize axis layout")?;
            bytes.push(b'\n');
            Ok(bytes)
        }
        OutputFormat::Png | OutputFormat::Svg => {
            if options.width == 0 || options.height == 0 {
                anyhow::bail!("Image size must be non-zero, got {}x{}", options.width, options.height);
            }
            let theme = resolve_theme(&config.axis, options);
            let input = SceneInput {
                rows: &prepared.rows,
                effects: &prepared.columns.effects,
                primary: Columns {
                    point: &prepared.columns.point,
                    lower: &prepared.columns.lower,
                    upper: &prepared.columns.upper,
                },
                layout: &prepared.layout,
                scale: config.scale,
                null_value: config.null_value(),
                point_size: options.point_size,
                width: options.width,
                height: options.height,
            };
            let scene = compile_scene(&input, &theme);
            tracing::debug!(commands = scene.commands.len(), format = %options.format, "compiled scene");
            if options.format == OutputFormat::Png {
                graph::render_png(&scene).context("Failed to render PNG")
            } else {
                graph::render_svg(&scene).context("Failed to render SVG")
            }
        }
    }
}

/// Full pipeline from raw input text to output bytes.
pub fn run(input: &str, format: InputFormat, spec: &ColumnSpec, config: &PlotConfig) -> Result<Vec<u8>> {
    let table = load_table(input, format)?;
    let prepared = prepare(&table, spec, config)?;
    render(&prepared, config)
}
