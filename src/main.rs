use anyhow::{Context, Result};
use clap::Parser;
use forestaxis::data::EffectRef;
use forestaxis::parser::{apply_commands, parse_axis_spec};
use forestaxis::resolve::ColumnSpec;
use forestaxis::runtime::{self, InputFormat};
use forestaxis::{OutputFormat, PlotConfig};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "forestaxis")]
#[command(about = "Compute forest-plot axis limits and ticks from tabular data on stdin", long_about = None)]
struct Args {
    /// Column holding the point estimate
    #[arg(long)]
    point: String,

    /// Column holding the lower interval bound
    #[arg(long)]
    lower: String,

    /// Column holding the upper interval bound
    #[arg(long)]
    upper: String,

    /// Extra effect drawn on every row, as id:point:lower:upper (repeatable)
    #[arg(long = "effect")]
    effects: Vec<EffectRef>,

    /// Column used as row id (default: row number)
    #[arg(long)]
    id_col: Option<String>,

    /// Column used as row label (default: row id)
    #[arg(long)]
    label_col: Option<String>,

    /// Column used as row group
    #[arg(long)]
    group_col: Option<String>,

    /// Format of the data on stdin (csv or json)
    #[arg(long, default_value = "csv")]
    input_format: InputFormat,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Axis options, e.g. 'scale(log) | range(0.1, 10) | ticks(0.5, 1, 2)'
    #[arg(long)]
    axis: Option<String>,

    /// Output format (json, png or svg)
    #[arg(long)]
    format: Option<OutputFormat>,

    /// Image width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Image height in pixels
    #[arg(long)]
    height: Option<u32>,
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the output bytes
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => PlotConfig::load(path)?,
        None => PlotConfig::default(),
    };

    if let Some(axis) = &args.axis {
        match parse_axis_spec(axis) {
            Ok((_, commands)) => apply_commands(&mut config, commands),
            Err(e) => {
                eprintln!("Parse error: {:?}", e);
                std::process::exit(1);
            }
        }
    }

    if let Some(format) = args.format {
        config.render.format = format;
    }
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }

    let spec = ColumnSpec {
        point: args.point,
        lower: args.lower,
        upper: args.upper,
        effects: args.effects,
        id_col: args.id_col,
        label_col: args.label_col,
        group_col: args.group_col,
    };

    // Read table from stdin
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read input from stdin")?;

    let bytes = runtime::run(&input, args.input_format, &spec, &config)
        .context("Failed to compute axis")?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(&bytes)
        .context("Failed to write output to stdout")?;
    handle.flush().context("Failed to flush stdout")?;

    Ok(())
}
