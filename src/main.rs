use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tabchart::{
    telemetry, ChartKind, ChartSpec, ParseOptions, PlottersBackend, RenderOptions, Session,
    Table,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    Csv,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "tabchart")]
#[command(about = "Chart a column of tabular data and summarise it", long_about = None)]
struct Args {
    /// Input file (reads stdin when omitted)
    input: Option<PathBuf>,

    /// Input format
    #[arg(long, value_enum, default_value_t = InputFormat::Csv)]
    format: InputFormat,

    /// Field delimiter for CSV input
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Treat the first CSV record as data, not as the header
    #[arg(long)]
    no_header: bool,

    /// Chart type
    #[arg(long, value_enum, default_value_t = ChartKind::Bar)]
    chart: ChartKind,

    /// X-axis column (defaults to the first column)
    #[arg(short = 'x', long = "x")]
    x_field: Option<String>,

    /// Y-axis column (defaults to the first numeric-looking column)
    #[arg(short = 'y', long = "y")]
    y_field: Option<String>,

    /// Write the chart here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the chart configuration as JSON instead of rendering
    #[arg(long)]
    emit_config: bool,

    /// Print the first N rows of the table to stderr (at most 100)
    #[arg(long, value_name = "N", num_args = 0..=1, default_missing_value = "100")]
    preview: Option<usize>,

    /// Render options as JSON, e.g. '{"width": 1024, "height": 768, "type": "svg"}'
    #[arg(long)]
    options: Option<String>,
}

fn main() -> Result<()> {
    telemetry::init_tracing();
    let args = Args::parse();

    let input = read_input(args.input.as_ref())?;

    let render_options = match &args.options {
        Some(json) => RenderOptions::from_json(json).context("Invalid --options JSON")?,
        None => RenderOptions::default(),
    };

    let mut session = Session::new(PlottersBackend::new(render_options));
    let table = match args.format {
        InputFormat::Csv => {
            let delimiter = u8::try_from(args.delimiter)
                .map_err(|_| anyhow!("Delimiter must be a single-byte character"))?;
            let options = ParseOptions {
                has_headers: !args.no_header,
                delimiter,
            };
            session.load_text(&input, options)
        }
        InputFormat::Json => {
            let value: serde_json::Value =
                serde_json::from_str(&input).context("Failed to parse JSON input")?;
            session.load_json(&value)
        }
    }
    .map_err(|e| anyhow!("{}", e))?;

    if let Some(limit) = args.preview {
        print_preview(table, limit);
    }

    let x_field = args
        .x_field
        .clone()
        .or_else(|| table.default_x_field().map(String::from))
        .ok_or_else(|| anyhow!("Table has no columns"))?;
    let y_field = args
        .y_field
        .clone()
        .or_else(|| table.default_y_field().map(String::from))
        .unwrap_or_else(|| x_field.clone());
    let spec = ChartSpec::new(args.chart, x_field, y_field);

    session.generate(&spec).map_err(|e| anyhow!("{}", e))?;
    let viz = session
        .visualization()
        .ok_or_else(|| anyhow!("No chart was generated"))?;

    for notice in &viz.notices {
        eprintln!("Warning: {}", notice);
    }
    if let Some(stats) = &viz.statistics {
        eprint!("{}", stats.report(&spec.y_field));
    }

    let bytes = if args.emit_config {
        let mut json = viz
            .config
            .to_json()
            .context("Failed to serialize chart configuration")?;
        json.push('\n');
        json.into_bytes()
    } else {
        session
            .backend()
            .output(viz.handle)
            .map(|chart| chart.bytes.clone())
            .ok_or_else(|| anyhow!("Rendered chart is no longer available"))?
    };

    write_output(args.output.as_ref(), &bytes)
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read input from stdin")?;
            Ok(buf)
        }
    }
}

fn print_preview(table: &Table, limit: usize) {
    let rows = &table.preview()[..table.preview().len().min(limit)];
    eprintln!("{}", table.column_names().join("\t"));
    for row in rows {
        eprintln!("{}", row.values().join("\t"));
    }
    if table.row_count() > rows.len() {
        eprintln!("... ({} rows total)", table.row_count());
    }
}

fn write_output(path: Option<&PathBuf>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => fs::write(path, bytes)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(bytes)
                .context("Failed to write chart to stdout")?;
            handle.flush().context("Failed to flush stdout")?;
            Ok(())
        }
    }
}
