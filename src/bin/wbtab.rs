use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use wbtab_rs::models::Axis;
use wbtab_rs::{reshape, stats, storage, viz};

#[derive(Parser, Debug)]
#[command(
    name = "wbtab",
    version,
    about = "Reshape, summarize & plot World Bank indicator CSV exports"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a CSV, reshape it (and optionally save, plot, and print stats).
    Report(ReportArgs),
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(ValueEnum, Clone, Debug)]
enum Orient {
    /// Rows = entities, columns = periods.
    Entity,
    /// Rows = periods, columns = entities.
    Period,
}

#[derive(ValueEnum, Clone, Debug)]
enum Kind {
    Bar,
    Line,
    Heatmap,
}

#[derive(ValueEnum, Clone, Debug)]
enum StatsAxis {
    Rows,
    Columns,
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// Input CSV in World Bank export format.
    #[arg(short, long)]
    input: PathBuf,
    /// Header column holding the entity identifier.
    #[arg(long, default_value = "Country Name")]
    id_column: String,
    /// Columns to drop before reshaping, separated by comma or semicolon
    /// (e.g., "Country Code").
    #[arg(long)]
    drop: Option<String>,
    /// Keep only the id column and 4-digit-year columns.
    #[arg(long, default_value_t = false)]
    years_only: bool,
    /// Orientation used for --out and --stats.
    #[arg(long, value_enum, default_value = "entity")]
    orient: Orient,
    /// Save the reshaped table to file (format inferred by --format or extension).
    #[arg(long)]
    out: Option<PathBuf>,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
    /// Create a chart at the given path (.svg or .png).
    #[arg(long)]
    plot: Option<PathBuf>,
    /// Chart type for --plot.
    #[arg(long, value_enum, default_value = "line")]
    kind: Kind,
    /// Columns to correlate for --kind heatmap, separated by comma or
    /// semicolon. Defaults to every non-id column.
    #[arg(long)]
    columns: Option<String>,
    /// Width of the plot (default 1000).
    #[arg(long, default_value_t = 1000)]
    width: u32,
    /// Height of the plot (default 600).
    #[arg(long, default_value_t = 600)]
    height: u32,
    /// Chart title.
    #[arg(long)]
    title: Option<String>,
    /// Y-axis label, e.g. "GDP growth (annual %)".
    #[arg(long, default_value = "Value")]
    y_label: String,
    /// Locale for tick labels (en, de, fr, ...).
    #[arg(long, default_value = "en")]
    locale: String,
    /// Print per-series statistics to stdout.
    #[arg(long, default_value_t = false)]
    stats: bool,
    /// Axis for --stats: one series per row or per column of the chosen
    /// orientation.
    #[arg(long, value_enum, default_value = "rows")]
    axis: StatsAxis,
    /// Pool every cell of the table into a single series before describing.
    #[arg(long, default_value_t = false)]
    pooled: bool,
}

fn fmt_num(x: f64) -> String {
    if !x.is_finite() {
        return "NA".to_string();
    }
    // Format up to 4 decimals, then trim trailing zeros and trailing dot.
    let s = format!("{:.4}", x);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Report(args) => cmd_report(args),
    }
}

fn print_summary(s: &stats::Summary) {
    println!(
        "{}  count={} missing={}  mean={} std={} skew={} kurt={}  min={} q1={} median={} q3={} max={}",
        s.key,
        s.count,
        s.missing,
        fmt_num(s.mean),
        fmt_num(s.std_dev),
        fmt_num(s.skewness),
        fmt_num(s.kurtosis),
        fmt_num(s.min),
        fmt_num(s.q1),
        fmt_num(s.median),
        fmt_num(s.q3),
        fmt_num(s.max)
    );
}

fn cmd_report(args: ReportArgs) -> Result<()> {
    let mut raw = reshape::load(&args.input)?;
    if let Some(drop) = args.drop.as_deref() {
        let names = parse_list(drop);
        let names: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
        raw = raw.without_columns(&names);
    }
    if args.years_only {
        let years = reshape::year_columns(&raw);
        let drop: Vec<&str> = raw
            .columns()
            .iter()
            .filter(|&c| *c != args.id_column && !years.contains(c))
            .map(|c| c.as_str())
            .collect();
        raw = raw.without_columns(&drop);
    }

    let entity_table = reshape::to_entity_indexed(&raw, &args.id_column)?;
    let period_table = reshape::to_period_indexed(&entity_table);

    if let Some(path) = args.out.as_ref() {
        let fmt = match args.format {
            Some(OutFormat::Csv) => "csv",
            Some(OutFormat::Json) => "json",
            None => path.extension().and_then(|e| e.to_str()).unwrap_or("csv"),
        }
        .to_ascii_lowercase();
        let key_header = match args.orient {
            Orient::Entity => args.id_column.as_str(),
            Orient::Period => "Year",
        };
        match (fmt.as_str(), &args.orient) {
            ("csv", Orient::Entity) => storage::save_table_csv(&entity_table, key_header, path)?,
            ("csv", Orient::Period) => storage::save_table_csv(&period_table, key_header, path)?,
            ("json", Orient::Entity) => storage::save_table_json(&entity_table, path)?,
            ("json", Orient::Period) => storage::save_table_json(&period_table, path)?,
            (other, _) => anyhow::bail!("unsupported format: {}", other),
        }
        eprintln!(
            "Saved {} x {} table to {}",
            entity_table.entities().len(),
            entity_table.periods().len(),
            path.display()
        );
    }

    if let Some(plot_path) = args.plot.as_ref() {
        let title = args.title.as_deref().unwrap_or("World Bank Indicator");
        match args.kind {
            Kind::Bar => viz::plot_grouped_bar(
                &entity_table,
                plot_path,
                args.width,
                args.height,
                title,
                &args.y_label,
                &args.locale,
            )?,
            Kind::Line => viz::plot_lines(
                &period_table,
                plot_path,
                args.width,
                args.height,
                title,
                &args.y_label,
                &args.locale,
            )?,
            Kind::Heatmap => {
                let columns = args
                    .columns
                    .as_deref()
                    .map(parse_list)
                    .unwrap_or_default();
                let corr = stats::correlation_matrix(&entity_table, &columns)?;
                viz::plot_heatmap(&corr, plot_path, args.width, args.height, title)?;
            }
        }
        eprintln!("Wrote plot to {}", plot_path.display());
    }

    if args.stats {
        let axis = match args.axis {
            StatsAxis::Rows => Axis::Rows,
            StatsAxis::Columns => Axis::Columns,
        };
        if args.pooled {
            let pooled = match args.orient {
                Orient::Entity => stats::flatten(&entity_table),
                Orient::Period => stats::flatten(&period_table),
            };
            let summary = stats::describe("all values", &pooled)?;
            print_summary(&summary);
        } else {
            let summaries = match args.orient {
                Orient::Entity => stats::describe_all(&entity_table, axis),
                Orient::Period => stats::describe_all(&period_table, axis),
            };
            for s in summaries.reports.values() {
                print_summary(s);
            }
            for (key, reason) in &summaries.skipped {
                eprintln!("{}: skipped ({})", key, reason);
            }
        }
    }

    Ok(())
}
