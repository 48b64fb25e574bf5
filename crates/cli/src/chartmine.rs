//! chartmine - recover daily series from vector chart reports
//!
//! Reads the chart graphics of a report as SVG and its page text as JSON
//! layouts, and writes CSV tables of per-chart summaries and daily values.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chartmine_core::ExtractConfig;
use chartmine_core::assets::{apply_renames, save_subplots};
use chartmine_core::chart::correct_reading_order;
use chartmine_core::compare::compare_runs;
use chartmine_core::dates::DateIndexTable;
use chartmine_core::diagnostics::Diagnostics;
use chartmine_core::graphics::read_svg_file;
use chartmine_core::pipeline::{dated_series, full_document, process_graphics, split_charts};
use chartmine_core::records::{FullRecord, RecordSink, SummaryRecord, series_records, write_all};
use chartmine_core::text::{read_layouts, summarise};
use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "chartmine")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue, global = true)]
    debug: bool,

    /// JSON file overriding extraction parameters
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Worker threads for chart normalization (0 = all cores)
    #[arg(short = 't', long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split a report's graphics into one SVG file per chart
    Split {
        /// SVG rendering of the report's chart pages
        svg: PathBuf,
        /// Output directory for `<n>.svg` files
        #[arg(short, long, default_value = "svg")]
        outdir: PathBuf,
    },
    /// Write the daily series of every chart
    Series {
        svg: PathBuf,
        /// Page layouts to derive the date axis from
        #[arg(long, conflicts_with = "dates", required_unless_present = "dates")]
        layout: Option<PathBuf>,
        /// Stored `index,date` lookup table
        #[arg(long)]
        dates: Option<PathBuf>,
        #[arg(short, long, default_value = "-")]
        outfile: String,
    },
    /// Write the headline summary of every chart
    Summary {
        /// JSON page layouts of the report
        layout: PathBuf,
        #[arg(short, long, default_value = "-")]
        outfile: String,
        /// Also store the resolved date lookup table here
        #[arg(long)]
        write_dates: Option<PathBuf>,
    },
    /// Join summaries and series, and check them against each other
    Full {
        layout: PathBuf,
        svg: PathBuf,
        #[arg(short, long, default_value = "-")]
        outfile: String,
        /// Absolute headline difference reported as a mismatch
        #[arg(long)]
        threshold: Option<f64>,
        /// Also write every chart as `<n>.svg` into this directory
        #[arg(long)]
        svg_dir: Option<PathBuf>,
    },
    /// Compare a full table against the one from a previous run
    Compare { previous: PathBuf, current: PathBuf },
}

/// Writes records as CSV rows with a header line.
struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    fn new(inner: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(inner),
        }
    }
}

fn csv_error(e: csv::Error) -> chartmine_core::ChartError {
    io::Error::other(e).into()
}

impl<W: Write, R: Serialize> RecordSink<R> for CsvSink<W> {
    fn write(&mut self, record: &R) -> chartmine_core::Result<()> {
        self.writer.serialize(record).map_err(csv_error)
    }

    fn finish(&mut self) -> chartmine_core::Result<()> {
        Ok(self.writer.flush()?)
    }
}

fn open_output(outfile: &str) -> Result<Box<dyn Write>> {
    if outfile == "-" {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    let file = File::create(outfile).with_context(|| format!("creating {outfile}"))?;
    Ok(Box::new(BufWriter::new(file)))
}

fn write_csv<'a, R: Serialize + 'a>(
    outfile: &str,
    records: impl IntoIterator<Item = &'a R>,
) -> Result<usize> {
    let mut sink = CsvSink::new(open_output(outfile)?);
    let count = write_all(&mut sink, records).with_context(|| format!("writing {outfile}"))?;
    tracing::info!(rows = count, outfile, "wrote table");
    Ok(count)
}

/// One row of a stored date lookup table.
#[derive(Debug, Serialize, Deserialize)]
struct DateRow {
    index: u32,
    date: NaiveDate,
}

fn read_dates(path: &Path) -> Result<DateIndexTable> {
    let mut reader = csv::Reader::from_path(path).with_context(|| format!("opening {}", path.display()))?;
    let rows = reader
        .deserialize::<DateRow>()
        .map(|row| row.map(|r| (r.index, r.date)))
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(DateIndexTable::from_entries(rows)?)
}

fn write_dates(path: &Path, table: &DateIndexTable) -> Result<()> {
    let rows: Vec<DateRow> = table.iter().map(|(index, date)| DateRow { index, date }).collect();
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_all(&mut CsvSink::new(BufWriter::new(file)), &rows)?;
    Ok(())
}

fn read_full(path: &Path) -> Result<Vec<FullRecord>> {
    let mut reader = csv::Reader::from_path(path).with_context(|| format!("opening {}", path.display()))?;
    reader
        .deserialize()
        .collect::<std::result::Result<Vec<FullRecord>, _>>()
        .with_context(|| format!("reading {}", path.display()))
}

fn report_diagnostics(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics.iter() {
        eprintln!("warning: {diagnostic}");
    }
}

fn load_config(args: &Args) -> Result<ExtractConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            ExtractConfig::from_json(&json).with_context(|| format!("parsing {}", path.display()))?
        }
        None => ExtractConfig::default(),
    };
    if let Some(threads) = args.threads {
        config.threads = threads;
    }
    Ok(config)
}

fn split(svg: &Path, outdir: &Path, config: &ExtractConfig) -> Result<()> {
    let graphics = read_svg_file(svg).with_context(|| format!("reading {}", svg.display()))?;
    let raw = ExtractConfig {
        reorder: false,
        ..config.clone()
    };
    let (charts, _) = split_charts(graphics.primitives, &raw);
    save_subplots(outdir, &charts)?;
    if config.reorder {
        let (_, renames) = correct_reading_order(charts.clone());
        apply_renames(outdir, &renames)?;
    }
    println!("{} charts written to {}", charts.len(), outdir.display());
    Ok(())
}

fn series(
    svg: &Path,
    layout: Option<&Path>,
    dates: Option<&Path>,
    outfile: &str,
    config: &ExtractConfig,
) -> Result<()> {
    let table = match (layout, dates) {
        (_, Some(path)) => read_dates(path)?,
        (Some(path), None) => {
            let summaries = summarise(read_layouts(path)?, &config.layout)?;
            DateIndexTable::from_summaries(&summaries).context("resolving the date axis")?
        }
        (None, None) => bail!("either --layout or --dates is required"),
    };
    table.check_span(config.span.xspan);

    let graphics = read_svg_file(svg).with_context(|| format!("reading {}", svg.display()))?;
    let output = process_graphics(graphics, config)?;
    report_diagnostics(&output.diagnostics);

    let records: Vec<_> = dated_series(&output.daily(config), &table)
        .iter()
        .flat_map(|(&chart, dated)| series_records(chart, dated))
        .collect();
    write_csv(outfile, &records)?;
    Ok(())
}

fn summary(layout: &Path, outfile: &str, dates_out: Option<&Path>, config: &ExtractConfig) -> Result<()> {
    let summaries = summarise(read_layouts(layout)?, &config.layout)?;
    let records: Vec<SummaryRecord> = summaries.iter().map(SummaryRecord::from).collect();
    write_csv(outfile, &records)?;
    if let Some(path) = dates_out {
        let table = DateIndexTable::from_summaries(&summaries).context("resolving the date axis")?;
        write_dates(path, &table)?;
    }
    Ok(())
}

fn full(
    layout: &Path,
    svg: &Path,
    outfile: &str,
    svg_dir: Option<&Path>,
    config: &ExtractConfig,
) -> Result<()> {
    let pages = read_layouts(layout).with_context(|| format!("reading {}", layout.display()))?;
    let graphics = read_svg_file(svg).with_context(|| format!("reading {}", svg.display()))?;
    let output = full_document(pages, graphics, config)?;
    report_diagnostics(&output.diagnostics);

    if let Some(dir) = svg_dir {
        save_subplots(dir, &output.graphics.charts)?;
    }
    write_csv(outfile, &output.full_records())?;
    eprint!("{}", output.report);
    Ok(())
}

fn compare(previous: &Path, current: &Path) -> Result<()> {
    let comparison = compare_runs(&read_full(previous)?, &read_full(current)?);
    print!("{comparison}");
    if !comparison.differing.is_empty() {
        bail!("{} values differ from the previous run", comparison.differing.len());
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(io::stderr)
        .init();

    let mut config = load_config(&args)?;
    match &args.command {
        Command::Split { svg, outdir } => split(svg, outdir, &config),
        Command::Series {
            svg,
            layout,
            dates,
            outfile,
        } => series(svg, layout.as_deref(), dates.as_deref(), outfile, &config),
        Command::Summary {
            layout,
            outfile,
            write_dates,
        } => summary(layout, outfile, write_dates.as_deref(), &config),
        Command::Full {
            layout,
            svg,
            outfile,
            threshold,
            svg_dir,
        } => {
            if let Some(threshold) = threshold {
                config.threshold = *threshold;
            }
            full(layout, svg, outfile, svg_dir.as_deref(), &config)
        }
        Command::Compare { previous, current } => compare(previous, current),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from(["chartmine", "-d", "full", "pages.json", "report.svg", "--threshold", "3"]).unwrap();
        assert!(args.debug);
        match args.command {
            Command::Full { threshold, outfile, .. } => {
                assert_eq!(threshold, Some(3.0));
                assert_eq!(outfile, "-");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_series_requires_a_date_source() {
        assert!(Args::try_parse_from(["chartmine", "series", "report.svg"]).is_err());
        assert!(Args::try_parse_from(["chartmine", "series", "report.svg", "--dates", "d.csv"]).is_ok());
    }

    #[test]
    fn test_csv_sink_formats_values() {
        let record = chartmine_core::records::SeriesRecord {
            value: Some(-64.10081),
            date: NaiveDate::from_ymd_opt(2020, 3, 29).unwrap(),
            graph_num: 1,
        };
        let mut buf = Vec::new();
        {
            let mut sink = CsvSink::new(&mut buf);
            write_all(&mut sink, [&record]).unwrap();
        }
        assert_eq!(String::from_utf8(buf).unwrap(), "value,date,graph_num\n-64.101,2020-03-29,1\n");
    }
}
