//! bench-tables CLI
//!
//! Aggregates a directory of benchmark CSV files into one sorted table,
//! prints it and writes it to the output path (.parquet, .json or .csv).
//!
//! Run with: bench-tables results/mt out/mt.csv 2400000000 --confidence

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use bench_tables::aggregate::{aggregate, AggregationContext, FilePolicy};
use bench_tables::export::{facet_output_path, write_table};
use bench_tables::layout::TokenLayout;
use bench_tables::stats::StatisticMode;
use bench_tables::table::ResultTable;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Family {
    /// <prefix>_<prefix>_<threads>-<pages>.csv
    ThreadPage,
    /// <prefix>_<clusters>.csv
    Cluster,
}

#[derive(Parser, Debug)]
#[command(name = "bench-tables")]
#[command(about = "Aggregate benchmark CSV files into a table keyed by filename parameters")]
struct Cli {
    /// Directory with benchmark CSV files
    input_dir: PathBuf,

    /// Output file (.parquet, .json or .csv)
    output_path: PathBuf,

    /// Processor frequency in Hz (cycle counts are divided by it)
    frequency: f64,

    /// Experiment family preset for the filename layout
    #[arg(long, value_enum, default_value_t = Family::ThreadPage)]
    family: Family,

    /// Explicit filename layout, e.g. "threads:2,pages:3" (overrides --family)
    #[arg(long)]
    layout: Option<TokenLayout>,

    /// Sample column to read from each file
    #[arg(long, default_value = "time")]
    column: String,

    /// Also compute the 95% confidence interval and standard deviation
    #[arg(long)]
    confidence: bool,

    /// Skip files whose name does not match the layout instead of aborting
    #[arg(long)]
    skip_malformed: bool,

    /// Shift a parameter, e.g. "threads:1" turns thread indices into counts
    #[arg(long, value_parser = parse_offset)]
    offset: Option<(String, i64)>,

    /// Keep only rows whose parameter is a power of two, e.g. "threads" or
    /// "threads:16" to also drop values above 16
    #[arg(long, value_name = "PARAM[:MAX]", value_parser = parse_power_filter)]
    powers_of_two: Option<(String, Option<i64>)>,

    /// Label of the statistic column
    #[arg(long)]
    label: Option<String>,

    /// Also write one file per value of this parameter
    #[arg(long, value_name = "PARAM")]
    facet: Vec<String>,
}

fn parse_offset(s: &str) -> std::result::Result<(String, i64), String> {
    let (name, delta) = s
        .split_once(':')
        .ok_or_else(|| format!("'{s}' is not 'name:delta'"))?;
    let delta = delta
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("bad delta in '{s}': {e}"))?;
    Ok((name.trim().to_string(), delta))
}

fn parse_power_filter(s: &str) -> std::result::Result<(String, Option<i64>), String> {
    match s.split_once(':') {
        None => Ok((s.trim().to_string(), None)),
        Some((name, max)) => {
            let max = max
                .trim()
                .parse::<i64>()
                .map_err(|e| format!("bad bound in '{s}': {e}"))?;
            Ok((name.trim().to_string(), Some(max)))
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let layout = cli.layout.clone().unwrap_or_else(|| match cli.family {
        Family::ThreadPage => TokenLayout::thread_page_sweep(),
        Family::Cluster => TokenLayout::cluster_sweep(),
    });
    let mode = if cli.confidence {
        StatisticMode::MeanWithConfidence
    } else {
        StatisticMode::Mean
    };
    let policy = if cli.skip_malformed {
        FilePolicy::SkipMalformedNames
    } else {
        FilePolicy::Abort
    };

    let ctx = AggregationContext::builder(&cli.input_dir, cli.frequency)
        .layout(layout)
        .column(&cli.column)
        .mode(mode)
        .policy(policy)
        .build()?;

    let mut table = aggregate(&ctx)
        .with_context(|| format!("failed to aggregate {}", cli.input_dir.display()))?;

    if let Some((name, delta)) = &cli.offset {
        table = table.offset_parameter(name, *delta)?;
    }
    if let Some((name, max)) = &cli.powers_of_two {
        table = table.retain_powers_of_two(name, *max)?;
    }
    if let Some(label) = &cli.label {
        table = table.with_value_label(label);
    }

    if cli.confidence {
        log_confidence(&table);
    }
    print_table(&table);

    let format = write_table(&table, &cli.output_path)
        .with_context(|| format!("failed to write {}", cli.output_path.display()))?;
    info!(path = %cli.output_path.display(), ?format, rows = table.len(), "wrote table");

    for name in &cli.facet {
        for (value, facet) in table.facets(name)? {
            let path = facet_output_path(&cli.output_path, &format!("_{name}{value}"));
            write_table(&facet, &path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), rows = facet.len(), "wrote facet");
        }
    }

    Ok(())
}

fn log_confidence(table: &ResultTable) {
    for record in table.records() {
        let summary = record.summary();
        if let (Some(ci), Some(std_dev)) = (summary.confidence, summary.std_dev) {
            info!(
                file = record.file(),
                ci_lower = ci.lower,
                ci_upper = ci.upper,
                std_dev,
                "95% confidence interval and std"
            );
        }
    }
}

fn print_table(table: &ResultTable) {
    for name in table.parameter_names() {
        print!("{name:>10} ");
    }
    println!("{:>14}", table.value_label());

    for record in table.records() {
        for p in record.params() {
            print!("{p:>10} ");
        }
        println!("{:>14.3}", record.value());
    }
}
