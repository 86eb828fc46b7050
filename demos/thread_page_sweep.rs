//! Thread/Page Sweep Example
//!
//! Generates a small multi-thread benchmark result directory, aggregates it
//! and prints the per-page facets the way a faceted bar chart would draw them.
//!
//! Run with: cargo run --example thread_page_sweep

use std::fs;

use bench_tables::aggregate::{aggregate, AggregationContext};
use bench_tables::export::to_record_batch;
use bench_tables::layout::TokenLayout;
use bench_tables::stats::StatisticMode;

const FREQUENCY_HZ: f64 = 2.4e9;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== bench-tables: thread/page sweep ===\n");

    // -------------------------------------------------------------------------
    // 1. Fake harness output: mt_run_<thread index>-<pages>.csv
    // -------------------------------------------------------------------------
    let dir = tempfile::tempdir()?;
    for thread_idx in 0..8u32 {
        for pages in [1u32, 16, 256] {
            let base = 2_400_000.0 * f64::from(pages).sqrt() / f64::from(thread_idx + 1);
            let mut body = String::from("run,time\n");
            for run in 0..10u32 {
                body.push_str(&format!("{run},{}\n", base + f64::from(run) * 1_000.0));
            }
            fs::write(dir.path().join(format!("mt_run_{thread_idx}-{pages}.csv")), body)?;
        }
    }
    println!("1. Wrote 24 result files to {}", dir.path().display());

    // -------------------------------------------------------------------------
    // 2. Aggregate
    // -------------------------------------------------------------------------
    let ctx = AggregationContext::builder(dir.path(), FREQUENCY_HZ)
        .layout(TokenLayout::thread_page_sweep())
        .mode(StatisticMode::MeanWithConfidence)
        .build()?;

    let table = aggregate(&ctx)?
        .offset_parameter("threads", 1)?
        .retain_powers_of_two("threads", Some(16))?
        .with_value_label("milliseconds");
    println!("2. Aggregated {} rows (threads 1, 2, 4, 8)\n", table.len());

    // -------------------------------------------------------------------------
    // 3. One facet per page count
    // -------------------------------------------------------------------------
    for (pages, facet) in table.facets("pages")? {
        println!("   pages = {pages}");
        for record in facet.records() {
            let ci = record.summary().confidence.map_or(0.0, |c| c.half_width());
            println!(
                "     threads {:>2}: {:>8.3} ms ± {:.3}",
                record.params()[0],
                record.value(),
                ci
            );
        }
    }

    // -------------------------------------------------------------------------
    // 4. Arrow hand-off
    // -------------------------------------------------------------------------
    let batch = to_record_batch(&table)?;
    println!("\n4. Arrow batch: {} rows, schema:", batch.num_rows());
    for field in batch.schema().fields() {
        println!("     {}: {:?}", field.name(), field.data_type());
    }

    Ok(())
}
