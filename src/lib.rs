//! # bench-tables: benchmark result ingestion and aggregation
//!
//! Turns a directory of per-experiment CSV timing files into one sorted
//! table, ready to be charted.
//!
//! ## Pipeline
//!
//! ```text
//! input dir ──> regular files (non-recursive, name order)
//!                 │
//!                 ├─ filename ──> TokenLayout::decode ──> (threads, pages) / (clusters)
//!                 └─ contents ──> load_samples("time") ──> summarize(freq) ──> ms
//!                                                                 │
//!                               ResultTable (sorted by parameters) <┘
//! ```
//!
//! Raw samples are cycle counts; statistics are rescaled into milliseconds
//! with the processor frequency (`mean / frequency_hz * 1000`).
//!
//! ## Example
//!
//! ```rust,no_run
//! use bench_tables::aggregate::{aggregate, AggregationContext};
//! use bench_tables::layout::TokenLayout;
//! use bench_tables::stats::StatisticMode;
//!
//! let ctx = AggregationContext::builder("results/parallel", 3.0e9)
//!     .layout(TokenLayout::cluster_sweep())
//!     .mode(StatisticMode::MeanWithConfidence)
//!     .build()?;
//!
//! let table = aggregate(&ctx)?;
//! for record in table.records() {
//!     println!("clusters={} -> {:.2} ms", record.params()[0], record.value());
//! }
//! # Ok::<(), bench_tables::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod aggregate;
pub mod error;
pub mod export;
pub mod layout;
pub mod samples;
pub mod stats;
pub mod table;

pub use aggregate::{aggregate, aggregate_directory, AggregationContext, FilePolicy};
pub use error::{Error, Result};
pub use layout::{decode_filename, TokenLayout};
pub use samples::{load_samples, SampleSeries};
pub use stats::{summarize, StatisticMode, Summary};
pub use table::{AggregatedRecord, ResultTable};
