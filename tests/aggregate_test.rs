//! End-to-end aggregation over real directories

use std::fs;
use std::path::Path;

use bench_tables::aggregate::{aggregate, aggregate_directory, AggregationContext, FilePolicy};
use bench_tables::layout::TokenLayout;
use bench_tables::stats::StatisticMode;
use bench_tables::Error;
use tempfile::TempDir;

fn write_series(dir: &Path, name: &str, values: &[f64]) {
    let mut body = String::from("run,time\n");
    for (i, v) in values.iter().enumerate() {
        body.push_str(&format!("{i},{v}\n"));
    }
    fs::write(dir.join(name), body).unwrap();
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn test_thread_page_scenario() {
    let tmp = TempDir::new().unwrap();
    write_series(tmp.path(), "exp_2-8.csv", &[400.0, 500.0, 600.0]);
    write_series(tmp.path(), "exp_2-4.csv", &[100.0, 200.0, 300.0]);

    let layout = TokenLayout::new([("threads", 1), ("pages", 2)]).unwrap();
    let table = aggregate_directory(tmp.path(), 1000.0, layout).unwrap();

    assert_eq!(table.parameter_names(), &["threads", "pages"]);
    assert_eq!(table.len(), 2);
    assert_eq!(table.records()[0].params(), &[2, 4]);
    assert_close(table.records()[0].value(), 200.0);
    assert_eq!(table.records()[1].params(), &[2, 8]);
    assert_close(table.records()[1].value(), 500.0);
}

#[test]
fn test_cluster_scenario() {
    let tmp = TempDir::new().unwrap();
    write_series(tmp.path(), "clusters_6.csv", &[10.0, 20.0]);
    write_series(tmp.path(), "clusters_2.csv", &[30.0, 40.0]);

    let table = aggregate_directory(tmp.path(), 2.0, TokenLayout::cluster_sweep()).unwrap();

    assert_eq!(table.column("clusters").unwrap(), vec![2, 6]);
    // mean / frequency * 1000
    assert_close(table.records()[0].value(), 35.0 / 2.0 * 1000.0);
    assert_close(table.records()[1].value(), 15.0 / 2.0 * 1000.0);
}

#[test]
fn test_thread_page_preset_with_post_processing() {
    let tmp = TempDir::new().unwrap();
    for threads in 0..6 {
        for pages in [1, 16] {
            let name = format!("mt_run_{threads}-{pages}.csv");
            write_series(tmp.path(), &name, &[f64::from(threads * 100 + pages)]);
        }
    }

    let ctx = AggregationContext::builder(tmp.path(), 1000.0).build().unwrap();
    let table = aggregate(&ctx)
        .unwrap()
        .offset_parameter("threads", 1)
        .unwrap()
        .retain_powers_of_two("threads", None)
        .unwrap()
        .with_value_label("milliseconds");

    assert_eq!(table.column("threads").unwrap(), vec![1, 1, 2, 2, 4, 4]);
    assert_eq!(table.column("pages").unwrap(), vec![1, 16, 1, 16, 1, 16]);
    assert_eq!(table.value_label(), "milliseconds");

    let capped = table.retain_powers_of_two("threads", Some(2)).unwrap();
    assert_eq!(capped.column("threads").unwrap(), vec![1, 1, 2, 2]);
}

#[test]
fn test_confidence_mode() {
    let tmp = TempDir::new().unwrap();
    write_series(tmp.path(), "clusters_4.csv", &[100.0, 200.0, 300.0]);

    let ctx = AggregationContext::builder(tmp.path(), 1000.0)
        .layout(TokenLayout::cluster_sweep())
        .mode(StatisticMode::MeanWithConfidence)
        .build()
        .unwrap();
    let table = aggregate(&ctx).unwrap();
    let summary = table.records()[0].summary();

    let ci = summary.confidence.unwrap();
    assert!(ci.lower < summary.mean && summary.mean < ci.upper);
    assert_close(summary.std_dev.unwrap(), 100.0);
    assert!(table.has_confidence());
}

#[test]
fn test_empty_directory() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir(tmp.path().join("nested")).unwrap();

    let err = aggregate_directory(tmp.path(), 1.0, TokenLayout::cluster_sweep()).unwrap_err();
    assert!(matches!(err, Error::EmptyDirectory { .. }));
    assert!(err.to_string().contains("No benchmark files"));
}

#[test]
fn test_malformed_name_aborts_by_default() {
    let tmp = TempDir::new().unwrap();
    write_series(tmp.path(), "clusters_2.csv", &[1.0, 2.0]);
    write_series(tmp.path(), "notes.csv", &[1.0]);

    let err = aggregate_directory(tmp.path(), 1.0, TokenLayout::cluster_sweep()).unwrap_err();
    match err {
        Error::MalformedFilename { file, .. } => assert_eq!(file, "notes.csv"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_malformed_name_skipped_by_policy() {
    let tmp = TempDir::new().unwrap();
    write_series(tmp.path(), "clusters_2.csv", &[1.0, 2.0]);
    write_series(tmp.path(), "notes.csv", &[1.0]);

    let ctx = AggregationContext::builder(tmp.path(), 1.0)
        .layout(TokenLayout::cluster_sweep())
        .policy(FilePolicy::SkipMalformedNames)
        .build()
        .unwrap();
    let table = aggregate(&ctx).unwrap();
    assert_eq!(table.len(), 1);
}

#[test]
fn test_only_malformed_names_skipped_is_empty() {
    let tmp = TempDir::new().unwrap();
    write_series(tmp.path(), "notes.csv", &[1.0]);

    let ctx = AggregationContext::builder(tmp.path(), 1.0)
        .layout(TokenLayout::cluster_sweep())
        .policy(FilePolicy::SkipMalformedNames)
        .build()
        .unwrap();
    assert!(matches!(aggregate(&ctx), Err(Error::EmptyDirectory { .. })));
}

#[test]
fn test_unreadable_file_aborts() {
    let tmp = TempDir::new().unwrap();
    write_series(tmp.path(), "clusters_2.csv", &[1.0, 2.0]);
    fs::write(tmp.path().join("clusters_3.csv"), "time\n").unwrap();

    let err = aggregate_directory(tmp.path(), 1.0, TokenLayout::cluster_sweep()).unwrap_err();
    assert!(matches!(err, Error::UnreadableFile { .. }));
    assert!(err.to_string().contains("clusters_3.csv"));
}

#[test]
fn test_custom_column() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("clusters_2.csv"), "cycles\n10\n30\n").unwrap();

    let ctx = AggregationContext::builder(tmp.path(), 1000.0)
        .layout(TokenLayout::cluster_sweep())
        .column("cycles")
        .build()
        .unwrap();
    assert_close(aggregate(&ctx).unwrap().records()[0].value(), 20.0);
}
