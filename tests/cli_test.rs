//! CLI integration tests

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn bench_cmd() -> Command {
    Command::cargo_bin("bench-tables").expect("Failed to find bench-tables binary")
}

fn write_thread_page_dir(dir: &Path) {
    for threads in 0..4 {
        for pages in [4, 8] {
            let body = format!("time\n{}\n{}\n", threads * 1000 + pages, threads * 1000 + pages + 2);
            fs::write(dir.join(format!("mt_run_{threads}-{pages}.csv")), body).unwrap();
        }
    }
}

#[test]
fn test_help_output() {
    bench_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("--confidence"));
}

#[test]
fn test_thread_page_run_writes_csv() {
    let data = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_thread_page_dir(data.path());
    let output = out.path().join("mt.csv");

    bench_cmd()
        .arg(data.path())
        .arg(&output)
        .arg("1000")
        .args(["--offset", "threads:1", "--powers-of-two", "threads", "--label", "ms"])
        .assert()
        .success()
        .stdout(predicate::str::contains("threads"))
        .stdout(predicate::str::contains("ms"));

    let text = fs::read_to_string(&output).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next().unwrap(), "threads,pages,ms,samples");
    // threads 1, 2, 4 (3 has been filtered) x pages 4, 8
    assert_eq!(lines.count(), 6);
    assert!(!text.contains("\n3,"));
}

#[test]
fn test_powers_of_two_with_bound() {
    let data = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_thread_page_dir(data.path());
    let output = out.path().join("mt.csv");

    bench_cmd()
        .arg(data.path())
        .arg(&output)
        .arg("1000")
        .args(["--offset", "threads:1", "--powers-of-two", "threads:2"])
        .assert()
        .success();

    let text = fs::read_to_string(&output).unwrap();
    let threads: Vec<&str> = text
        .lines()
        .skip(1)
        .filter_map(|line| line.split(',').next())
        .collect();
    assert_eq!(threads, vec!["1", "1", "2", "2"]);
}

#[test]
fn test_cluster_family_with_facets() {
    let data = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    fs::write(data.path().join("clusters_2.csv"), "time\n30\n40\n").unwrap();
    fs::write(data.path().join("clusters_6.csv"), "time\n10\n20\n").unwrap();
    let output = out.path().join("par.json");

    bench_cmd()
        .arg(data.path())
        .arg(&output)
        .arg("2")
        .args(["--family", "cluster", "--confidence", "--facet", "clusters"])
        .assert()
        .success();

    assert!(output.exists());
    assert!(out.path().join("par_clusters2.json").exists());
    assert!(out.path().join("par_clusters6.json").exists());
}

#[test]
fn test_explicit_layout() {
    let data = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    fs::write(data.path().join("exp_2-4.csv"), "time\n100\n200\n300\n").unwrap();
    let output = out.path().join("exp.csv");

    bench_cmd()
        .arg(data.path())
        .arg(&output)
        .arg("1000")
        .args(["--layout", "threads:1,pages:2"])
        .assert()
        .success();

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.contains("2,4,200,3"));
}

#[test]
fn test_malformed_name_fails_with_file_name() {
    let data = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_thread_page_dir(data.path());
    fs::write(data.path().join("README.csv"), "time\n1\n").unwrap();

    bench_cmd()
        .arg(data.path())
        .arg(out.path().join("mt.csv"))
        .arg("1000")
        .assert()
        .failure()
        .stderr(predicate::str::contains("README.csv"));

    bench_cmd()
        .arg(data.path())
        .arg(out.path().join("mt.csv"))
        .arg("1000")
        .arg("--skip-malformed")
        .assert()
        .success();
}

#[test]
fn test_empty_directory_fails() {
    let data = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    bench_cmd()
        .arg(data.path())
        .arg(out.path().join("mt.csv"))
        .arg("1000")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No benchmark files"));

    assert!(!out.path().join("mt.csv").exists());
}

#[test]
fn test_invalid_frequency_fails() {
    let data = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    write_thread_page_dir(data.path());

    bench_cmd()
        .arg(data.path())
        .arg(out.path().join("mt.csv"))
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("frequency"));
}
