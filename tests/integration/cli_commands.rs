#![allow(missing_docs)]

use std::fs;
use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use tempfile::TempDir;

fn seeded(name: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join(format!("{name}.db"));
    cargo_bin_cmd!("vista")
        .arg("seed-demo")
        .arg(&path)
        .arg("--create")
        .assert()
        .success();
    (dir, path)
}

fn json_stdout(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("json output")
}

#[test]
fn plan_prints_sql_and_values() {
    let output = cargo_bin_cmd!("vista")
        .args(["--format", "json", "plan", "3"])
        .args(["--param", "stock_min=10", "--param", "limit=20"])
        .output()
        .expect("run plan");
    assert!(output.status.success());
    let plan = json_stdout(&output.stdout);
    assert!(plan["sql"]
        .as_str()
        .unwrap()
        .contains("WHERE stock_actual >= ? ORDER BY valor_monetario_stock DESC LIMIT ? OFFSET ?"));
    assert_eq!(plan["values"], serde_json::json!([10, 20, 0]));
}

#[test]
fn plan_numbered_text_output() {
    let output = cargo_bin_cmd!("vista")
        .args(["plan", "5", "--numbered", "-p", "fecha_fin=2024-03-31"])
        .output()
        .expect("run plan");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("WHERE fecha_venta <= $1"));
    assert!(stdout.contains("$1 = '2024-03-31'"));
    assert!(stdout.contains("$3 = 0"));
}

#[test]
fn plan_rejects_invalid_parameters() {
    cargo_bin_cmd!("vista")
        .args(["plan", "2", "--param", "estatus=InvalidValue"])
        .assert()
        .failure();
    cargo_bin_cmd!("vista")
        .args(["plan", "7"])
        .assert()
        .failure();
    cargo_bin_cmd!("vista")
        .args(["plan", "1", "--param", "limit"])
        .assert()
        .failure();
}

#[test]
fn seed_demo_requires_create_for_new_files() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("new.db");
    cargo_bin_cmd!("vista")
        .arg("seed-demo")
        .arg(&path)
        .assert()
        .failure();
    assert!(!path.exists());
}

#[test]
fn seed_demo_reports_counts() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("counts.db");
    let output = cargo_bin_cmd!("vista")
        .args(["--format", "json", "seed-demo"])
        .arg(&path)
        .arg("--create")
        .output()
        .expect("seed");
    assert!(output.status.success());
    let summary = json_stdout(&output.stdout);
    assert_eq!(summary["users"], 5);
    assert_eq!(summary["products"], 6);
    assert_eq!(summary["orders"], 8);
}

#[test]
fn run_returns_rows_as_json() {
    let (_dir, path) = seeded("run");
    let output = cargo_bin_cmd!("vista")
        .args(["--format", "json", "run", "1"])
        .arg(&path)
        .args(["--param", "limit=1"])
        .output()
        .expect("run report");
    assert!(output.status.success());
    let body = json_stdout(&output.stdout);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["usuarios"], "Bruno");
}

#[test]
fn run_uses_configured_database() {
    let (dir, path) = seeded("configured");
    let config = dir.path().join("config.toml");
    fs::write(
        &config,
        format!("[database]\ndefault = {:?}\n", path.display().to_string()),
    )
    .unwrap();
    let output = cargo_bin_cmd!("vista")
        .arg("--config")
        .arg(&config)
        .args(["--format", "json", "run", "4"])
        .output()
        .expect("run report");
    assert!(output.status.success());
    let body = json_stdout(&output.stdout);
    assert_eq!(body["data"].as_array().unwrap().len(), 4);
}

#[test]
fn run_without_database_fails() {
    let dir = TempDir::new().expect("tempdir");
    let config = dir.path().join("empty.toml");
    fs::write(&config, "").unwrap();
    cargo_bin_cmd!("vista")
        .arg("--config")
        .arg(&config)
        .args(["run", "4"])
        .assert()
        .failure();
}

#[test]
fn reports_lists_catalog() {
    let output = cargo_bin_cmd!("vista")
        .args(["--format", "json", "reports"])
        .output()
        .expect("list reports");
    assert!(output.status.success());
    let reports = json_stdout(&output.stdout);
    assert_eq!(reports.as_array().unwrap().len(), 5);

    let text = cargo_bin_cmd!("vista")
        .arg("reports")
        .output()
        .expect("list reports");
    let stdout = String::from_utf8(text.stdout).unwrap();
    assert!(stdout.contains("Ventas Diarias"));
    assert!(stdout.contains("--param limit=<integer> in 1..=100 (default 10)"));
}
