#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::TempDir;
use vista::{
    demo::seed_demo,
    executor::{DataAccessError, ReportRow, SqliteExecutor},
    ReportError, ReportGateway, ReportKind, RawInput,
};

fn setup_db(name: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join(format!("{name}.db"));
    seed_demo(&path, true).expect("seed demo data");
    (dir, path)
}

fn run(path: &Path, kind: ReportKind, query: &[(&str, &str)]) -> Vec<ReportRow> {
    let gateway = ReportGateway::new(SqliteExecutor::new(path));
    gateway
        .run(kind, &RawInput::from_pairs(query.iter().copied()))
        .expect("report runs")
        .data
}

fn column<'a>(rows: &'a [ReportRow], name: &str) -> Vec<&'a Value> {
    rows.iter().map(|row| &row[name]).collect()
}

#[test]
fn top_users_window_follows_rank() {
    let (_dir, path) = setup_db("top_users");
    let rows = run(&path, ReportKind::TopUsers, &[("limit", "2"), ("offset", "1")]);
    assert_eq!(column(&rows, "usuarios"), [&Value::from("Ana"), &Value::from("Carla")]);
    assert_eq!(column(&rows, "posicion"), [&Value::from(2), &Value::from(3)]);

    let first = run(&path, ReportKind::TopUsers, &[]);
    assert_eq!(first.len(), 5);
    assert_eq!(first[0]["usuarios"], Value::from("Bruno"));
    assert_eq!(first[0]["total_gasto"].as_f64(), Some(1280.0));
}

#[test]
fn rows_expose_view_columns() {
    let (_dir, path) = setup_db("columns");
    let rows = run(&path, ReportKind::DailySales, &[("limit", "1")]);
    assert_eq!(rows.len(), 1);
    let mut keys: Vec<&str> = rows[0].keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        ["fecha_venta", "ticket_promedio", "total_ordenes", "ventas_totales"]
    );
}

#[test]
fn categories_filter_by_status() {
    let (_dir, path) = setup_db("categories");
    let all = run(&path, ReportKind::TopCategories, &[]);
    assert_eq!(
        column(&all, "categoria"),
        [
            &Value::from("Electrónica"),
            &Value::from("Libros"),
            &Value::from("Hogar")
        ]
    );

    let high = run(&path, ReportKind::TopCategories, &[("estatus", "Ganancias Altas")]);
    assert_eq!(high.len(), 1);
    assert_eq!(high[0]["categoria"], Value::from("Electrónica"));

    let normal = run(
        &path,
        ReportKind::TopCategories,
        &[("estatus", "Ganancias Normales")],
    );
    assert_eq!(normal.len(), 2);
}

#[test]
fn products_respect_stock_floor() {
    let (_dir, path) = setup_db("products");
    let rows = run(&path, ReportKind::ProductAnalysis, &[("stock_min", "10")]);
    assert_eq!(
        column(&rows, "producto"),
        [
            &Value::from("Audífonos"),
            &Value::from("Novela"),
            &Value::from("Lámpara")
        ]
    );
    for row in &rows {
        assert!(row["stock_actual"].as_i64().unwrap() >= 10);
    }

    let unfiltered = run(&path, ReportKind::ProductAnalysis, &[]);
    assert_eq!(unfiltered.len(), 6);
    assert_eq!(unfiltered[0]["producto"], Value::from("Laptop"));
}

#[test]
fn order_status_leads_with_delivered() {
    let (_dir, path) = setup_db("status");
    let rows = run(&path, ReportKind::OrderStatus, &[("limit", "1")]);
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0]["status"], Value::from("entregado"));
    assert_eq!(rows[0]["cantidad_pedidos"], Value::from(5));
}

#[test]
fn daily_sales_date_range_is_inclusive() {
    let (_dir, path) = setup_db("daily");
    let rows = run(
        &path,
        ReportKind::DailySales,
        &[("fecha_inicio", "2024-03-02"), ("fecha_fin", "2024-03-05")],
    );
    assert_eq!(
        column(&rows, "fecha_venta"),
        [
            &Value::from("2024-03-05"),
            &Value::from("2024-03-03"),
            &Value::from("2024-03-02")
        ]
    );
    assert_eq!(rows[0]["total_ordenes"], Value::from(2));

    let empty = run(
        &path,
        ReportKind::DailySales,
        &[("fecha_inicio", "2025-01-01")],
    );
    assert!(empty.is_empty());
}

#[test]
fn missing_database_is_internal_error() {
    let dir = TempDir::new().expect("tempdir");
    let gateway = ReportGateway::new(SqliteExecutor::new(dir.path().join("absent.db")));
    let err = gateway
        .run(ReportKind::OrderStatus, &RawInput::new())
        .unwrap_err();
    assert!(matches!(
        err,
        ReportError::DataAccess(DataAccessError::MissingDatabase(_))
    ));
    assert_eq!(err.status(), 500);
}

#[test]
fn database_without_views_fails_opaquely() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("empty.db");
    rusqlite::Connection::open(&path)
        .expect("create")
        .execute_batch("CREATE TABLE placeholder (id INTEGER);")
        .expect("schema");
    let err = ReportGateway::new(SqliteExecutor::new(&path))
        .run(ReportKind::TopUsers, &RawInput::new())
        .unwrap_err();
    assert_eq!(err.public_message(), "Error interno del servidor");
}

#[test]
fn executor_is_read_only() {
    let (_dir, path) = setup_db("readonly");
    let executor = SqliteExecutor::new(&path);
    let err = vista::executor::QueryExecutor::execute(
        &executor,
        "DELETE FROM ordenes",
        &[],
    )
    .unwrap_err();
    assert!(matches!(err, DataAccessError::Sqlite(_)));
}
