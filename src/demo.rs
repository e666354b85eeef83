//! Demo database: base tables, the five report views, and a fixed sample data set.

use std::path::{Path, PathBuf};

use rusqlite::Connection;
use serde::Serialize;
use thiserror::Error;

/// Seeding failures.
#[derive(Debug, Error)]
pub enum DemoError {
    /// The target does not exist and creation was not requested.
    #[error("database not found: {0} (pass --create to create it)")]
    MissingDatabase(PathBuf),
    /// SQLite rejected the schema or data.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Row counts after seeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    /// Rows in `usuarios`.
    pub users: i64,
    /// Rows in `productos`.
    pub products: i64,
    /// Rows in `ordenes`.
    pub orders: i64,
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS usuarios (
    id INTEGER PRIMARY KEY,
    nombre TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS categorias (
    id INTEGER PRIMARY KEY,
    nombre TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS productos (
    id INTEGER PRIMARY KEY,
    nombre TEXT NOT NULL,
    categoria_id INTEGER NOT NULL REFERENCES categorias (id),
    precio REAL NOT NULL,
    stock INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS ordenes (
    id INTEGER PRIMARY KEY,
    usuario_id INTEGER NOT NULL REFERENCES usuarios (id),
    status TEXT NOT NULL,
    fecha TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS detalle_orden (
    orden_id INTEGER NOT NULL REFERENCES ordenes (id),
    producto_id INTEGER NOT NULL REFERENCES productos (id),
    cantidad INTEGER NOT NULL,
    precio_unitario REAL NOT NULL,
    PRIMARY KEY (orden_id, producto_id)
);
";

const SAMPLE_DATA: &str = "
INSERT OR IGNORE INTO usuarios (id, nombre) VALUES
    (1, 'Ana'), (2, 'Bruno'), (3, 'Carla'), (4, 'Diego'), (5, 'Elena');
INSERT OR IGNORE INTO categorias (id, nombre) VALUES
    (1, 'Electrónica'), (2, 'Hogar'), (3, 'Libros');
INSERT OR IGNORE INTO productos (id, nombre, categoria_id, precio, stock) VALUES
    (1, 'Laptop', 1, 1200.0, 5),
    (2, 'Audífonos', 1, 80.0, 40),
    (3, 'Lámpara', 2, 35.0, 12),
    (4, 'Sartén', 2, 25.0, 0),
    (5, 'Novela', 3, 15.0, 60),
    (6, 'Atlas', 3, 45.0, 8);
INSERT OR IGNORE INTO ordenes (id, usuario_id, status, fecha) VALUES
    (1, 1, 'entregado', '2024-03-01'),
    (2, 2, 'entregado', '2024-03-01'),
    (3, 3, 'enviado', '2024-03-02'),
    (4, 1, 'entregado', '2024-03-03'),
    (5, 4, 'cancelado', '2024-03-03'),
    (6, 5, 'pendiente', '2024-03-05'),
    (7, 2, 'entregado', '2024-03-05'),
    (8, 3, 'entregado', '2024-03-06');
INSERT OR IGNORE INTO detalle_orden (orden_id, producto_id, cantidad, precio_unitario) VALUES
    (1, 1, 1, 1200.0), (1, 5, 2, 15.0),
    (2, 2, 1, 80.0),
    (3, 3, 2, 35.0), (3, 4, 1, 25.0),
    (4, 6, 1, 45.0),
    (5, 2, 2, 80.0),
    (6, 5, 3, 15.0),
    (7, 1, 1, 1200.0),
    (8, 3, 1, 35.0), (8, 6, 2, 45.0);
";

// view_orden_totales is shared by the user, status and daily views.
const VIEWS: &str = "
CREATE VIEW IF NOT EXISTS view_orden_totales AS
    SELECT o.id AS orden_id, o.usuario_id, o.status, o.fecha,
           SUM(d.cantidad * d.precio_unitario) AS total
    FROM ordenes o
    JOIN detalle_orden d ON d.orden_id = o.id
    GROUP BY o.id;

CREATE VIEW IF NOT EXISTS view_top_users AS
    SELECT u.nombre AS usuarios,
           COUNT(t.orden_id) AS total_ordenes,
           ROUND(SUM(t.total), 2) AS total_gasto,
           ROW_NUMBER() OVER (ORDER BY SUM(t.total) DESC) AS posicion,
           ROUND(AVG(t.total), 2) AS ticket_promedio
    FROM usuarios u
    JOIN view_orden_totales t ON t.usuario_id = u.id
    GROUP BY u.id;

CREATE VIEW IF NOT EXISTS view_categorias_top AS
    SELECT c.nombre AS categoria,
           ROUND(SUM(d.cantidad * d.precio_unitario), 2) AS ingresos_totales,
           CASE WHEN SUM(d.cantidad * d.precio_unitario) > 1000
                THEN 'Ganancias Altas'
                ELSE 'Ganancias Normales'
           END AS estatus_negocio
    FROM categorias c
    JOIN productos p ON p.categoria_id = c.id
    JOIN detalle_orden d ON d.producto_id = p.id
    GROUP BY c.id;

CREATE VIEW IF NOT EXISTS view_analisis_productos AS
    SELECT p.nombre AS producto,
           p.stock AS stock_actual,
           COALESCE(SUM(d.cantidad), 0) AS total_vendido,
           ROUND(p.stock * p.precio, 2) AS valor_monetario_stock
    FROM productos p
    LEFT JOIN detalle_orden d ON d.producto_id = p.id
    GROUP BY p.id;

CREATE VIEW IF NOT EXISTS view_estado_ordenes AS
    SELECT status,
           COUNT(*) AS cantidad_pedidos,
           ROUND(SUM(total), 2) AS monto_acumulado,
           ROUND(AVG(total), 2) AS promedio_orden
    FROM view_orden_totales
    GROUP BY status;

CREATE VIEW IF NOT EXISTS view_ventas_diarias AS
    SELECT fecha AS fecha_venta,
           COUNT(*) AS total_ordenes,
           ROUND(SUM(total), 2) AS ventas_totales,
           ROUND(AVG(total), 2) AS ticket_promedio
    FROM view_orden_totales
    GROUP BY fecha;
";

/// Creates the schema, sample rows and views at `path`. Safe to re-run.
pub fn seed_demo(path: &Path, create: bool) -> Result<SeedSummary, DemoError> {
    if !create && !path.exists() {
        return Err(DemoError::MissingDatabase(path.to_path_buf()));
    }
    let mut conn = Connection::open(path)?;
    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA)?;
    tx.execute_batch(SAMPLE_DATA)?;
    tx.execute_batch(VIEWS)?;
    tx.commit()?;

    let count = |table: &str| -> rusqlite::Result<i64> {
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
    };
    let summary = SeedSummary {
        users: count("usuarios")?,
        products: count("productos")?,
        orders: count("ordenes")?,
    };
    tracing::info!(path = %path.display(), ?summary, "seeded demo database");
    Ok(summary)
}
