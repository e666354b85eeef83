//! Report identifiers and their static query contracts.

pub mod spec;

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::Serialize;

pub use spec::{
    FilterOp, ParamDescriptor, ParamKind, ParamRole, ParamSpec, ReportQuerySpec, SpecError,
};

use spec::{filter_param, limit_param, offset_param};

/// Allowed values of report 2's `estatus` filter.
pub const ESTATUS_VALUES: &[&str] = &["Ganancias Altas", "Ganancias Normales"];

/// The five reports served by the dashboard.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReportKind {
    /// 1: customers ranked by total spend.
    TopUsers,
    /// 2: revenue per category, filterable by business status.
    TopCategories,
    /// 3: product stock and sales, filterable by minimum stock.
    ProductAnalysis,
    /// 4: order counts and totals per order status.
    OrderStatus,
    /// 5: daily sales, filterable by date range.
    DailySales,
}

/// Returned when a report identifier does not name one of the five reports.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown report identifier")]
pub struct UnknownReport;

impl ReportKind {
    /// Every report, in identifier order.
    pub const ALL: [ReportKind; 5] = [
        ReportKind::TopUsers,
        ReportKind::TopCategories,
        ReportKind::ProductAnalysis,
        ReportKind::OrderStatus,
        ReportKind::DailySales,
    ];

    /// Numeric identifier used in URLs.
    pub fn id(self) -> u8 {
        match self {
            ReportKind::TopUsers => 1,
            ReportKind::TopCategories => 2,
            ReportKind::ProductAnalysis => 3,
            ReportKind::OrderStatus => 4,
            ReportKind::DailySales => 5,
        }
    }

    /// Looks up a report by numeric identifier.
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }

    /// Display title.
    pub fn title(self) -> &'static str {
        match self {
            ReportKind::TopUsers => "Top Clientes",
            ReportKind::TopCategories => "Categorías Top",
            ReportKind::ProductAnalysis => "Análisis de Productos",
            ReportKind::OrderStatus => "Estado de Órdenes",
            ReportKind::DailySales => "Ventas Diarias",
        }
    }

    /// One-line description.
    pub fn description(self) -> &'static str {
        match self {
            ReportKind::TopUsers => "Ranking de clientes por gasto total",
            ReportKind::TopCategories => "Ingresos totales por categoría",
            ReportKind::ProductAnalysis => "Stock actual y unidades vendidas",
            ReportKind::OrderStatus => "Pedidos y montos por estado",
            ReportKind::DailySales => "Histórico de ventas por día",
        }
    }

    /// Query contract for this report.
    pub fn spec(self) -> &'static ReportQuerySpec {
        &spec_table()[usize::from(self.id() - 1)]
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for ReportKind {
    type Err = UnknownReport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" => Ok(ReportKind::TopUsers),
            "2" => Ok(ReportKind::TopCategories),
            "3" => Ok(ReportKind::ProductAnalysis),
            "4" => Ok(ReportKind::OrderStatus),
            "5" => Ok(ReportKind::DailySales),
            _ => Err(UnknownReport),
        }
    }
}

impl Serialize for ReportKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.id())
    }
}

fn spec_table() -> &'static [ReportQuerySpec; 5] {
    static TABLE: OnceLock<[ReportQuerySpec; 5]> = OnceLock::new();
    TABLE.get_or_init(|| {
        [
            ReportQuerySpec {
                kind: ReportKind::TopUsers,
                view: "view_top_users",
                columns: &[
                    "usuarios",
                    "total_ordenes",
                    "total_gasto",
                    "posicion",
                    "ticket_promedio",
                ],
                order_by: "posicion ASC",
                params: vec![limit_param(), offset_param()],
            },
            ReportQuerySpec {
                kind: ReportKind::TopCategories,
                view: "view_categorias_top",
                columns: &["categoria", "ingresos_totales", "estatus_negocio"],
                order_by: "ingresos_totales DESC",
                params: vec![filter_param(
                    "estatus",
                    ParamKind::Enum(ESTATUS_VALUES),
                    "estatus_negocio",
                    FilterOp::Eq,
                )],
            },
            ReportQuerySpec {
                kind: ReportKind::ProductAnalysis,
                view: "view_analisis_productos",
                columns: &[
                    "producto",
                    "stock_actual",
                    "total_vendido",
                    "valor_monetario_stock",
                ],
                order_by: "valor_monetario_stock DESC",
                params: vec![
                    filter_param(
                        "stock_min",
                        ParamKind::Integer {
                            min: Some(0),
                            max: None,
                        },
                        "stock_actual",
                        FilterOp::Gte,
                    ),
                    limit_param(),
                    offset_param(),
                ],
            },
            ReportQuerySpec {
                kind: ReportKind::OrderStatus,
                view: "view_estado_ordenes",
                columns: &[
                    "status",
                    "cantidad_pedidos",
                    "monto_acumulado",
                    "promedio_orden",
                ],
                order_by: "cantidad_pedidos DESC",
                params: Vec::new(),
            },
            ReportQuerySpec {
                kind: ReportKind::DailySales,
                view: "view_ventas_diarias",
                columns: &[
                    "fecha_venta",
                    "total_ordenes",
                    "ventas_totales",
                    "ticket_promedio",
                ],
                order_by: "fecha_venta DESC",
                params: vec![
                    filter_param("fecha_inicio", ParamKind::Date, "fecha_venta", FilterOp::Gte),
                    filter_param("fecha_fin", ParamKind::Date, "fecha_venta", FilterOp::Lte),
                    limit_param(),
                    offset_param(),
                ],
            },
        ]
    })
}

/// Catalog entry served by `GET /api/reports`.
#[derive(Clone, Debug, Serialize)]
pub struct ReportDescriptor {
    /// Numeric identifier.
    pub id: ReportKind,
    /// Display title.
    pub title: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Accepted parameters.
    pub params: Vec<ParamDescriptor>,
}

/// Describes every report, in identifier order.
pub fn catalog() -> Vec<ReportDescriptor> {
    ReportKind::ALL
        .into_iter()
        .map(|kind| ReportDescriptor {
            id: kind,
            title: kind.title(),
            description: kind.description(),
            params: kind.spec().params.iter().map(ParamDescriptor::from).collect(),
        })
        .collect()
}
