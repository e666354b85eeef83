//! Dashboard HTTP server: one read endpoint per report plus the catalog.

use std::{
    net::{IpAddr, SocketAddr},
    path::PathBuf,
    sync::{Arc, OnceLock},
    time::Duration,
};

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use thiserror::Error;
use tokio::{net::TcpListener, task};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

use crate::error::ReportError;
use crate::executor::{DataAccessError, QueryExecutor, SqliteExecutor};
use crate::gateway::{resolve, ReportGateway, ReportResponse};
use crate::query::RawInput;
use crate::report::{catalog, ReportDescriptor};

/// Everything `vista serve` needs to start listening.
#[derive(Clone, Debug)]
pub struct DashboardOptions {
    /// SQLite database holding the report views.
    pub db_path: PathBuf,
    /// How long SQLite waits on a locked database.
    pub busy_timeout: Duration,
    /// Bind address.
    pub host: IpAddr,
    /// Bind port.
    pub port: u16,
    /// Directory with a prebuilt UI bundle served at `/`.
    pub assets_dir: Option<PathBuf>,
    /// Browser origins allowed to call the report API.
    pub allow_origins: Vec<String>,
}

impl DashboardOptions {
    /// Socket address the server binds to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Startup and serving failures.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The report database does not exist.
    #[error("report database not found: {0}")]
    MissingDatabase(PathBuf),
    /// Binding the listener or serving failed.
    #[error("dashboard i/o error: {0}")]
    Io(#[from] std::io::Error),
}

struct ServerState<E> {
    gateway: ReportGateway<E>,
}

type AppState<E> = Arc<ServerState<E>>;

/// Serves the dashboard over SQLite until Ctrl-C.
pub async fn serve(options: DashboardOptions) -> Result<(), DashboardError> {
    install_tracing_subscriber();

    if !options.db_path.exists() {
        return Err(DashboardError::MissingDatabase(options.db_path));
    }

    let executor = SqliteExecutor::new(&options.db_path).with_busy_timeout(options.busy_timeout);
    let app = router(
        ReportGateway::new(executor),
        options.assets_dir.clone(),
        &options.allow_origins,
    );
    let addr = options.socket_addr();
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        db = %options.db_path.display(),
        assets = ?options.assets_dir,
        origins = options.allow_origins.len(),
        "serving reports"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_ctrl_c())
        .await?;
    tracing::info!("dashboard stopped");
    Ok(())
}

/// Builds the dashboard router around a gateway.
///
/// Without `assets_dir`, `/` renders a plain index of the reports.
pub fn router<E: QueryExecutor>(
    gateway: ReportGateway<E>,
    assets_dir: Option<PathBuf>,
    allow_origins: &[String],
) -> Router {
    let api = Router::new()
        .route("/health", get(health_handler))
        .route("/api/reports", get(catalog_handler))
        .route("/api/reports/:id", get(report_handler::<E>));

    let api = match assets_dir {
        Some(dir) => api.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true)),
        None => api.route("/", get(index_handler)),
    };

    let api = match cors_layer(allow_origins) {
        Some(cors) => api.layer(cors),
        None => api,
    };

    api.with_state(Arc::new(ServerState { gateway }))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            let value = clean_origin(origin).and_then(|o| HeaderValue::from_str(o).ok());
            if value.is_none() {
                tracing::warn!(%origin, "skipping unusable CORS origin");
            }
            value
        })
        .collect();
    if allowed.is_empty() {
        return None;
    }
    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers([header::ACCEPT, header::CONTENT_TYPE]),
    )
}

fn clean_origin(origin: &str) -> Option<&str> {
    Some(origin.trim().trim_end_matches('/')).filter(|o| !o.is_empty())
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn catalog_handler() -> Json<CatalogResponse> {
    Json(CatalogResponse { reports: catalog() })
}

async fn report_handler<E: QueryExecutor>(
    State(state): State<AppState<E>>,
    Path(id): Path<String>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<ReportResponse>, AppError> {
    let kind = resolve(&id)?;
    let Query(pairs) = query.map_err(|rejection| {
        tracing::debug!(report = %kind, %rejection, "malformed query string");
        AppError::MalformedQuery
    })?;
    let raw = RawInput::from_pairs(pairs);
    let gateway = state.gateway.clone();
    // If the client disconnects this future is dropped and the rows are discarded.
    let response = task::spawn_blocking(move || gateway.run(kind, &raw))
        .await
        .map_err(|err| ReportError::DataAccess(DataAccessError::Join(err)))??;
    Ok(Json(response))
}

async fn index_handler() -> Html<String> {
    Html(render_index(&catalog()))
}

fn render_index(reports: &[ReportDescriptor]) -> String {
    let mut items = String::new();
    for report in reports {
        items.push_str(&format!(
            "      <li><a href=\"/api/reports/{id}\">{title}</a><br /><small>{description}</small></li>\n",
            id = report.id,
            title = report.title,
            description = report.description,
        ));
    }
    format!(
        "<!doctype html>
<html lang=\"es\">
  <head>
    <meta charset=\"utf-8\" />
    <title>Dashboard de Reportes</title>
  </head>
  <body>
    <h1>Dashboard de Reportes</h1>
    <p>Seleccione un reporte. Sin <code>--assets</code> solo se expone la API JSON.</p>
    <ul>
{items}    </ul>
  </body>
</html>
"
    )
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct CatalogResponse {
    reports: Vec<ReportDescriptor>,
}

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("query string could not be decoded")]
    MalformedQuery,
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Report(err) => (
                StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                err.public_message(),
            ),
            AppError::MalformedQuery => (StatusCode::BAD_REQUEST, "Parámetros inválidos"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
}

async fn wait_for_ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "ctrl-c handler unavailable; serving until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("ctrl-c received, draining connections");
}

/// Installs the global `tracing` subscriber once. `RUST_LOG` overrides the
/// default `info` level.
pub fn install_tracing_subscriber() {
    static INSTALLED: OnceLock<()> = OnceLock::new();
    INSTALLED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        // Another subscriber may already be set (tests, embedding binaries).
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    });
}
