//! Binary entry point for the Vista reporting CLI.
#![forbid(unsafe_code)]

use std::error::Error;
use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use vista::{
    config::VistaConfig,
    dashboard::{self, DashboardOptions},
    demo::{seed_demo, SeedSummary},
    executor::SqliteExecutor,
    gateway::ReportResponse,
    query::{compose_with, validate, PlaceholderStyle, QueryPlan, RawInput, SqlValue},
    report::{catalog, ReportDescriptor},
    ReportGateway, ReportKind,
};

#[derive(Parser, Debug)]
#[command(
    name = "vista",
    version,
    about = "Read-only reporting dashboard over SQL views",
    disable_help_subcommand = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        env = "VISTA_CONFIG",
        help = "Path to the TOML configuration file"
    )]
    config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = OutputFormat::Text,
        help = "Output format for structured responses"
    )]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct ServeCmd {
    #[arg(value_name = "DB", help = "Report database (defaults to [database] default)")]
    db_path: Option<PathBuf>,

    #[arg(long, value_name = "HOST", help = "Bind address host")]
    host: Option<IpAddr>,

    #[arg(long, value_name = "PORT", help = "Bind port")]
    port: Option<u16>,

    #[arg(
        long,
        value_name = "DIR",
        help = "Directory containing dashboard assets"
    )]
    assets: Option<PathBuf>,

    #[arg(
        long = "allow-origin",
        value_name = "ORIGIN",
        help = "Additional CORS origin allowed to call the API (repeatable)"
    )]
    allow_origins: Vec<String>,
}

#[derive(Args, Debug)]
struct ParamArgs {
    #[arg(
        long = "param",
        short = 'p',
        value_name = "KEY=VALUE",
        value_parser = parse_param,
        help = "Report parameter as it would appear in the query string (repeatable)"
    )]
    params: Vec<(String, String)>,
}

impl ParamArgs {
    fn raw_input(&self) -> RawInput {
        RawInput::from_pairs(self.params.iter().cloned())
    }
}

#[derive(Args, Debug)]
struct PlanCmd {
    #[arg(value_name = "REPORT", help = "Report identifier (1-5)")]
    report: String,

    #[command(flatten)]
    params: ParamArgs,

    #[arg(long, help = "Render $1, $2, ... placeholders instead of ?")]
    numbered: bool,
}

#[derive(Args, Debug)]
struct RunCmd {
    #[arg(value_name = "REPORT", help = "Report identifier (1-5)")]
    report: String,

    #[arg(value_name = "DB", help = "Report database (defaults to [database] default)")]
    db_path: Option<PathBuf>,

    #[command(flatten)]
    params: ParamArgs,
}

#[derive(Args, Debug)]
struct SeedDemoCmd {
    #[arg(value_name = "DB")]
    db_path: PathBuf,

    #[arg(long, help = "Create the database if it does not exist")]
    create: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "Serve the report API and dashboard UI")]
    Serve(ServeCmd),

    #[command(about = "Validate parameters and print the composed SQL without running it")]
    Plan(PlanCmd),

    #[command(about = "Run a report against a database and print its rows")]
    Run(RunCmd),

    #[command(about = "Create demo tables, sample rows and the report views")]
    SeedDemo(SeedDemoCmd),

    #[command(about = "List reports and the parameters they accept")]
    Reports,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = VistaConfig::load(cli.config.clone())?;

    match cli.command {
        Command::Serve(cmd) => {
            let options = build_dashboard_options(cmd, &config)?;
            if let Err(err) = dashboard::serve(options).await {
                eprintln!("dashboard server terminated: {err}");
                return Err(Box::new(err));
            }
        }
        Command::Plan(cmd) => {
            let kind: ReportKind = cmd.report.parse()?;
            let style = if cmd.numbered {
                PlaceholderStyle::Numbered
            } else {
                PlaceholderStyle::Positional
            };
            let validated = validate(kind.spec(), &cmd.params.raw_input())?;
            let plan = compose_with(kind, &validated, style)?;
            emit(&cli.format, &plan, |_| print_plan_text(&plan, style))?;
        }
        Command::Run(cmd) => {
            let kind: ReportKind = cmd.report.parse()?;
            let db_path = config.database(cmd.db_path)?;
            let executor = SqliteExecutor::new(db_path).with_busy_timeout(config.busy_timeout());
            let response = ReportGateway::new(executor).run(kind, &cmd.params.raw_input())?;
            emit(&cli.format, &response, |_| print_rows_text(&response))?;
        }
        Command::SeedDemo(cmd) => {
            let summary = seed_demo(&cmd.db_path, cmd.create)?;
            emit(&cli.format, &summary, |_| {
                print_seed_text(&cmd.db_path, &summary)
            })?;
        }
        Command::Reports => {
            let reports = catalog();
            emit(&cli.format, &reports, |_| print_catalog_text(&reports))?;
        }
    }

    Ok(())
}

fn build_dashboard_options(
    cmd: ServeCmd,
    config: &VistaConfig,
) -> Result<DashboardOptions, Box<dyn Error>> {
    let mut allow_origins = config.allow_origins().to_vec();
    allow_origins.extend(cmd.allow_origins);
    Ok(DashboardOptions {
        db_path: config.database(cmd.db_path)?,
        busy_timeout: config.busy_timeout(),
        host: cmd.host.unwrap_or_else(|| config.host()),
        port: cmd.port.unwrap_or_else(|| config.port()),
        assets_dir: cmd.assets.or_else(|| config.assets().map(PathBuf::from)),
        allow_origins,
    })
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

fn emit<T, F>(format: &OutputFormat, value: &T, printer: F) -> Result<(), Box<dyn Error>>
where
    T: serde::Serialize,
    F: Fn(OutputFormat),
{
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)?;
            println!("{json}");
        }
        OutputFormat::Text => printer(OutputFormat::Text),
    }
    Ok(())
}

fn print_plan_text(plan: &QueryPlan, style: PlaceholderStyle) {
    println!("{}", plan.sql());
    for (idx, value) in plan.values().iter().enumerate() {
        match style {
            PlaceholderStyle::Numbered => println!("  ${} = {value}", idx + 1),
            PlaceholderStyle::Positional => println!("  ?{} = {value}", idx + 1),
        }
    }
}

fn print_rows_text(response: &ReportResponse) {
    if response.data.is_empty() {
        println!("(no rows)");
        return;
    }
    for row in &response.data {
        let cells: Vec<String> = row
            .iter()
            .map(|(column, value)| match value {
                serde_json::Value::String(text) => format!("{column}={text}"),
                other => format!("{column}={other}"),
            })
            .collect();
        println!("{}", cells.join("  "));
    }
    println!("{} row(s)", response.data.len());
}

fn print_seed_text(db_path: &std::path::Path, summary: &SeedSummary) {
    println!("Seeded demo data into {}", db_path.display());
    println!(
        "  users={} products={} orders={}",
        summary.users, summary.products, summary.orders
    );
}

fn print_catalog_text(reports: &[ReportDescriptor]) {
    for report in reports {
        println!("{}  {}", report.id, report.title);
        println!("   {}", report.description);
        for param in &report.params {
            let mut line = format!("   --param {}=<{}>", param.name, param.type_name);
            if let Some(allowed) = param.allowed {
                line.push_str(&format!(" one of [{}]", allowed.join(", ")));
            }
            match (param.min, param.max) {
                (Some(min), Some(max)) => line.push_str(&format!(" in {min}..={max}")),
                (Some(min), None) => line.push_str(&format!(" >= {min}")),
                (None, Some(max)) => line.push_str(&format!(" <= {max}")),
                (None, None) => {}
            }
            if let Some(default) = param.default.as_ref() {
                line.push_str(&format!(" (default {})", display_default(default)));
            }
            println!("{line}");
        }
    }
}

fn display_default(value: &SqlValue) -> String {
    match value {
        SqlValue::Integer(v) => v.to_string(),
        SqlValue::Text(text) => text.to_string(),
    }
}
