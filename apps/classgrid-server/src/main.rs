use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use axum::http::HeaderName;
use axum::response::{Html, IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use clap::{Parser, Subcommand};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use url::Url;
use utoipa::OpenApi;

use runtime::{AppConfig, CliArgs, DatabaseConfig};
use scheduling::api::openapi::ApiDoc;
use scheduling::api::rest::routes;
use scheduling::config::SchedulingConfig;
use scheduling::domain::service::SchedulingService;
use scheduling::infra::config::{StaticCourseConfig, StaticProviderConfig};
use scheduling::infra::storage::migrations::Migrator;
use scheduling::infra::storage::SeaOrmSchedulingStore;

const REQUEST_BODY_LIMIT: usize = 1024 * 1024;

/// ClassGrid Server - appointment scheduling for education providers
#[derive(Parser)]
#[command(name = "classgrid-server")]
#[command(about = "ClassGrid Server - appointment scheduling for education providers")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory database instead of the configured one
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("ClassGrid Server starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config),
    }
}

/// Reject DSNs for backends we do not ship drivers for.
fn validate_dsn(cfg: &DatabaseConfig) -> Result<()> {
    let raw = cfg.url.trim();
    if raw.is_empty() {
        return Err(anyhow!("Database URL not configured"));
    }
    let url = Url::parse(raw).map_err(|e| anyhow!("Invalid database DSN '{}': {}", raw, e))?;
    match url.scheme() {
        "sqlite" | "sqlite3" | "postgres" | "postgresql" => Ok(()),
        other => Err(anyhow!("Unsupported database type: {}", other)),
    }
}

/// Expand a sqlite DSN into an absolute-path DSN using a base directory, and
/// make sure the file is created on first run (`mode=rwc`).
/// Keeps "sqlite::memory:" as-is. Normalizes backslashes into forward slashes.
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if dsn.eq_ignore_ascii_case("sqlite::memory:") || dsn.eq_ignore_ascii_case("sqlite://:memory:")
    {
        return Ok("sqlite::memory:".to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if let Some(dir) = p.parent() {
        if create_dirs {
            std::fs::create_dir_all(dir)?;
        }
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    match query {
        Some(q) if q.contains("mode=") => {
            out.push('?');
            out.push_str(q);
        }
        Some(q) => {
            out.push('?');
            out.push_str(q);
            out.push_str("&mode=rwc");
        }
        None => out.push_str("?mode=rwc"),
    }
    Ok(out)
}

async fn connect_database(
    config: &AppConfig,
    args: &CliArgs,
) -> Result<DatabaseConnection> {
    let db_config = config
        .database
        .clone()
        .ok_or_else(|| anyhow!("No database configuration found"))?;
    validate_dsn(&db_config)?;

    let mut dsn = if args.mock {
        "sqlite::memory:".to_string()
    } else {
        db_config.url.trim().to_string()
    };
    if dsn.starts_with("sqlite://") {
        dsn = absolutize_sqlite_dsn(&dsn, Path::new(&config.server.home_dir), true)?;
    }

    tracing::info!("Connecting to database: {}", dsn);
    let mut options = ConnectOptions::new(&dsn);
    options
        .max_connections(db_config.max_conns.unwrap_or(10))
        .acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .with_context(|| format!("Failed to connect to database: {dsn}"))?;

    Migrator::up(&db, None)
        .await
        .context("Failed to run migrations")?;

    Ok(db)
}

fn build_router(service: Arc<SchedulingService>, timeout_sec: u64) -> Router {
    let request_id_header = HeaderName::from_static("x-request-id");

    let mut router = Router::new()
        .merge(routes::router(service))
        .route("/healthz", get(healthz))
        .route("/openapi.json", get(openapi_json))
        .route("/docs", get(docs_page));

    if timeout_sec > 0 {
        router = router.layer(TimeoutLayer::new(Duration::from_secs(timeout_sec)));
    }

    router
        .layer(RequestBodyLimitLayer::new(REQUEST_BODY_LIMIT))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Stoplight Elements viewer over /openapi.json
async fn docs_page() -> impl IntoResponse {
    Html(
        r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <title>ClassGrid API</title>
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <script src="https://unpkg.com/@stoplight/elements/web-components.min.js"></script>
    <link rel="stylesheet" href="https://unpkg.com/@stoplight/elements/styles.min.css" />
  </head>
  <body style="margin:0">
    <elements-api apiDescriptionUrl="/openapi.json" router="hash" layout="sidebar" />
  </body>
</html>"#,
    )
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    let db = connect_database(&config, &args).await?;

    let scheduling_config: SchedulingConfig = match config.module_config("scheduling") {
        Some(raw) => serde_json::from_value(raw.clone())
            .context("Invalid [modules.scheduling] configuration")?,
        None => SchedulingConfig::default(),
    };
    tracing::info!(
        lead_minutes = scheduling_config.minimum_lead_minutes,
        allowance = scheduling_config.default_monthly_allowance,
        auto_confirm = scheduling_config.auto_confirm,
        "Scheduling module configured"
    );

    let service = Arc::new(SchedulingService::new(
        Arc::new(SeaOrmSchedulingStore::new(db)),
        Arc::new(StaticProviderConfig::new(&scheduling_config)),
        Arc::new(StaticCourseConfig::new(&scheduling_config)),
    ));

    let router = build_router(service, config.server.timeout_sec);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "Invalid listen address {}:{}",
                config.server.host, config.server.port
            )
        })?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("ClassGrid Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}

fn check_config(config: AppConfig) -> Result<()> {
    // AppConfig::load_* already normalized & created home_dir
    if let Some(db_config) = &config.database {
        validate_dsn(db_config)?;
    }
    if let Some(raw) = config.module_config("scheduling") {
        let _: SchedulingConfig = serde_json::from_value(raw.clone())
            .context("Invalid [modules.scheduling] configuration")?;
    }
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_memory_dsn_is_untouched() {
        let out = absolutize_sqlite_dsn("sqlite::memory:", Path::new("/srv"), false).unwrap();
        assert_eq!(out, "sqlite::memory:");
    }

    #[test]
    fn relative_sqlite_path_lands_under_base_dir() {
        let out =
            absolutize_sqlite_dsn("sqlite://database/app.db", Path::new("/srv/home"), false)
                .unwrap();
        assert_eq!(out, "sqlite:///srv/home/database/app.db?mode=rwc");
    }

    #[test]
    fn existing_query_keeps_mode() {
        let out = absolutize_sqlite_dsn(
            "sqlite:///var/db/app.db?mode=ro",
            Path::new("/srv"),
            false,
        )
        .unwrap();
        assert!(out.ends_with("?mode=ro"));
    }

    #[test]
    fn unsupported_scheme_is_rejected() {
        let cfg = DatabaseConfig {
            url: "mysql://root@localhost/db".to_string(),
            max_conns: None,
        };
        assert!(validate_dsn(&cfg).is_err());
    }
}
