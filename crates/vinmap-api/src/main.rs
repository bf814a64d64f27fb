//! vinmap-api server binary.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vinmap_api::{build_router, AdminGate, AppState, ServerConfig, StorageKind, WineStore};
use vinmap_core::WineRepository;
use vinmap_db::{Database, MemoryWineRepository, PoolConfig};
use vinmap_inference::AnthropicGateway;

const DEFAULT_LOG_FILTER: &str = "vinmap_api=debug,vinmap_inference=debug,tower_http=debug";

/// Install the tracing subscriber.
///
/// Environment:
///   LOG_FORMAT  - "json" or "text" (default "text")
///   LOG_FILE    - optional log file path, rotated daily
///   LOG_ANSI    - "true"/"false" to force ANSI colors
///   RUST_LOG    - env filter
///
/// The returned guard must live as long as file logging is wanted.
fn init_logging() -> (String, Option<String>, Option<WorkerGuard>) {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok().filter(|p| !p.trim().is_empty());
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");
    let json = log_format == "json";

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(env_filter);

    let guard = match log_file.as_deref() {
        Some(path) => {
            let path = Path::new(path);
            let dir = path.parent().unwrap_or(Path::new("."));
            let file_name = path
                .file_name()
                .and_then(|f| f.to_str())
                .unwrap_or("vinmap-api.log");
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, file_name));

            if json {
                registry
                    .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
                    .init();
            } else {
                registry
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_writer(writer)
                            .with_ansi(log_ansi.unwrap_or(false)),
                    )
                    .init();
            }
            Some(guard)
        }
        None => {
            if json {
                registry.with(tracing_subscriber::fmt::layer().json()).init();
            } else {
                let mut layer = tracing_subscriber::fmt::layer();
                if let Some(ansi) = log_ansi {
                    layer = layer.with_ansi(ansi);
                }
                registry.with(layer).init();
            }
            None
        }
    };

    (log_format, log_file, guard)
}

async fn open_repository(config: &ServerConfig) -> anyhow::Result<Arc<dyn WineRepository>> {
    match (config.storage, config.database_url.as_deref()) {
        (StorageKind::Postgres, Some(url)) => {
            let pool_config = PoolConfig::new().max_connections(config.db_max_connections);
            let db = Database::connect_with_config(url, pool_config).await?;
            db.migrate().await?;
            info!(subsystem = "db", "Database migrations applied");
            Ok(Arc::new(db.wines.clone()))
        }
        (StorageKind::Postgres, None) => {
            anyhow::bail!("postgres storage selected without DATABASE_URL")
        }
        (StorageKind::Memory, _) => Ok(Arc::new(MemoryWineRepository::new())),
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let (log_format, log_file, _log_guard) = init_logging();
    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    let config = ServerConfig::from_env()?;

    let repo = open_repository(&config).await?;
    let wines = WineStore::new(repo);
    wines.load().await?;

    let admin = AdminGate::new(
        config.admin_password_hash.clone(),
        config.admin_session_ttl,
    );
    if !admin.is_configured() {
        tracing::warn!("ADMIN_PASSWORD_HASH is not set; admin login is disabled");
    }

    let gateway = AnthropicGateway::new(config.gateway.clone())?;
    info!(
        storage = %config.storage,
        gateway = %config.gateway.base_url,
        mode = %config.enrich.mode,
        "Server configured"
    );

    let app = build_router(AppState {
        wines,
        admin,
        gateway: Arc::new(gateway),
        enrich: Arc::new(config.enrich.clone()),
    });

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
