use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use dotenvy::dotenv;
use hrms_lite::config::Config;
use hrms_lite::db::{MySqlPersistence, ensure_schema, init_db};
use hrms_lite::docs::ApiDoc;
use hrms_lite::routes;
use hrms_lite::store::AttendanceStore;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Daily rolling log file; the guard must live as long as the process.
fn init_tracing(log_dir: &str) -> WorkerGuard {
    let file_appender = rolling::daily(log_dir, "app.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    guard
}

async fn build_store(config: &Config) -> anyhow::Result<AttendanceStore> {
    match &config.database_url {
        Some(url) => {
            let pool = init_db(url).await?;
            ensure_schema(&pool).await?;
            AttendanceStore::load(Arc::new(MySqlPersistence::new(pool))).await
        }
        None => {
            warn!("DATABASE_URL not set, data will not survive a restart");
            Ok(AttendanceStore::in_memory())
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;
    let _guard = init_tracing(&config.log_dir);

    info!(addr = %config.server_addr, prefix = %config.api_prefix, "Server starting...");

    let store = Data::new(build_store(&config).await?);
    let server_addr = config.server_addr.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .wrap(routes::cors(&config))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // wildcard so JS/CSS assets resolve
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(store.clone())
            .configure(|cfg| routes::configure(cfg, &config))
    })
    .bind(server_addr)?
    .run()
    .await?;

    info!("Server stopped");
    Ok(())
}
