use crate::{
    api::{attendance, dashboard, employee, health},
    config::Config,
    error::StoreError,
};
use actix_cors::Cors;
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use tracing::warn;

/// Registers the extractor configs, the unversioned helpers and the API
/// scope under `config.api_prefix`.
pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    // Helper to build the per-IP limiter
    fn build_limiter(requests_per_min: u32) -> Option<Governor<PeerIpKeyExtractor, NoOpMiddleware>> {
        let per_ms = (60_000 / u64::from(requests_per_min)).max(1);
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()?;
        Some(Governor::new(&cfg))
    }

    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| StoreError::validation("body", err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| StoreError::validation("query", err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| StoreError::validation("path", err.to_string()).into()),
    )
    .service(health::index)
    .service(health::health);

    let scope = web::scope(&config.api_prefix).configure(api_routes);
    if config.rate_api_per_min == 0 {
        cfg.service(scope);
        return;
    }
    match build_limiter(config.rate_api_per_min) {
        Some(limiter) => {
            cfg.service(scope.wrap(limiter));
        }
        None => {
            warn!(
                rate = config.rate_api_per_min,
                "Invalid rate limit configuration, serving without limiter"
            );
            cfg.service(scope);
        }
    }
}

/// Cross-origin policy for a separately served browser client. Preflight
/// requests are answered here and never reach the routes.
pub fn cors(config: &Config) -> Cors {
    let cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600);
    if config.cors_origins.iter().any(|o| o == "*") {
        return cors.allow_any_origin();
    }
    config
        .cors_origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}

fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/employees")
            // /employees
            .service(
                web::resource("")
                    .route(web::get().to(employee::list_employees))
                    .route(web::post().to(employee::create_employee)),
            )
            // /employees/{employee_id}
            .service(
                web::resource("/{employee_id}")
                    .route(web::get().to(employee::get_employee))
                    .route(web::delete().to(employee::delete_employee)),
            ),
    )
    .service(
        web::scope("/attendance")
            // /attendance
            .service(
                web::resource("")
                    .route(web::get().to(attendance::list_attendance))
                    .route(web::post().to(attendance::mark_attendance)),
            )
            // /attendance/{id}
            .service(
                web::resource("/{id}").route(web::delete().to(attendance::delete_attendance)),
            ),
    )
    .service(web::resource("/dashboard").route(web::get().to(dashboard::dashboard)));
}
