//! FerroGateway HTTP server.
//!
//! High-performance OpenAI-compatible reverse proxy built with Rust and
//! Actix Web, grounded on `kairos-gateway`'s own `main.rs`: load and
//! validate config, wire up the registered middleware stack, bind, and
//! shut down gracefully on SIGINT without severing in-flight streams.

mod bootstrap;
mod error;
mod routes;

use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{middleware::Logger, web, App, HttpServer};
use gateway_core::config::load_config;
use gateway_core::logs::logger;
use gateway_core::Gateway;
use log::{error, info};
use tokio::signal;

fn env_u32(name: &str, default: u32) -> u32 {
    std::env::var(name).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    logger::configure();

    let config = load_config(None).expect("failed to load gateway configuration");
    let gateway = Arc::new(Gateway::new(config).expect("configuration failed validation"));

    let registered = bootstrap::register_configured_providers(&gateway).await;
    if registered == 0 {
        log::warn!("no provider API keys found in the environment; /readyz will report not-ready");
    }

    gateway
        .load_plugins()
        .await
        .expect("failed to build configured plugins");

    let discovery_interval = Duration::from_secs(u64::from(env_u32("DISCOVERY_INTERVAL_SECS", 300)));
    gateway.start_discovery(discovery_interval);

    let host = "0.0.0.0".to_string();
    let port = env_u32("PORT", 8080) as u16;

    let cors_origins = std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
    let rate_limit_rps = env_u32("RATE_LIMIT_RPS", 100);
    let rate_limit_burst = env_u32("RATE_LIMIT_BURST", 200);

    let governor_conf = GovernorConfigBuilder::default()
        .per_second(u64::from(rate_limit_rps))
        .burst_size(rate_limit_burst)
        .finish()
        .expect("rate limit configuration is valid");

    info!("starting FerroGateway on {host}:{port} ({registered} providers registered)");

    let gateway_data = gateway.clone();
    let server = HttpServer::new(move || {
        let cors = if cors_origins == "*" {
            Cors::permissive()
        } else {
            cors_origins
                .split(',')
                .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin.trim()))
                .allow_any_method()
                .allow_any_header()
        };

        App::new()
            .app_data(web::Data::new(gateway_data.clone()))
            .app_data(web::PayloadConfig::new(10 * 1024 * 1024))
            .wrap(Governor::new(&governor_conf))
            .wrap(cors)
            .wrap(Logger::new(r#"%a "%r" %s %b "%{Referer}i" "%{User-Agent}i" %T"#))
            .configure(routes::health::configure)
            .configure(routes::models::configure)
            .configure(routes::chat::configure)
            .configure(routes::embeddings::configure)
            .configure(routes::images::configure)
            .configure(routes::proxy::configure)
    })
    .bind((host.as_str(), port))?
    .run();

    tokio::select! {
        result = server => {
            match result {
                Ok(_) => info!("server stopped gracefully"),
                Err(e) => error!("server error: {e}"),
            }
        }
        _ = signal::ctrl_c() => {
            info!("received shutdown signal, stopping server...");
        }
    }

    Ok(())
}
