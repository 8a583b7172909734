//! Liveness/readiness endpoints, grounded on `kairos-rs::routes::health`.

use actix_web::{web, HttpResponse, Result};
use gateway_core::provider::Registry;
use gateway_core::Gateway;
use serde_json::json;
use std::sync::Arc;

pub async fn healthz() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}

pub async fn readyz(gateway: web::Data<Arc<Gateway>>) -> Result<HttpResponse> {
    let ready = !gateway.providers().is_empty();
    let status = if ready { "ready" } else { "not_ready" };
    let code = if ready { 200 } else { 503 };
    Ok(HttpResponse::build(actix_web::http::StatusCode::from_u16(code).unwrap()).json(json!({
        "status": status,
        "providers_registered": gateway.providers().len(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/healthz", web::get().to(healthz))
        .route("/readyz", web::get().to(readyz));
}
