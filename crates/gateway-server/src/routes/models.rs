//! `GET /v1/models` (spec §6): aggregated list `{object:"list", data:[...]}`.

use std::sync::Arc;

use actix_web::{web, HttpResponse};
use gateway_core::provider::Registry;
use gateway_core::Gateway;
use serde_json::json;

pub async fn list(gateway: web::Data<Arc<Gateway>>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "object": "list",
        "data": gateway.aggregated_models(),
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/v1/models", web::get().to(list));
}
