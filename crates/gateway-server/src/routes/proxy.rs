//! `/v1/*` catch-all transparent reverse proxy (spec §6): any path under
//! `/v1` not claimed by a typed route above falls through to here, which
//! resolves a provider from `X-Provider` (preferred) or the `model` field
//! of the JSON body, strips gateway-internal headers, injects the
//! provider's own auth headers, and forwards the request byte-for-byte.
//! Grounded on `kairos-rs::routes::http`/`kairos-rs::services::http`'s
//! `RouteHandler::handle_request`, generalized from path-prefix routing
//! tables to provider capability lookup.

use std::sync::Arc;

use actix_web::{web, Error as ActixError, HttpRequest, HttpResponse};
use gateway_core::provider::Registry;
use gateway_core::Gateway;
use serde_json::json;

const STRIPPED_HEADERS: &[&str] = &["x-provider", "authorization", "host"];

pub async fn forward(req: HttpRequest, body: web::Bytes, gateway: web::Data<Arc<Gateway>>) -> Result<HttpResponse, ActixError> {
    let provider_header = req
        .headers()
        .get("X-Provider")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let model = serde_json::from_slice::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("model").and_then(|m| m.as_str().map(str::to_string)));

    let provider = provider_header
        .as_deref()
        .and_then(|name| gateway.provider(name))
        .or_else(|| model.as_deref().and_then(|m| gateway.provider_for_model(m)));

    let Some(provider) = provider else {
        return Ok(HttpResponse::NotFound().json(json!({
            "error": {
                "message": "no provider resolved for this request",
                "type": "not_found_error",
                "code": "provider_not_found",
            }
        })));
    };

    let Some(proxiable) = provider.as_proxiable() else {
        return Ok(HttpResponse::BadGateway().json(json!({
            "error": {
                "message": format!("provider '{}' does not support passthrough proxying", provider.name()),
                "type": "server_error",
                "code": "not_proxiable",
            }
        })));
    };

    let path = req.uri().path();
    let query = req.uri().query().map(|q| format!("?{q}")).unwrap_or_default();
    let url = format!("{}{path}{query}", proxiable.base_url());

    let client = reqwest::Client::new();
    let mut builder = client.request(req.method().clone(), &url).body(body.to_vec());

    for (name, value) in req.headers() {
        if STRIPPED_HEADERS.contains(&name.as_str().to_ascii_lowercase().as_str()) {
            continue;
        }
        if let Ok(value_str) = value.to_str() {
            builder = builder.header(name.as_str(), value_str);
        }
    }
    for (key, value) in proxiable.auth_headers() {
        builder = builder.header(key, value);
    }

    let upstream = builder.send().await.map_err(actix_web::error::ErrorBadGateway)?;
    let status = upstream.status().as_u16();
    let upstream_body = upstream.bytes().await.map_err(actix_web::error::ErrorBadGateway)?;

    let status_code = actix_web::http::StatusCode::from_u16(status).unwrap_or(actix_web::http::StatusCode::BAD_GATEWAY);
    Ok(HttpResponse::build(status_code)
        .insert_header(("X-Gateway-Provider", provider.name()))
        .body(upstream_body))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/v1/{tail:.*}").to(forward));
}
