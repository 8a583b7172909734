//! `POST /v1/images/generations` (spec §6): JSON in/out.

use std::sync::Arc;

use actix_web::{web, HttpResponse};
use gateway_core::{models::ImageRequest, Gateway};

use crate::error::HttpError;

pub async fn generate(gateway: web::Data<Arc<Gateway>>, body: web::Json<ImageRequest>) -> Result<HttpResponse, HttpError> {
    let response = gateway.generate_image(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/v1/images/generations", web::post().to(generate));
}
