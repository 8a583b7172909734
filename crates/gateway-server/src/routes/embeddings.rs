//! `POST /v1/embeddings` (spec §6): JSON in/out.

use std::sync::Arc;

use actix_web::{web, HttpResponse};
use gateway_core::{models::EmbeddingRequest, Gateway};

use crate::error::HttpError;

pub async fn embed(gateway: web::Data<Arc<Gateway>>, body: web::Json<EmbeddingRequest>) -> Result<HttpResponse, HttpError> {
    let response = gateway.embed(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/v1/embeddings", web::post().to(embed));
}
