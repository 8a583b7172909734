//! `POST /v1/chat/completions` (spec §6): JSON in, JSON out unless
//! `stream:true`, in which case the response body is `text/event-stream`
//! with one `data: <chunk>\n\n` line per item and a terminal
//! `data: [DONE]\n\n`, or a single error event instead of `[DONE]` when
//! the upstream stream ends in error (spec §4.6).

use std::sync::Arc;

use actix_web::{web, HttpResponse};
use async_stream::stream;
use futures_util::{pin_mut, StreamExt};
use gateway_core::{models::ChatRequest, streaming, Gateway};

use crate::error::HttpError;

pub async fn complete(gateway: web::Data<Arc<Gateway>>, body: web::Json<ChatRequest>) -> Result<HttpResponse, HttpError> {
    let request = body.into_inner();

    if !request.stream {
        let response = gateway.route(request).await?;
        return Ok(HttpResponse::Ok().json(response));
    }

    let model = request.model.clone();
    let chunk_stream = gateway.route_stream(request).await?;

    let body_stream = stream! {
        pin_mut!(chunk_stream);
        let mut errored = false;
        while let Some(item) = chunk_stream.next().await {
            let chunk = match item {
                Ok(chunk) => chunk,
                Err(err) => {
                    errored = true;
                    streaming::error_chunk(&model, err.to_string())
                }
            };
            let data = serde_json::to_string(&chunk).unwrap_or_default();
            yield Ok::<_, actix_web::Error>(web::Bytes::from(format!("data: {data}\n\n")));
            if errored {
                break;
            }
        }
        if !errored {
            yield Ok(web::Bytes::from_static(b"data: [DONE]\n\n"));
        }
    };

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(body_stream))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/v1/chat/completions", web::post().to(complete));
}
