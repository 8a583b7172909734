//! Maps `gateway_core::GatewayError` to the `{"error": {...}}` HTTP
//! envelope from spec §6, the same boundary `kairos-rs::models::error`
//! draws between a domain error and its Actix `ResponseError` impl.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use gateway_core::GatewayError;
use serde_json::json;

pub struct HttpError(pub GatewayError);

impl From<GatewayError> for HttpError {
    fn from(err: GatewayError) -> Self {
        HttpError(err)
    }
}

impl std::fmt::Debug for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.0, f)
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl ResponseError for HttpError {
    fn status_code(&self) -> StatusCode {
        match self.0 {
            GatewayError::Validation(_)
            | GatewayError::UnknownModel(_)
            | GatewayError::PluginRejected(_) => StatusCode::BAD_REQUEST,
            GatewayError::CircuitOpen(_) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::NoStreamingProvider(_) => StatusCode::BAD_REQUEST,
            GatewayError::Cancelled => StatusCode::BAD_REQUEST,
            GatewayError::Provider { .. } | GatewayError::AllFailed(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": {
                "message": self.0.to_string(),
                "type": self.0.error_type(),
                "code": self.0.error_code(),
            }
        }))
    }
}
