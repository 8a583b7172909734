//! Error types surfaced by the routing and resilience core.
//!
//! `GatewayError` is deliberately HTTP-agnostic: the concrete status code
//! and `{"error": {...}}` envelope are assembled by `gateway-server` at the
//! edge, the same way `kairos-rs` keeps `GatewayError` free of `actix_web`
//! types inside the library and only maps it to a response in the binary
//! that owns the HTTP framework.

use thiserror::Error;

/// Errors visible to callers of the Gateway (spec §7).
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("no registered provider supports model '{0}'")]
    UnknownModel(String),

    #[error("request rejected: {0}")]
    PluginRejected(String),

    #[error("circuit breaker open for target '{0}'")]
    CircuitOpen(String),

    #[error("provider '{provider}' error: {message}")]
    Provider { provider: String, message: String },

    #[error("no streaming-capable provider available for model '{0}'")]
    NoStreamingProvider(String),

    #[error("request cancelled")]
    Cancelled,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("all providers failed, last error: {0}")]
    AllFailed(String),
}

/// Broad classification used by callers (HTTP edge, hooks) that need to
/// react to error categories without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    UnknownModel,
    PluginRejection,
    CircuitOpen,
    Provider,
    NoStreamingProvider,
    Cancellation,
    Config,
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Validation(_) => ErrorKind::Validation,
            GatewayError::UnknownModel(_) => ErrorKind::UnknownModel,
            GatewayError::PluginRejected(_) => ErrorKind::PluginRejection,
            GatewayError::CircuitOpen(_) => ErrorKind::CircuitOpen,
            GatewayError::Provider { .. } => ErrorKind::Provider,
            GatewayError::NoStreamingProvider(_) => ErrorKind::NoStreamingProvider,
            GatewayError::Cancelled => ErrorKind::Cancellation,
            GatewayError::Config(_) => ErrorKind::Config,
            GatewayError::AllFailed(_) => ErrorKind::Provider,
        }
    }

    /// The `type` field of the `{"error": {...}}` envelope from spec §6.
    pub fn error_type(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Validation | ErrorKind::UnknownModel | ErrorKind::PluginRejection => {
                "invalid_request_error"
            }
            ErrorKind::CircuitOpen | ErrorKind::Provider | ErrorKind::NoStreamingProvider => {
                "server_error"
            }
            ErrorKind::Cancellation => "server_error",
            ErrorKind::Config => "server_error",
        }
    }

    /// A stable short code, independent of the human-readable message.
    pub fn error_code(&self) -> &'static str {
        match self {
            GatewayError::Validation(_) => "invalid_request",
            GatewayError::UnknownModel(_) => "unknown_model",
            GatewayError::PluginRejected(_) => "plugin_rejected",
            GatewayError::CircuitOpen(_) => "circuit_open",
            GatewayError::Provider { .. } => "provider_error",
            GatewayError::NoStreamingProvider(_) => "no_streaming_provider",
            GatewayError::Cancelled => "cancelled",
            GatewayError::Config(_) => "config_error",
            GatewayError::AllFailed(_) => "all_providers_failed",
        }
    }
}
