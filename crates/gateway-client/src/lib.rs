//! Thin HTTP client for talking to a running `gateway-server`, grounded
//! on `kairos-client`'s `GatewayClient`: a `reqwest::Client` wrapper with
//! typed responses and a `thiserror` error enum, pared down to the
//! endpoints FerroGateway actually exposes (`/healthz`, `/readyz`,
//! `/v1/models`) instead of the teacher's websocket/metrics surface.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid gateway URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("gateway returned {status}: {message}")]
    Gateway { status: u16, message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyStatus {
    pub status: String,
    pub providers_registered: usize,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEntry {
    pub id: String,
    pub owned_by: String,
    pub context_window: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelList {
    pub object: String,
    pub data: Vec<ModelEntry>,
}

/// Client for a single `gateway-server` instance.
pub struct GatewayClient {
    client: Client,
    base_url: Url,
}

impl GatewayClient {
    pub fn new(gateway_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(gateway_url)?;
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self { client, base_url })
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.base_url.join(path)?;
        let response = self.client.get(url).send().await?;
        if response.status().is_success() {
            Ok(response.json::<T>().await?)
        } else {
            Err(ClientError::Gateway {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            })
        }
    }

    /// `GET /healthz`: process liveness, regardless of provider state.
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        self.get_json("/healthz").await
    }

    /// `GET /readyz`: whether the gateway has at least one provider
    /// registered and can actually serve traffic.
    pub async fn ready(&self) -> Result<ReadyStatus, ClientError> {
        self.get_json("/readyz").await
    }

    /// `GET /v1/models`: the aggregated model list across every
    /// registered provider.
    pub async fn models(&self) -> Result<ModelList, ClientError> {
        self.get_json("/v1/models").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_an_unparseable_base_url() {
        let err = GatewayClient::new("not a url");
        assert!(matches!(err, Err(ClientError::InvalidUrl(_))));
    }

    #[test]
    fn accepts_a_well_formed_base_url() {
        assert!(GatewayClient::new("http://localhost:8080").is_ok());
    }
}
