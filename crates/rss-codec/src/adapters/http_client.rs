//! HTTP adapter for the remote codec service.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use tracing::debug;

use super::schema;
use crate::domain::{
    ApiRevision, DecodeRequest, DecodeResult, EncodingRequest, EncodingResult, SimulationRequest,
    SimulationResult, StudioConfig, StudioError,
};
use crate::ports::{CodecService, ServiceHealth};

/// Codec service reached over HTTP/JSON.
pub struct HttpCodecService {
    client: Client,
    config: StudioConfig,
}

impl HttpCodecService {
    /// Create a client using the configured timeouts.
    pub fn new(config: StudioConfig) -> Result<Self, StudioError> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeouts.request)
            .connect_timeout(config.timeouts.connect)
            .build()
            .map_err(|e| StudioError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// API revision in use.
    pub fn revision(&self) -> ApiRevision {
        self.config.api_revision
    }

    /// Base URL in use.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    async fn post(&self, endpoint: &str, body: &Value) -> Result<String, StudioError> {
        let url = self.config.endpoint(endpoint);
        debug!(%url, "dispatching request");
        self.send(&url, self.client.post(&url).json(body)).await
    }

    /// Send a request and return the body of a 2xx response.
    ///
    /// Transport failures are `RemoteUnavailable`; a non-2xx answer is
    /// `RemoteError`.
    async fn send(&self, url: &str, request: RequestBuilder) -> Result<String, StudioError> {
        let response = request.send().await.map_err(|e| classify(url, e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                StudioError::RemoteUnavailable(format!("response from {url} timed out"))
            } else {
                StudioError::RemoteUnavailable(format!("failed to read response body: {e}"))
            }
        })?;

        if !status.is_success() {
            return Err(schema::http_error(status.as_u16(), &body));
        }
        Ok(body)
    }
}

/// Map a failed send onto the error taxonomy.
///
/// Only connect, timeout and transport failures route onto the fallback. A
/// request that cannot even be built is a configuration problem.
fn classify(url: &str, e: reqwest::Error) -> StudioError {
    if e.is_builder() {
        StudioError::Config(format!("cannot build request for {url}: {e}"))
    } else if e.is_connect() {
        StudioError::RemoteUnavailable(format!("cannot connect to {url}"))
    } else if e.is_timeout() {
        StudioError::RemoteUnavailable(format!("request to {url} timed out"))
    } else if e.is_request() {
        StudioError::RemoteUnavailable(e.to_string())
    } else {
        StudioError::RemoteError {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

#[async_trait]
impl CodecService for HttpCodecService {
    async fn encode(&self, request: &EncodingRequest) -> Result<EncodingResult, StudioError> {
        let body = schema::encode_body(request, self.revision());
        let response = self.post("encode", &body).await?;
        schema::parse_encode(&response)
    }

    async fn simulate(
        &self,
        request: &SimulationRequest,
    ) -> Result<SimulationResult, StudioError> {
        let body = schema::simulate_body(request, self.revision());
        let response = self.post("simulate", &body).await?;
        schema::parse_simulate(&response, request)
    }

    async fn decode(&self, request: &DecodeRequest) -> Result<DecodeResult, StudioError> {
        let body = schema::decode_body(request, self.revision());
        let response = self.post("decode", &body).await?;
        schema::parse_decode(&response, request)
    }

    async fn health(&self) -> Result<ServiceHealth, StudioError> {
        let url = self.config.endpoint("health");
        let response = self.send(&url, self.client.get(&url)).await?;
        schema::parse_health(&response)
    }
}
