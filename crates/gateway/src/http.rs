use std::time::Duration;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use claimdesk_core::config::ApiConfig;

use crate::error::{GatewayError, GatewayResult};

/// Backend response envelope: `{ success, data, message? }`. A non-2xx
/// status or `success: false` is always surfaced as an error.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

pub(crate) fn unwrap_envelope<T>(envelope: Envelope<T>) -> GatewayResult<T> {
    if !envelope.success {
        return Err(GatewayError::Api(
            envelope.message.unwrap_or_else(|| "backend reported failure".to_string()),
        ));
    }

    envelope
        .data
        .ok_or_else(|| GatewayError::InvalidResponse("envelope is missing `data`".to_string()))
}

pub(crate) fn classify_status(status: StatusCode, body: String) -> GatewayError {
    match status {
        StatusCode::UNAUTHORIZED => GatewayError::Unauthorized,
        StatusCode::FORBIDDEN => GatewayError::Forbidden(body),
        StatusCode::NOT_FOUND => GatewayError::NotFound(body),
        StatusCode::CONFLICT => GatewayError::Conflict(body),
        StatusCode::BAD_REQUEST => GatewayError::Validation(body),
        _ => GatewayError::Api(body),
    }
}

/// HTTP implementation of the remote data gateway. Attaches the bearer token
/// when present and unwraps the JSON envelope on every call.
#[derive(Clone, Debug)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    token: Option<SecretString>,
}

impl HttpGateway {
    pub fn new(base_url: &str, timeout_secs: u64) -> GatewayResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()?;

        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string(), token: None })
    }

    pub fn from_config(config: &ApiConfig) -> GatewayResult<Self> {
        let mut gateway = Self::new(&config.base_url, config.timeout_secs)?;
        gateway.token = config.token.clone();
        Ok(gateway)
    }

    pub fn set_token(&mut self, token: SecretString) {
        self.token = Some(token);
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|token| format!("Bearer {}", token.expose_secret()))
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> GatewayResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.get(&url);

        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> GatewayResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.post(&url).json(body);

        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> GatewayResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.put(&url).json(body);

        if let Some(auth) = self.auth_header() {
            request = request.header(reqwest::header::AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> GatewayResult<T> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, body));
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|error| GatewayError::InvalidResponse(error.to_string()))?;
        unwrap_envelope(envelope)
    }

    /// Backend reachability probe; only the envelope's `success` flag matters.
    pub async fn ping(&self) -> GatewayResult<()> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, body));
        }

        let envelope: Envelope<serde_json::Value> = response
            .json()
            .await
            .map_err(|error| GatewayError::InvalidResponse(error.to_string()))?;
        if !envelope.success {
            return Err(GatewayError::Api(
                envelope.message.unwrap_or_else(|| "health check failed".to_string()),
            ));
        }

        Ok(())
    }
}
