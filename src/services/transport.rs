use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Request headers as name/value pairs
pub type Headers = Vec<(&'static str, String)>;

/// Errors raised before a status code was received
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Raw response handed back by a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Minimal HTTP surface the harvester needs
///
/// Implementations only move bytes: no retries, no status interpretation.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(
        &self,
        url: &str,
        headers: &[(&'static str, String)],
        body: &Value,
    ) -> Result<TransportResponse, TransportError>;

    async fn get(
        &self,
        url: &str,
        headers: &[(&'static str, String)],
    ) -> Result<TransportResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn post(
        &self,
        url: &str,
        headers: &[(&'static str, String)],
        body: &Value,
    ) -> Result<TransportResponse, TransportError> {
        (**self).post(url, headers, body).await
    }

    async fn get(
        &self,
        url: &str,
        headers: &[(&'static str, String)],
    ) -> Result<TransportResponse, TransportError> {
        (**self).get(url, headers).await
    }
}

/// Transport backed by a pooled `reqwest` client
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with a per-request timeout
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<TransportResponse, TransportError> {
        let response = request.send().await.map_err(classify_reqwest_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.text().await.map_err(classify_reqwest_error)?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

fn classify_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(err.to_string())
    } else if err.is_connect() {
        TransportError::Connection(err.to_string())
    } else {
        TransportError::Request(err)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post(
        &self,
        url: &str,
        headers: &[(&'static str, String)],
        body: &Value,
    ) -> Result<TransportResponse, TransportError> {
        let mut request = self.client.post(url);
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }
        // json() keeps an explicit Content-Type if one was set above
        self.send(request.json(body)).await
    }

    async fn get(
        &self,
        url: &str,
        headers: &[(&'static str, String)],
    ) -> Result<TransportResponse, TransportError> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }
        self.send(request).await
    }
}
