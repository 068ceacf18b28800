//! HTTP transport abstraction for site backends.
//!
//! Backends speak to their site through the [`Transport`] trait so tests
//! can substitute scripted responses for the real network. The production
//! implementation wraps a `reqwest` client with a cookie store.

use crate::error::AdapterError;
use async_trait::async_trait;
use std::time::Duration;

/// Desktop browser user agent sent by default.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// A single outgoing request.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub url: String,
    pub method: Method,
}

/// Request method, with form data inline for POSTs.
#[derive(Debug, Clone)]
pub enum Method {
    Get,
    PostForm(Vec<(String, String)>),
}

impl TransportRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::Get,
        }
    }

    pub fn post_form(url: impl Into<String>, form: Vec<(String, String)>) -> Self {
        Self {
            url: url.into(),
            method: Method::PostForm(form),
        }
    }
}

/// A fetched response. `final_url` reflects redirects and is what gets
/// matched against the backend's routing table.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub final_url: String,
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Response body decoded as UTF-8, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// One blocking-style request/response exchange.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &TransportRequest) -> Result<TransportResponse, AdapterError>;
}

/// Production transport over `reqwest`, one instance per backend so each
/// backend's cookie jar stays its own.
pub struct HttpTransport {
    client: reqwest::Client,
    delay_between_requests_sec: f64,
}

impl HttpTransport {
    pub fn new(
        user_agent: &str,
        timeout_secs: u64,
        delay_between_requests_sec: f64,
    ) -> Result<Self, AdapterError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .cookie_store(true)
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            delay_between_requests_sec,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &TransportRequest) -> Result<TransportResponse, AdapterError> {
        if self.delay_between_requests_sec > 0.0 {
            tokio::time::sleep(Duration::from_secs_f64(self.delay_between_requests_sec)).await;
        }

        let builder = match &request.method {
            Method::Get => self.client.get(&request.url),
            Method::PostForm(form) => self.client.post(&request.url).form(form),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response.bytes().await?.to_vec();

        Ok(TransportResponse {
            final_url,
            status,
            body,
        })
    }
}
