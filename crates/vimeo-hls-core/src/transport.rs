//! HTTP transport used by the Vimeo resolver
//!
//! `reqwest` drives `fetch` on `wasm32` and hyper natively, so the same
//! transport serves the browser widget and the CLI.

use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

/// Outgoing GET request
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: Url,
    pub headers: Vec<(&'static str, String)>,
}

impl HttpRequest {
    pub fn get(url: Url) -> Self {
        Self { url, headers: Vec::new() }
    }

    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Add an `Authorization: bearer <token>` header
    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("bearer {}", token))
    }

    /// Value of the first header with the given name (case-insensitive)
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Response status and body text
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Minimal async GET transport
///
/// Futures are `?Send`: in the browser everything runs on one event loop.
#[async_trait(?Send)]
pub trait HttpTransport {
    /// Perform the request. Transport-level failures (the request never
    /// produced a response) are reported as `CorsBlocked` in the browser
    /// and `Network` elsewhere.
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// `reqwest`-backed transport
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

fn send_failure(url: &Url, err: reqwest::Error) -> Error {
    if cfg!(target_arch = "wasm32") {
        // fetch() rejects without detail when the response is not CORS-readable
        debug!(url = %url, error = %err, "fetch rejected");
        Error::CorsBlocked { url: url.to_string() }
    } else {
        Error::network(format!("{}: {}", url, err))
    }
}

#[async_trait(?Send)]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = self.client.get(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(*name, value.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| send_failure(&request.url, e))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| send_failure(&request.url, e))?;

        debug!(url = %request.url, status, bytes = body.len(), "GET complete");

        Ok(HttpResponse { status, body })
    }
}
