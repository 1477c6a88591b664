//! Transport trait and implementations
//!
//! The service only ever issues `GET` requests and only needs the status code
//! and body back. [`ReqwestTransport`] is the default; [`StaticTransport`]
//! serves canned responses for tests and offline use.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;

use crate::error::ApiError;

/// Status code and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl TransportResponse {
    /// Creates a new response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Creates a `200 OK` response.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns `true` for `404 Not Found`.
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// Trait for types that can fetch a URL.
///
/// Implementations return `Ok` for any response the server produced,
/// including error statuses; `Err` is reserved for failures to get a response
/// at all. Timeouts and cancellation belong to the implementation.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use odata_lib::transport::{Transport, TransportResponse};
/// use odata_lib::error::ApiError;
///
/// struct MyTransport;
///
/// #[async_trait]
/// impl Transport for MyTransport {
///     async fn get(&self, url: &str) -> Result<TransportResponse, ApiError> {
///         // ... perform the request ...
///         Ok(TransportResponse::ok("<feed/>"))
///     }
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs a `GET` request for the given absolute URL.
    async fn get(&self, url: &str) -> Result<TransportResponse, ApiError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn get(&self, url: &str) -> Result<TransportResponse, ApiError> {
        (**self).get(url).await
    }
}

/// A transport backed by a [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout: Option<Duration>,
}

impl ReqwestTransport {
    /// Creates a transport over an existing client.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    /// Sets a per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("DataServiceVersion", HeaderValue::from_static("1.0"));
        headers.insert("MaxDataServiceVersion", HeaderValue::from_static("2.0"));
        headers.insert(
            "Accept",
            HeaderValue::from_static("application/atom+xml,application/atomsvc+xml,application/xml"),
        );
        headers
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, ApiError> {
        let mut request = self.client.get(url).headers(Self::default_headers());

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(TransportResponse { status, body })
    }
}

/// A transport that serves registered responses and records every request.
///
/// Requests for unregistered URLs fail with [`ApiError::Transport`].
///
/// # Example
///
/// ```
/// use odata_lib::transport::StaticTransport;
///
/// let transport = StaticTransport::new()
///     .with_ok("http://example.org/svc/", "<service/>")
///     .with_response("http://example.org/svc/Dogs(1)", 404, "");
/// ```
#[derive(Debug, Default)]
pub struct StaticTransport {
    responses: Mutex<HashMap<String, TransportResponse>>,
    requests: Mutex<Vec<String>>,
}

impl StaticTransport {
    /// Creates a transport with no registered responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a response for a URL (builder pattern).
    pub fn with_response(self, url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        self.insert(url, TransportResponse::new(status, body));
        self
    }

    /// Registers a `200 OK` response for a URL (builder pattern).
    pub fn with_ok(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.with_response(url, 200, body)
    }

    /// Registers or replaces a response for a URL.
    pub fn insert(&self, url: impl Into<String>, response: TransportResponse) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(url.into(), response);
    }

    /// Returns every requested URL, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Returns how many times a URL was requested.
    pub fn request_count(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|requested| requested.as_str() == url)
            .count()
    }
}

#[async_trait]
impl Transport for StaticTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, ApiError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(url.to_string());

        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(url)
            .cloned()
            .ok_or_else(|| ApiError::Transport(format!("no response registered for {}", url)))
    }
}
