//! HTTP transport implementation using `reqwest`.

use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};

use crate::{
    ApiRequest, ApiResponse, DEFAULT_REQUEST_TIMEOUT, Method, Transport,
    TransportError,
};

/// A `reqwest`-backed [`Transport`] bound to one API base URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with the default 10 s timeout.
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Creates a transport with a custom client-level timeout.
    pub fn with_timeout(
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| {
                TransportError::RequestFailed(format!(
                    "failed to create HTTP client: {e}"
                ))
            })?;

        let base_url = base_url.trim_end_matches('/').to_string();
        tracing::debug!(%base_url, timeout_ms = timeout.as_millis() as u64, "HTTP transport ready");

        Ok(Self {
            base_url,
            timeout,
            client,
        })
    }

    /// The base URL every request path is appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn map_error(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(self.timeout.as_millis() as u64)
        } else if err.is_connect() {
            TransportError::ConnectFailed(err.to_string())
        } else {
            TransportError::RequestFailed(err.to_string())
        }
    }
}

impl Transport for HttpTransport {
    async fn send(
        &self,
        request: ApiRequest,
    ) -> Result<ApiResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        tracing::debug!(method = %request.method, %url, "sending request");

        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Delete => self.client.delete(&url),
        };
        if let Some(auth) = &request.authorization {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| self.map_error(e))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::ReceiveFailed(e.to_string()))?
            .to_vec();

        tracing::debug!(method = %request.method, %url, status, "response received");
        Ok(ApiResponse { status, body })
    }
}
