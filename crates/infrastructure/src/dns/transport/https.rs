//! HTTPS Transport for DNS queries: DNS-over-HTTPS (RFC 8484)
//!
//! Sends DNS queries as HTTP GET requests, the wire-format query carried
//! base64url-encoded (no padding) in the `dns` parameter. The response body
//! is the raw DNS wire format response.
//!
//! Requires the `dns-over-https` feature flag.
//!
//! Wire format (HTTP):
//! ```text
//! GET /dns-query?dns=AAABAAABAAAAAAAAB2V4YW1wbGUDY29tAAABAAE HTTP/1.1
//! Accept: application/dns-message
//! ```

use super::{bounded, DnsTransport, TransportResponse};
use async_trait::async_trait;
use base64::prelude::BASE64_URL_SAFE_NO_PAD;
use base64::Engine;
use ferrous_lookup_domain::DomainError;
use reqwest::header::ACCEPT;
use reqwest::{StatusCode, Url};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Media type for DNS-over-HTTPS requests and responses (RFC 8484 §6)
pub const DNS_MESSAGE_CONTENT_TYPE: &str = "application/dns-message";

/// DNS-over-HTTPS transport (RFC 8484)
///
/// Each transport owns its client; nothing is shared between transports.
pub struct HttpsTransport {
    url: Url,
    client: reqwest::Client,
    connect_timeout: Duration,
    max_response_bytes: usize,
}

impl HttpsTransport {
    pub fn new(
        url: &str,
        connect_timeout: Duration,
        max_response_bytes: usize,
    ) -> Result<Self, DomainError> {
        let url = Url::parse(url)
            .map_err(|e| DomainError::Configuration(format!("Invalid DoH URL '{}': {}", url, e)))?;

        if !matches!(url.scheme(), "https" | "http") {
            return Err(DomainError::Configuration(format!(
                "DoH URL must use http or https: {}",
                url
            )));
        }

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| {
                DomainError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            url,
            client,
            connect_timeout,
            max_response_bytes,
        })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// GET URL for `message_bytes`: the endpoint with `dns=<base64url>` added
    /// to whatever query string it already carries.
    pub fn request_url(&self, message_bytes: &[u8]) -> Url {
        let encoded = BASE64_URL_SAFE_NO_PAD.encode(message_bytes);
        let mut url = self.url.clone();
        url.query_pairs_mut().append_pair("dns", &encoded);
        url
    }

    /// The client carries no overall timeout, so a reqwest timeout can only
    /// be the connect bound.
    fn request_error(&self, e: reqwest::Error) -> DomainError {
        if e.is_timeout() {
            DomainError::Timeout {
                server: self.url.to_string(),
                operation: "connecting to",
                timeout_ms: self.connect_timeout.as_millis() as u64,
            }
        } else {
            DomainError::Network {
                url: self.url.to_string(),
                reason: e.to_string(),
            }
        }
    }

    /// Reads the whole body, failing as soon as it is known to exceed the cap.
    async fn read_body(&self, mut response: reqwest::Response) -> Result<Vec<u8>, DomainError> {
        let announced = response.content_length().map(|len| len as usize);
        if let Some(size) = announced {
            if size > self.max_response_bytes {
                return Err(self.too_large(size));
            }
        }

        let mut body = Vec::with_capacity(announced.unwrap_or(512));
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.request_error(e))?
        {
            append_bounded(&mut body, &chunk, self.max_response_bytes)
                .map_err(|size| self.too_large(size))?;
        }

        Ok(body)
    }

    /// Best-effort read of an error body for diagnostics, cut at the cap.
    async fn read_error_body(&self, mut response: reqwest::Response) -> String {
        let mut body = Vec::new();
        while let Ok(Some(chunk)) = response.chunk().await {
            let room = self.max_response_bytes.saturating_sub(body.len());
            body.extend_from_slice(&chunk[..chunk.len().min(room)]);
            if body.len() >= self.max_response_bytes {
                break;
            }
        }
        String::from_utf8_lossy(&body).into_owned()
    }

    fn too_large(&self, size: usize) -> DomainError {
        DomainError::ResponseTooLarge {
            source_name: self.url.to_string(),
            size,
            limit: self.max_response_bytes,
        }
    }

    async fn exchange(&self, message_bytes: &[u8]) -> Result<Vec<u8>, DomainError> {
        let response = self
            .client
            .get(self.request_url(message_bytes))
            .header(ACCEPT, DNS_MESSAGE_CONTENT_TYPE)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = self.read_error_body(response).await;
            warn!(url = %self.url, status = status.as_u16(), "DoH server returned error status");
            return Err(DomainError::Server {
                url: self.url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        if content_type.as_deref() != Some(DNS_MESSAGE_CONTENT_TYPE) {
            debug!(url = %self.url, content_type = ?content_type, "Unexpected DoH content type");
        }

        self.read_body(response).await
    }
}

/// Appends `chunk` unless that would take `body` past `limit`; on overflow
/// returns the size the body would have reached.
pub(crate) fn append_bounded(body: &mut Vec<u8>, chunk: &[u8], limit: usize) -> Result<(), usize> {
    let new_len = body.len() + chunk.len();
    if new_len > limit {
        return Err(new_len);
    }
    body.extend_from_slice(chunk);
    Ok(())
}

#[async_trait]
impl DnsTransport for HttpsTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<TransportResponse, DomainError> {
        debug!(
            url = %self.url,
            message_len = message_bytes.len(),
            "Sending DoH query"
        );

        let url = self.url.to_string();
        let response_bytes = bounded(
            self.exchange(message_bytes),
            timeout,
            cancel,
            &url,
            "waiting for DoH response from",
        )
        .await?;

        debug!(
            url = %self.url,
            response_len = response_bytes.len(),
            "DoH response received"
        );

        Ok(TransportResponse {
            bytes: response_bytes,
            protocol_used: "HTTPS",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "HTTPS"
    }
}
