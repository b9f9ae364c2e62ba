#[cfg(feature = "dns-over-https")]
pub mod https;
pub mod tcp;

use super::forwarding::{DnsResponse, MessageBuilder, ResponseParser};
use async_trait::async_trait;
use ferrous_lookup_domain::{DnsQuery, DomainError, LookupConfig, LookupMethod, UpstreamAddr};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct TransportResponse {
    pub bytes: Vec<u8>,

    pub protocol_used: &'static str,
}

/// Moves one encoded query to a server and returns the complete response
/// bytes. Implementations own their connection for the duration of the call
/// and release it on every return path.
#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<TransportResponse, DomainError>;

    fn protocol_name(&self) -> &'static str;
}

pub enum Transport {
    Tcp(tcp::TcpTransport),
    #[cfg(feature = "dns-over-https")]
    Https(https::HttpsTransport),
}

impl Transport {
    pub async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<TransportResponse, DomainError> {
        match self {
            Self::Tcp(t) => DnsTransport::send(t, message_bytes, timeout, cancel).await,
            #[cfg(feature = "dns-over-https")]
            Self::Https(t) => DnsTransport::send(t, message_bytes, timeout, cancel).await,
        }
    }

    pub fn protocol_name(&self) -> &'static str {
        match self {
            Self::Tcp(_) => "TCP",
            #[cfg(feature = "dns-over-https")]
            Self::Https(_) => "HTTPS",
        }
    }

    /// Encode `query`, exchange it over this transport and decode the reply.
    pub async fn resolve(
        &self,
        query: &DnsQuery,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<DnsResponse, DomainError> {
        let (id, message_bytes) = MessageBuilder::build(query)?;

        debug!(
            domain = %query.domain,
            record_type = %query.record_type,
            protocol = self.protocol_name(),
            "Resolving"
        );

        let response = self.send(&message_bytes, timeout, cancel).await?;
        let parsed = ResponseParser::parse(&response.bytes)?;

        if parsed.id() != id {
            warn!(
                expected = id,
                received = parsed.id(),
                protocol = response.protocol_used,
                "Response ID does not match query ID"
            );
        }

        Ok(parsed)
    }
}

pub fn create_transport(
    method: LookupMethod,
    config: &LookupConfig,
) -> Result<Transport, DomainError> {
    match method {
        LookupMethod::Tcp => {
            let addr: UpstreamAddr = config.tcp_server.parse()?;
            Ok(Transport::Tcp(
                tcp::TcpTransport::new(addr).with_connect_timeout(config.connect_timeout()),
            ))
        }

        #[cfg(feature = "dns-over-https")]
        LookupMethod::Doh => Ok(Transport::Https(https::HttpsTransport::new(
            &config.doh_url,
            config.connect_timeout(),
            config.max_response_bytes,
        )?)),

        #[cfg(not(feature = "dns-over-https"))]
        LookupMethod::Doh => Err(DomainError::Configuration(format!(
            "HTTPS feature not enabled. Enable 'dns-over-https' feature to use: {}",
            config.doh_url
        ))),
    }
}

/// Runs `operation` under a timeout, aborting early if `cancel` fires.
/// Dropping the future on either path drops whatever it owns.
pub(crate) async fn bounded<F, T>(
    operation: F,
    timeout: Duration,
    cancel: &CancellationToken,
    server: &str,
    what: &'static str,
) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, DomainError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(DomainError::Cancelled),
        result = tokio::time::timeout(timeout, operation) => {
            result.map_err(|_| DomainError::Timeout {
                server: server.to_string(),
                operation: what,
                timeout_ms: timeout.as_millis() as u64,
            })?
        }
    }
}
