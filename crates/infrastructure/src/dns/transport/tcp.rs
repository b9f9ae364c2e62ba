use super::{bounded, DnsTransport, TransportResponse};
use crate::dns::forwarding::message_builder::MAX_MESSAGE_SIZE;
use async_trait::async_trait;
use ferrous_lookup_domain::{DomainError, UpstreamAddr};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// DNS over TCP (RFC 1035 §4.2.2). One connection per query, closed when the
/// call returns.
pub struct TcpTransport {
    upstream_addr: UpstreamAddr,
    connect_timeout: Duration,
}

impl TcpTransport {
    pub fn new(upstream_addr: UpstreamAddr) -> Self {
        Self {
            upstream_addr,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn upstream_addr(&self) -> &UpstreamAddr {
        &self.upstream_addr
    }

    async fn connect(&self, server: &str) -> Result<TcpStream, DomainError> {
        let connected = match &self.upstream_addr {
            UpstreamAddr::Resolved(addr) => TcpStream::connect(*addr).await,
            UpstreamAddr::Unresolved { hostname, port } => {
                TcpStream::connect((hostname.as_ref(), *port)).await
            }
        };

        let stream = connected.map_err(|e| DomainError::Connection {
            server: server.to_string(),
            reason: e.to_string(),
        })?;

        stream.set_nodelay(true).map_err(|e| DomainError::Connection {
            server: server.to_string(),
            reason: format!("Failed to set TCP_NODELAY: {}", e),
        })?;

        Ok(stream)
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<TransportResponse, DomainError> {
        let server = self.upstream_addr.to_string();
        let frame = frame_with_length_prefix(message_bytes)?;

        let mut stream = bounded(
            self.connect(&server),
            self.connect_timeout,
            cancel,
            &server,
            "connecting to",
        )
        .await?;

        debug!(server = %server, "TCP connection established");

        let response_bytes = bounded(
            async {
                write_frame(&mut stream, &frame, &server).await?;

                debug!(
                    server = %server,
                    message_len = message_bytes.len(),
                    "TCP query sent"
                );

                read_with_length_prefix(&mut stream, &server).await
            },
            timeout,
            cancel,
            &server,
            "waiting for TCP response from",
        )
        .await?;

        debug!(
            server = %server,
            response_len = response_bytes.len(),
            "TCP response received"
        );

        Ok(TransportResponse {
            bytes: response_bytes,
            protocol_used: "TCP",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "TCP"
    }
}

/// `[u16 big-endian length][message]` in a single buffer so the request goes
/// out in one write.
pub(crate) fn frame_with_length_prefix(message_bytes: &[u8]) -> Result<Vec<u8>, DomainError> {
    let length = u16::try_from(message_bytes.len()).map_err(|_| {
        DomainError::Encode(format!(
            "Query is {} bytes, exceeds TCP length prefix (max {})",
            message_bytes.len(),
            MAX_MESSAGE_SIZE
        ))
    })?;

    let mut frame = Vec::with_capacity(2 + message_bytes.len());
    frame.extend_from_slice(&length.to_be_bytes());
    frame.extend_from_slice(message_bytes);
    Ok(frame)
}

pub(crate) async fn write_frame<S>(
    stream: &mut S,
    frame: &[u8],
    server: &str,
) -> Result<(), DomainError>
where
    S: AsyncWrite + Unpin,
{
    let write_error = |e: std::io::Error| DomainError::Write {
        server: server.to_string(),
        reason: e.to_string(),
    };

    stream.write_all(frame).await.map_err(write_error)?;
    stream.flush().await.map_err(write_error)?;
    Ok(())
}

/// Reads into `buf` until it is full or the peer closes. Returns the number
/// of bytes filled; every iteration either advances or ends the loop, so it
/// runs at most `buf.len()` times.
async fn read_full<S>(stream: &mut S, buf: &mut [u8]) -> std::io::Result<usize>
where
    S: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buf.len() {
        let n = stream.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

pub(crate) async fn read_with_length_prefix<S>(
    stream: &mut S,
    server: &str,
) -> Result<Vec<u8>, DomainError>
where
    S: AsyncRead + Unpin,
{
    let read_error = |reason: String| DomainError::Read {
        server: server.to_string(),
        reason,
    };

    let mut len_buf = [0u8; 2];
    let filled = read_full(stream, &mut len_buf)
        .await
        .map_err(|e| read_error(format!("Failed to read response length: {}", e)))?;
    if filled < len_buf.len() {
        return Err(read_error(format!(
            "Connection closed after {} of 2 length prefix bytes",
            filled
        )));
    }

    let response_len = u16::from_be_bytes(len_buf) as usize;
    if response_len == 0 {
        return Err(DomainError::Decode(format!(
            "Server {} announced an empty response",
            server
        )));
    }

    let mut response = vec![0u8; response_len];
    let filled = read_full(stream, &mut response)
        .await
        .map_err(|e| read_error(format!("Failed to read response body: {}", e)))?;
    if filled < response_len {
        return Err(DomainError::TruncatedResponse {
            server: server.to_string(),
            expected: response_len,
            received: filled,
        });
    }

    Ok(response)
}
