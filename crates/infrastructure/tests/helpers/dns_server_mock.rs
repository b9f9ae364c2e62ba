#![allow(dead_code)]
use super::builders::a_response;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

#[derive(Debug, Clone)]
pub enum TcpBehavior {
    /// Reply with one A record. The framed reply is written in pieces of
    /// `chunks` bytes (whatever is left goes in a final piece), flushing and
    /// pausing between pieces.
    Answer { ip: Ipv4Addr, chunks: Vec<usize> },
    /// Send a zero length prefix and keep the connection open.
    ZeroLength,
    /// Read the query and never answer.
    Silent,
    /// Announce the full reply length, send `sent` body bytes, then close.
    Truncate { sent: usize },
    /// Send half of the length prefix, then close.
    PartialPrefix,
}

pub struct MockTcpDnsServer {
    addr: SocketAddr,
    queries: Arc<Mutex<Vec<Vec<u8>>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockTcpDnsServer {
    pub async fn start(behavior: TcpBehavior) -> Result<Self, std::io::Error> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let queries = Arc::new(Mutex::new(Vec::new()));

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let seen = Arc::clone(&queries);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        break;
                    }
                    accepted = listener.accept() => {
                        if let Ok((stream, _)) = accepted {
                            let behavior = behavior.clone();
                            let seen = Arc::clone(&seen);
                            tokio::spawn(async move {
                                let _ = Self::serve(stream, behavior, seen).await;
                            });
                        }
                    }
                }
            }
        });

        Ok(Self {
            addr,
            queries,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Query messages received so far, without their length prefix.
    pub fn queries(&self) -> Vec<Vec<u8>> {
        self.queries.lock().unwrap().clone()
    }

    async fn serve(
        mut stream: TcpStream,
        behavior: TcpBehavior,
        seen: Arc<Mutex<Vec<Vec<u8>>>>,
    ) -> Result<(), std::io::Error> {
        let mut len_buf = [0u8; 2];
        stream.read_exact(&mut len_buf).await?;
        let mut query = vec![0u8; u16::from_be_bytes(len_buf) as usize];
        stream.read_exact(&mut query).await?;
        seen.lock().unwrap().push(query.clone());

        match behavior {
            TcpBehavior::Answer { ip, chunks } => {
                let frame = framed(&a_response(&query, ip));
                let mut offset = 0;
                for size in chunks {
                    let end = (offset + size).min(frame.len());
                    stream.write_all(&frame[offset..end]).await?;
                    stream.flush().await?;
                    offset = end;
                    tokio::time::sleep(Duration::from_millis(20)).await;
                }
                stream.write_all(&frame[offset..]).await?;
                stream.flush().await?;
                // Let the client close first.
                let mut rest = Vec::new();
                let _ = stream.read_to_end(&mut rest).await;
            }
            TcpBehavior::ZeroLength => {
                stream.write_all(&[0x00, 0x00]).await?;
                stream.flush().await?;
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            TcpBehavior::Silent => {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            TcpBehavior::Truncate { sent } => {
                let frame = framed(&a_response(&query, Ipv4Addr::LOCALHOST));
                stream.write_all(&frame[..2 + sent]).await?;
                stream.flush().await?;
            }
            TcpBehavior::PartialPrefix => {
                stream.write_all(&[0x00]).await?;
                stream.flush().await?;
            }
        }

        Ok(())
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockTcpDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

fn framed(message: &[u8]) -> Vec<u8> {
    let mut frame = (message.len() as u16).to_be_bytes().to_vec();
    frame.extend_from_slice(message);
    frame
}
