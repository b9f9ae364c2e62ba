#![allow(dead_code)]
use super::builders::a_response;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use base64::prelude::BASE64_URL_SAFE_NO_PAD;
use base64::Engine;
use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

#[derive(Debug, Clone)]
pub enum DohBehavior {
    /// Decode the `dns` parameter and answer with one A record.
    Answer { ip: Ipv4Addr },
    /// Reply with `status` and a plain text body.
    Status { status: u16, body: &'static str },
    /// Reply 200 with a body of `size` bytes.
    Oversized { size: usize },
    /// Never reply.
    Stall,
    /// Reply 200 with `count` chunks of `chunk` bytes, chunked transfer
    /// encoding and no Content-Length.
    Streamed { chunk: usize, count: usize },
}

#[derive(Debug, Default, Clone)]
pub struct SeenRequest {
    pub accept: Option<String>,
    pub dns_param: Option<String>,
}

struct StubState {
    behavior: DohBehavior,
    seen: Mutex<Vec<SeenRequest>>,
}

pub struct MockDohServer {
    addr: SocketAddr,
    state: Arc<StubState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDohServer {
    pub async fn start(behavior: DohBehavior) -> Result<Self, std::io::Error> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let state = Arc::new(StubState {
            behavior,
            seen: Mutex::new(Vec::new()),
        });

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        if let DohBehavior::Streamed { chunk, count } = state.behavior {
            tokio::spawn(serve_streamed(
                listener,
                Arc::clone(&state),
                chunk,
                count,
                shutdown_rx,
            ));
            return Ok(Self {
                addr,
                state,
                shutdown_tx: Some(shutdown_tx),
            });
        }

        let app = Router::new()
            .route("/dns-query", get(handle_dns_query))
            .with_state(Arc::clone(&state));

        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Ok(Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn url(&self) -> String {
        format!("http://{}/dns-query", self.addr)
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.state.seen.lock().unwrap().clone()
    }
}

impl Drop for MockDohServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn handle_dns_query(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.seen.lock().unwrap().push(SeenRequest {
        accept: headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
        dns_param: params.get("dns").cloned(),
    });

    match &state.behavior {
        DohBehavior::Answer { ip } => {
            let Some(encoded) = params.get("dns") else {
                return (StatusCode::BAD_REQUEST, "missing dns parameter").into_response();
            };
            let Ok(query) = BASE64_URL_SAFE_NO_PAD.decode(encoded) else {
                return (StatusCode::BAD_REQUEST, "dns parameter is not base64url").into_response();
            };
            (
                [(header::CONTENT_TYPE, "application/dns-message")],
                a_response(&query, *ip),
            )
                .into_response()
        }
        DohBehavior::Status { status, body } => {
            let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, *body).into_response()
        }
        DohBehavior::Oversized { size } => (
            [(header::CONTENT_TYPE, "application/dns-message")],
            vec![0u8; *size],
        )
            .into_response(),
        DohBehavior::Streamed { .. } => StatusCode::NOT_IMPLEMENTED.into_response(),
        DohBehavior::Stall => {
            tokio::time::sleep(Duration::from_secs(30)).await;
            StatusCode::OK.into_response()
        }
    }
}

/// Hand-written HTTP/1.1 responder: axum always announces a length for
/// in-memory bodies, so a body of unknown size needs its own writer.
async fn serve_streamed(
    listener: TcpListener,
    state: Arc<StubState>,
    chunk: usize,
    count: usize,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = &mut shutdown_rx => break,
            accepted = listener.accept() => {
                if let Ok((stream, _)) = accepted {
                    let state = Arc::clone(&state);
                    tokio::spawn(async move {
                        let _ = write_streamed(stream, state, chunk, count).await;
                    });
                }
            }
        }
    }
}

async fn write_streamed(
    mut stream: TcpStream,
    state: Arc<StubState>,
    chunk: usize,
    count: usize,
) -> Result<(), std::io::Error> {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        head.extend_from_slice(&buf[..n]);
    }
    state.seen.lock().unwrap().push(parse_request_head(&String::from_utf8_lossy(&head)));

    stream
        .write_all(
            b"HTTP/1.1 200 OK\r\n\
              content-type: application/dns-message\r\n\
              transfer-encoding: chunked\r\n\r\n",
        )
        .await?;

    let mut frame = format!("{:x}\r\n", chunk).into_bytes();
    frame.resize(frame.len() + chunk, 0);
    frame.extend_from_slice(b"\r\n");
    for _ in 0..count {
        stream.write_all(&frame).await?;
        stream.flush().await?;
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    stream.write_all(b"0\r\n\r\n").await?;
    stream.flush().await
}

fn parse_request_head(head: &str) -> SeenRequest {
    let mut lines = head.lines();
    let dns_param = lines
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|target| target.split_once('?'))
        .and_then(|(_, query)| {
            query
                .split('&')
                .find_map(|pair| pair.strip_prefix("dns="))
                .map(str::to_owned)
        });
    let accept = lines.find_map(|line| {
        let (name, value) = line.split_once(':')?;
        name.eq_ignore_ascii_case("accept")
            .then(|| value.trim().to_owned())
    });

    SeenRequest { accept, dns_param }
}
