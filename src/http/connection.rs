use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::{Buf, BytesMut};
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::Router;
use crate::http::parser::{parse_http_request, HeaderScan, ParseError, MAX_HEADER_BYTES};
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};
use crate::http::writer::ResponseWriter;

const READ_CHUNK: usize = 4096;

/// How long a connection may sit without sending a byte.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(30);

pub struct Connection {
    stream: TcpStream,
    buffer: BytesMut,
    scan: HeaderScan,
    state: ConnectionState,
    router: Arc<Router>,
    shutdown: watch::Receiver<bool>,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter, bool), // bool = keep_alive?
    Closed,
}

/// Outcome of waiting for the next request on the socket.
enum Incoming {
    Request(Request),
    Malformed(ParseError),
    Eof,
}

impl Connection {
    /// `shutdown` flips to `true` when the server stops; an idle connection
    /// then closes instead of waiting for its next request.
    pub fn new(stream: TcpStream, router: Arc<Router>, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(READ_CHUNK),
            scan: HeaderScan::default(),
            state: ConnectionState::Reading,
            router,
            shutdown,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            self.state = match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => match self.read_request().await? {
                    Incoming::Request(req) => ConnectionState::Processing(req),
                    Incoming::Malformed(err) => {
                        warn!(error = ?err, "Rejecting malformed request");
                        let response = reject(&err).with_header("Connection", "close");
                        ConnectionState::Writing(ResponseWriter::new(&response), false)
                    }
                    Incoming::Eof => ConnectionState::Closed,
                },

                ConnectionState::Processing(req) => {
                    let started = Instant::now();
                    let keep_alive = req.keep_alive();
                    let mut response = self.router.handle(&req).await;
                    if !keep_alive {
                        response = response.with_header("Connection", "close");
                    }

                    info!(
                        method = %req.method,
                        path = %req.path,
                        status = response.status.as_u16(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Request handled"
                    );

                    ConnectionState::Writing(ResponseWriter::new(&response), keep_alive)
                }

                ConnectionState::Writing(mut writer, keep_alive) => {
                    writer.write_to_stream(&mut self.stream).await?;

                    if keep_alive {
                        ConnectionState::Reading // go back for next request
                    } else {
                        ConnectionState::Closed
                    }
                }

                ConnectionState::Closed => break,
            };
        }

        Ok(())
    }

    async fn read_request(&mut self) -> anyhow::Result<Incoming> {
        loop {
            // Only parse once the header section is complete (or too big).
            let headers_done = self.scan.find(&self.buffer).is_some();
            if headers_done || self.buffer.len() > MAX_HEADER_BYTES {
                match parse_http_request(&self.buffer) {
                    Ok((request, consumed)) => {
                        self.buffer.advance(consumed);
                        self.scan.reset();
                        return Ok(Incoming::Request(request));
                    }

                    Err(ParseError::Incomplete) => {
                        // Body still arriving
                    }

                    Err(e) => return Ok(Incoming::Malformed(e)),
                }
            }

            let idle = self.buffer.is_empty();
            if idle && *self.shutdown.borrow() {
                return Ok(Incoming::Eof);
            }

            self.buffer.reserve(READ_CHUNK);
            let n = tokio::select! {
                read = tokio::time::timeout(IDLE_TIMEOUT, self.stream.read_buf(&mut self.buffer)) => {
                    match read {
                        Ok(n) => n?,
                        Err(_) => {
                            debug!(pending = self.buffer.len(), "Connection timed out");
                            return Ok(Incoming::Eof);
                        }
                    }
                }
                _ = self.shutdown.changed(), if idle => {
                    debug!("Closing idle connection for shutdown");
                    return Ok(Incoming::Eof);
                }
            };

            if n == 0 {
                if !self.buffer.is_empty() {
                    debug!(pending = self.buffer.len(), "Client closed mid-request");
                }
                return Ok(Incoming::Eof);
            }
        }
    }
}

fn reject(err: &ParseError) -> Response {
    match err {
        ParseError::HeadersTooLarge | ParseError::BodyTooLarge => {
            Response::error(StatusCode::PayloadTooLarge, "Request too large")
        }
        ParseError::UnsupportedTransferEncoding => Response::error(
            StatusCode::LengthRequired,
            "Transfer-Encoding is not supported; send Content-Length",
        ),
        other => Response::error(
            StatusCode::BadRequest,
            &format!("Malformed HTTP request: {other:?}"),
        ),
    }
}
