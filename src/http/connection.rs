use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::time::{Instant, timeout_at};

use crate::http::parser::{ParseError, has_head_end, has_request_line, parse_request_line};
use crate::http::request::Request;
use crate::site::handler::{Reply, StaticHandler};

/// Most unread input thrown away before the socket is closed.
const MAX_DISCARD_BYTES: usize = 64 * 1024;

/// Bounds on reading one request.
#[derive(Debug, Clone, Copy)]
pub struct ReadLimits {
    /// Bytes read before giving up with `RequestTooLarge`
    pub max_request_bytes: usize,
    /// Time allowed for the whole request to arrive
    pub read_timeout: Duration,
}

pub struct Connection {
    stream: TcpStream,
    buffer: Vec<u8>,
    state: ConnectionState,
    handler: Arc<StaticHandler>,
    limits: ReadLimits,
}

pub enum ConnectionState {
    Reading,
    Processing(Result<Request, ParseError>),
    Writing(Reply),
    Closed,
}

impl Connection {
    pub fn new(stream: TcpStream, handler: Arc<StaticHandler>, limits: ReadLimits) -> Self {
        Self {
            stream,
            buffer: Vec::with_capacity(limits.max_request_bytes.min(4096)),
            state: ConnectionState::Reading,
            handler,
            limits,
        }
    }

    /// Reads one request, answers it and closes. There is no keep-alive.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => {
                    if let Some(parsed) = self.read_request().await? {
                        self.state = ConnectionState::Processing(parsed);
                    }
                }

                ConnectionState::Processing(parsed) => {
                    let reply = self.handler.route(&parsed).await;
                    self.state = ConnectionState::Writing(reply);
                }

                ConnectionState::Writing(reply) => {
                    // Always followed by Closed
                    let sent = self.handler.send(reply, &mut self.stream).await;
                    self.discard_unread();
                    sent?;
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Reads the request head: until the blank line after the headers, the
    /// peer closes, the buffer cap is hit or the read deadline passes.
    ///
    /// Only the request line is parsed; headers are read so they are not left
    /// in the socket. Hitting the cap before any line feed is
    /// `RequestTooLarge`. `Ok(None)` means the deadline passed before a
    /// single byte arrived.
    pub async fn read_request(&mut self) -> anyhow::Result<Option<Result<Request, ParseError>>> {
        let deadline = Instant::now() + self.limits.read_timeout;
        let cap = self.limits.max_request_bytes;

        while !has_head_end(&self.buffer) {
            if self.buffer.len() >= cap {
                if has_request_line(&self.buffer) {
                    // Remaining headers are dropped by discard_unread
                    break;
                }
                return Ok(Some(Err(ParseError::RequestTooLarge)));
            }

            let mut temp = [0u8; 1024];
            let want = temp.len().min(cap - self.buffer.len());

            let n = match timeout_at(deadline, self.stream.read(&mut temp[..want])).await {
                Ok(read) => read?,
                Err(_) if self.buffer.is_empty() => {
                    tracing::debug!("Read timed out before any data arrived");
                    return Ok(None);
                }
                Err(_) => {
                    tracing::debug!(bytes = self.buffer.len(), "Read timed out, parsing partial request");
                    break;
                }
            };

            if n == 0 {
                // Peer closed its write side
                break;
            }

            self.buffer.extend_from_slice(&temp[..n]);
        }

        Ok(Some(parse_request_line(&self.buffer)))
    }

    /// Reads and drops whatever input is already queued on the socket.
    ///
    /// Closing a socket with unread input makes the kernel send a reset,
    /// which can destroy response bytes the client has not read yet.
    fn discard_unread(&mut self) {
        let mut scratch = [0u8; 4096];
        let mut discarded = 0;

        while discarded < MAX_DISCARD_BYTES {
            match self.stream.try_read(&mut scratch) {
                Ok(0) | Err(_) => break,
                Ok(n) => discarded += n,
            }
        }

        if discarded > 0 {
            tracing::debug!(bytes = discarded, "Discarded unread request bytes");
        }
    }
}
