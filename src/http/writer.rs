use std::fmt;

use bytes::{BufMut, BytesMut};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::http::response::Response;

const HTTP_VERSION: &str = "HTTP/1.1";

/// Largest response head that will be sent.
pub const MAX_HEAD_BYTES: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteError {
    /// Serialized head is this many bytes, over [`MAX_HEAD_BYTES`]
    HeaderTooLarge(usize),
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteError::HeaderTooLarge(n) => {
                write!(f, "response head is {n} bytes, limit is {MAX_HEAD_BYTES}")
            }
        }
    }
}

impl std::error::Error for WriteError {}

/// Renders the status line and headers, terminated by the empty line.
pub fn serialize_head(resp: &Response) -> Result<BytesMut, WriteError> {
    let mut buf = BytesMut::with_capacity(256);

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.put_slice(status_line.as_bytes());

    // Headers
    for (k, v) in resp.headers() {
        buf.put_slice(k.as_bytes());
        buf.put_slice(b": ");
        buf.put_slice(v.as_bytes());
        buf.put_slice(b"\r\n");
    }

    // Header/body separator
    buf.put_slice(b"\r\n");

    if buf.len() > MAX_HEAD_BYTES {
        return Err(WriteError::HeaderTooLarge(buf.len()));
    }

    Ok(buf)
}

pub struct ResponseWriter {
    buffer: BytesMut,
    written: usize,
}

impl ResponseWriter {
    pub fn new(response: &Response) -> Result<Self, WriteError> {
        Ok(Self {
            buffer: serialize_head(response)?,
            written: 0,
        })
    }

    pub async fn write_to_stream(&mut self, stream: &mut TcpStream) -> anyhow::Result<()> {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }

        Ok(())
    }
}
