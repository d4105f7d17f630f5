use crate::http::request::{MAX_METHOD_LEN, Method, Request};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Nothing was received
    Empty,
    /// The first two tokens are not valid UTF-8
    Unreadable,
    /// There is a method token but no target token
    MissingTarget { method: String },
    /// The request did not fit in the read buffer
    RequestTooLarge,
}

/// Extracts `(method, target)` from the raw bytes of a request.
///
/// The buffer is split on ASCII whitespace and only the first two tokens are
/// consulted; the version, headers and anything else are ignored. A NUL byte
/// ends the buffer. The method token is cut to [`MAX_METHOD_LEN`] bytes.
pub fn parse_request_line(buf: &[u8]) -> Result<Request, ParseError> {
    let buf = match buf.iter().position(|&b| b == 0) {
        Some(nul) => &buf[..nul],
        None => buf,
    };

    let mut tokens = buf
        .split(|b| b.is_ascii_whitespace())
        .filter(|t| !t.is_empty());

    let method = tokens.next().ok_or(ParseError::Empty)?;
    let method = std::str::from_utf8(method).map_err(|_| ParseError::Unreadable)?;
    let method = truncate(method, MAX_METHOD_LEN);

    let target = tokens.next().ok_or_else(|| ParseError::MissingTarget {
        method: method.to_string(),
    })?;
    let target = std::str::from_utf8(target).map_err(|_| ParseError::Unreadable)?;

    Ok(Request::new(Method::from_token(method), target))
}

/// Longest prefix of `s` that is at most `max` bytes and ends on a char boundary.
fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Whether `buf` already holds a full request line.
pub fn has_request_line(buf: &[u8]) -> bool {
    buf.contains(&b'\n')
}

/// Whether `buf` holds the blank line that ends the request head.
pub fn has_head_end(buf: &[u8]) -> bool {
    buf.windows(4).any(|w| w == b"\r\n\r\n") || buf.windows(2).any(|w| w == b"\n\n")
}
