/// HTTP status codes the server can answer with.
///
/// - `Ok` (200): File found and streamed
/// - `BadRequest` (400): Request line could not be parsed
/// - `NotFound` (404): File could not be opened
/// - `MethodNotAllowed` (405): Anything but GET
/// - `UnsupportedMediaType` (415): Extension is not in the MIME allowlist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
    /// 405 Method Not Allowed
    MethodNotAllowed,
    /// 415 Unsupported Media Type
    UnsupportedMediaType,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use docroot::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::UnsupportedMediaType.as_u16(), 415);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::MethodNotAllowed => 405,
            StatusCode::UnsupportedMediaType => 415,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::UnsupportedMediaType => "Unsupported Media Type",
        }
    }
}

/// Status line and headers of a response.
///
/// The body is never held here; it is streamed from the opened file after
/// the head has been written. Every response carries `Connection: close`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// The HTTP status code
    pub status: StatusCode,
    /// Value of the Content-Type header
    pub content_type: &'static str,
    /// Exact number of body bytes that follow the head
    pub content_length: u64,
}

impl Response {
    pub fn new(status: StatusCode, content_type: &'static str, content_length: u64) -> Self {
        Self {
            status,
            content_type,
            content_length,
        }
    }

    /// Headers in the order they are written.
    pub fn headers(&self) -> [(&'static str, String); 3] {
        [
            ("Content-Type", self.content_type.to_string()),
            ("Content-Length", self.content_length.to_string()),
            ("Connection", "close".to_string()),
        ]
    }
}
