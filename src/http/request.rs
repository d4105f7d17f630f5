use std::fmt;

/// Longest method token kept from the request line; the rest is dropped.
pub const MAX_METHOD_LEN: usize = 15;

/// HTTP request methods.
///
/// Only GET is served. Everything else, including tokens that are not HTTP
/// methods at all, is kept verbatim and answered with 405 Method Not Allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// Any other token, as received (already truncated)
    Other(String),
}

/// A parsed request line.
///
/// Only the method and target are kept; version and headers are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The request target exactly as received (e.g., "/index.html")
    pub target: String,
}

impl Method {
    /// Classifies a method token. Matching is case-sensitive.
    ///
    /// # Example
    ///
    /// ```
    /// # use docroot::http::request::Method;
    /// assert_eq!(Method::from_token("GET"), Method::GET);
    /// assert_eq!(Method::from_token("get"), Method::Other("get".to_string()));
    /// ```
    pub fn from_token(s: &str) -> Self {
        match s {
            "GET" => Method::GET,
            other => Method::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::Other(s) => s,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Request {
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
        }
    }

    /// Whether this request may be served at all.
    pub fn is_get(&self) -> bool {
        self.method == Method::GET
    }
}
