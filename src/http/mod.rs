//! HTTP protocol implementation.
//!
//! A deliberately small HTTP/1.1 subset: one request line per connection,
//! GET only, a fixed three-header response and `Connection: close`.
//!
//! # Architecture
//!
//! - **`connection`**: Per-connection state machine; reads, routes, writes, closes
//! - **`parser`**: Extracts method and target from the raw request bytes
//! - **`request`**: Parsed request line representation
//! - **`response`**: Status codes and the response head
//! - **`writer`**: Serializes the response head and writes it to the client
//! - **`transfer`**: Streams the response body from a file (sendfile or copy loop)
//! - **`mime`**: MIME type allowlist keyed by file extension
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Read the request head (bounded, with deadline)
//!        └──────┬──────┘
//!               │ Bytes received (or parse failure)
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Validate method, resolve path and content type
//!        └──────┬───────────┘
//!               │ Reply chosen
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Head, then body via sendfile / copy
//!        └──────┬───────────┘
//!               │
//!               ▼
//!        ┌──────────────────┐
//!        │     Closed       │
//!        └──────────────────┘
//! ```
//!
//! A read deadline with no data at all goes straight from Reading to Closed.

pub mod connection;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod transfer;
pub mod writer;
