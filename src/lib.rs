//! Docroot - Sandboxed Static File Server
//!
//! Core library for request parsing, path resolution and file transfer.

pub mod config;
pub mod http;
pub mod server;
pub mod site;
