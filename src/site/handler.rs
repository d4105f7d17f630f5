//! Request handling for the document tree
//!
//! Decides which file answers a request and with what status, then streams
//! it to the client.

use std::path::PathBuf;

use anyhow::Context;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::config::Config;
use crate::http::mime;
use crate::http::parser::ParseError;
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};
use crate::http::transfer::Transfer;
use crate::http::writer::ResponseWriter;
use crate::site::error_pages::ErrorPages;
use crate::site::resolve::{self, ResolveError};

/// Placeholder logged for a method or target that could not be parsed.
const INVALID: &str = "<invalid>";

/// The file chosen to answer a request.
///
/// Status and content type only hold if the file opens; otherwise the 404
/// page replaces all three.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub file: PathBuf,
    pub status: StatusCode,
    pub content_type: &'static str,
}

/// Serves files from the sandbox root.
pub struct StaticHandler {
    root: PathBuf,
    /// Canonical root, present only when containment is enforced and the
    /// root exists
    canonical_root: Option<PathBuf>,
    confine: bool,
    error_pages: ErrorPages,
    transfer: Transfer,
}

impl StaticHandler {
    /// Builds a handler from configuration
    pub fn new(cfg: &Config) -> Self {
        let canonical_root = if cfg.confine_to_root {
            match std::fs::canonicalize(&cfg.root_dir) {
                Ok(root) => Some(root),
                Err(e) => {
                    tracing::warn!(
                        root = %cfg.root_dir.display(),
                        error = %e,
                        "Document root is inaccessible, every file request will be answered with 404"
                    );
                    None
                }
            }
        } else {
            None
        };

        let error_pages = ErrorPages::new(&cfg.error_dir);
        for page in error_pages.missing() {
            tracing::warn!(page = %page.display(), "Error page is missing");
        }

        Self {
            root: cfg.root_dir.clone(),
            canonical_root,
            confine: cfg.confine_to_root,
            error_pages,
            transfer: Transfer::select(cfg.transfer),
        }
    }

    pub fn error_pages(&self) -> &ErrorPages {
        &self.error_pages
    }

    /// Chooses the file, status and content type for a parsed request.
    ///
    /// Also writes the per-request audit line.
    pub async fn route(&self, parsed: &Result<Request, ParseError>) -> Reply {
        let req = match parsed {
            Ok(req) => req,
            Err(e) => {
                let method = match e {
                    ParseError::MissingTarget { method } => method.as_str(),
                    _ => INVALID,
                };
                tracing::info!(method, target = INVALID, error = ?e, "Request");
                return self.error_reply(StatusCode::BadRequest);
            }
        };

        tracing::info!(method = %req.method, target = %req.target, "Request");

        if !req.is_get() {
            return self.error_reply(StatusCode::MethodNotAllowed);
        }

        let resolved = match resolve::resolve(&self.root, &req.target) {
            Ok(resolved) => resolved,
            Err(ResolveError::UnsupportedMediaType { extension }) => {
                tracing::debug!(extension = %extension, "Extension not in MIME allowlist");
                return self.error_reply(StatusCode::UnsupportedMediaType);
            }
        };

        let file = if self.confine {
            let confined = match &self.canonical_root {
                Some(root) => resolve::confine(root, &resolved.path).await,
                None => None,
            };
            match confined {
                Some(path) => path,
                None => return self.error_reply(StatusCode::NotFound),
            }
        } else {
            resolved.path
        };

        Reply {
            file,
            status: StatusCode::Ok,
            content_type: resolved.content_type,
        }
    }

    fn error_reply(&self, status: StatusCode) -> Reply {
        Reply {
            file: self.error_pages.page_for(status),
            status,
            content_type: mime::HTML,
        }
    }

    /// Opens the reply's file, falling back to the 404 page, and streams it.
    ///
    /// Fails without writing anything when neither file can be opened or the
    /// head does not fit its buffer. The stream is shut down on success.
    pub async fn send(&self, reply: Reply, stream: &mut TcpStream) -> anyhow::Result<()> {
        let (mut file, response) = match open_body(&reply.file).await? {
            Some((file, len)) => (file, Response::new(reply.status, reply.content_type, len)),
            None => {
                tracing::debug!(file = %reply.file.display(), "File unavailable, serving 404 page");
                let page = self.error_pages.not_found();
                let (file, len) = open_body(&page)
                    .await?
                    .with_context(|| format!("Error page {} is unavailable", page.display()))?;
                (file, Response::new(StatusCode::NotFound, mime::HTML, len))
            }
        };

        let mut writer = ResponseWriter::new(&response)?;
        writer.write_to_stream(stream).await?;

        let sent = self
            .transfer
            .send(&mut file, response.content_length, stream)
            .await
            .context("Failed to send response body")?;

        if sent < response.content_length {
            tracing::warn!(
                sent,
                expected = response.content_length,
                "Response body was cut short"
            );
        }

        tracing::debug!(
            status = response.status.as_u16(),
            bytes = sent,
            "Response sent"
        );

        stream.shutdown().await.ok();
        Ok(())
    }
}

/// Opens a regular file and reads its size.
///
/// `Ok(None)` when the file cannot be opened or is not a regular file; an
/// error when it opened but its metadata could not be read.
async fn open_body(path: &std::path::Path) -> anyhow::Result<Option<(File, u64)>> {
    let file = match File::open(path).await {
        Ok(file) => file,
        Err(e) => {
            tracing::debug!(file = %path.display(), error = %e, "Open failed");
            return Ok(None);
        }
    };

    let meta = file
        .metadata()
        .await
        .with_context(|| format!("Failed to stat {}", path.display()))?;

    if !meta.is_file() {
        return Ok(None);
    }

    Ok(Some((file, meta.len())))
}
