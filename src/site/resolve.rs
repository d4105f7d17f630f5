//! Request target to filesystem path resolution
//!
//! Targets are joined onto the sandbox root as plain strings. Containment is
//! checked separately by [`confine`], after the file is known to exist.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::http::mime;

/// File served for targets without an extension.
pub const INDEX_FILE: &str = "/index.html";

/// A target mapped onto the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub path: PathBuf,
    pub content_type: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The extension is not in the MIME allowlist
    UnsupportedMediaType { extension: String },
}

/// Extension of the last path segment, leading dot included.
///
/// `/css/site.css` gives `.css`, `/docs` and `/v1.2/` give `None`.
pub fn extension_of(target: &str) -> Option<&str> {
    let segment = target.rsplit('/').next().unwrap_or(target);
    segment.rfind('.').map(|dot| &segment[dot..])
}

/// Joins `target` onto `root` and picks the Content-Type.
///
/// No normalization happens here: `..` segments, doubled slashes and
/// query strings are kept verbatim. A target without an extension gets
/// `/index.html` appended and is typed as HTML.
pub fn resolve(root: &Path, target: &str) -> Result<ResolvedTarget, ResolveError> {
    let extension = extension_of(target);

    let content_type =
        mime::get_content_type(extension).ok_or_else(|| ResolveError::UnsupportedMediaType {
            extension: extension.unwrap_or_default().to_string(),
        })?;

    let mut path = OsString::from(root.as_os_str());
    path.push(target);
    if extension.is_none() {
        path.push(INDEX_FILE);
    }

    Ok(ResolvedTarget {
        path: PathBuf::from(path),
        content_type,
    })
}

/// Canonicalizes `path` and checks that it lies under `canonical_root`.
///
/// Returns the canonical path to open, or `None` when the file does not
/// exist or escapes the root.
pub async fn confine(canonical_root: &Path, path: &Path) -> Option<PathBuf> {
    let canonical = tokio::fs::canonicalize(path).await.ok()?;

    if canonical.starts_with(canonical_root) {
        Some(canonical)
    } else {
        tracing::warn!(
            path = %path.display(),
            resolved = %canonical.display(),
            "Path traversal attempt blocked"
        );
        None
    }
}
