//! Static error pages
//!
//! Each error status is answered with `<error_dir>/<code>.html`. The pages
//! are ordinary files owned by the operator; nothing here generates HTML.

use std::path::PathBuf;

use crate::http::response::StatusCode;

/// Statuses that have a page on disk.
pub const ERROR_STATUSES: [StatusCode; 4] = [
    StatusCode::BadRequest,
    StatusCode::NotFound,
    StatusCode::MethodNotAllowed,
    StatusCode::UnsupportedMediaType,
];

#[derive(Debug, Clone)]
pub struct ErrorPages {
    dir: PathBuf,
}

impl ErrorPages {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the page for `status`, e.g. `./err/404.html`.
    pub fn page_for(&self, status: StatusCode) -> PathBuf {
        self.dir.join(format!("{}.html", status.as_u16()))
    }

    /// The 404 page, which every failed open falls back to.
    pub fn not_found(&self) -> PathBuf {
        self.page_for(StatusCode::NotFound)
    }

    /// Pages that are not regular files right now.
    pub fn missing(&self) -> Vec<PathBuf> {
        ERROR_STATUSES
            .iter()
            .map(|status| self.page_for(*status))
            .filter(|page| !page.is_file())
            .collect()
    }
}
