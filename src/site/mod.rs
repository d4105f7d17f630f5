//! Document tree serving
//!
//! This module maps request targets onto files under the sandbox root,
//! picks the status and content type, and streams the chosen file.

pub mod error_pages;
pub mod handler;
pub mod resolve;

pub use error_pages::ErrorPages;
pub use handler::{Reply, StaticHandler};
pub use resolve::{ResolveError, ResolvedTarget};
