//! MIME type detection module
//!
//! Maps a file extension (leading dot included) to a Content-Type from a
//! fixed allowlist. Anything not listed is refused with 415.

/// Extension used for targets that have none (directory-style requests).
pub const DEFAULT_EXTENSION: &str = ".html";

/// Content-Type of every error page.
pub const HTML: &str = "text/html";

/// Allowlisted extensions and their Content-Type.
pub static MIME_TYPES: &[(&str, &str)] = &[
    (".html", "text/html"),
    (".css", "text/css"),
    (".js", "application/javascript"),
    (".png", "image/png"),
    (".jpg", "image/jpeg"),
    (".jpeg", "image/jpeg"),
    (".mp4", "video/mp4"),
    (".webm", "video/webm"),
    (".ogg", "video/ogg"),
    (".avi", "video/x-msvideo"),
    (".mpeg", "video/mpeg"),
];

/// Looks up the Content-Type for an extension.
///
/// `None` stands for "no extension" and resolves as [`DEFAULT_EXTENSION`].
/// Matching is exact and case-sensitive.
///
/// # Examples
/// ```
/// use docroot::http::mime::get_content_type;
/// assert_eq!(get_content_type(Some(".png")), Some("image/png"));
/// assert_eq!(get_content_type(None), Some("text/html"));
/// assert_eq!(get_content_type(Some(".PNG")), None);
/// ```
pub fn get_content_type(extension: Option<&str>) -> Option<&'static str> {
    let ext = extension.unwrap_or(DEFAULT_EXTENSION);
    MIME_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
}
