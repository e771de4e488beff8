//! MIME type detection module
//!
//! Maps a path's extension to a Content-Type. Unknown or missing extensions yield
//! `None` so the response default applies.

use std::path::Path;

/// Get MIME Content-Type for a path based on its extension
pub fn content_type_for(path: &Path) -> Option<String> {
    path.extension()?;
    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
}
