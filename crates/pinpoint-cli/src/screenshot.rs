//! Screenshot attachments
//!
//! Feedback carries screenshots inline as `data:` URLs.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::path::Path;

use crate::client::{ClientError, Result};

/// Read an image file and encode it as a base64 data URL
pub fn data_url_from_file(path: &Path) -> Result<String> {
    let mime = image_mime_type(path)
        .ok_or_else(|| ClientError::UnsupportedImage(path.display().to_string()))?;
    let bytes = std::fs::read(path)?;
    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}

fn image_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}
