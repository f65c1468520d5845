//! Species image URL handling
//!
//! Backend photo URLs are either direct image links or Wikimedia
//! `Special:FilePath` links. A failed image load falls back to an inline
//! placeholder exactly once.

use crate::html::escape;

/// Inline SVG shown when a species image cannot be loaded
pub const IMAGE_PLACEHOLDER: &str = "data:image/svg+xml,%3Csvg xmlns=%22http://www.w3.org/2000/svg%22 width=%22200%22 height=%22200%22%3E%3Crect width=%22200%22 height=%22200%22 fill=%22%23ddd%22/%3E%3Ctext x=%2250%25%22 y=%2250%25%22 text-anchor=%22middle%22 dy=%22.3em%22 fill=%22%23999%22%3E이미지 없음%3C/text%3E%3C/svg%3E";

const DIRECT_IMAGE_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".gif", ".webp"];
const FILE_PATH_MARKER: &str = "Special:FilePath/";
const COMMONS_FILE_PATH: &str = "https://commons.wikimedia.org/wiki/Special:FilePath/";

/// Normalize a photo URL for display
///
/// Direct image URLs pass through, `Special:FilePath` URLs are rewritten to
/// the canonical Commons form, anything else passes through unchanged.
/// Normalizing is idempotent.
pub fn normalize_image_url(url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }

    let lower = url.to_ascii_lowercase();
    if DIRECT_IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        return url.to_string();
    }

    if let Some(idx) = url.find(FILE_PATH_MARKER) {
        let filename = &url[idx + FILE_PATH_MARKER.len()..];
        if !filename.is_empty() {
            return format!("{}{}", COMMONS_FILE_PATH, filename);
        }
    }

    url.to_string()
}

/// `<img>` tag whose error handler swaps in the placeholder and disarms itself
pub fn img_tag(url: &str, alt: &str, class: Option<&str>) -> String {
    let class_attr = class
        .map(|c| format!(" class=\"{}\"", escape(c)))
        .unwrap_or_default();
    format!(
        "<img src=\"{}\" alt=\"{}\" onerror=\"this.onerror=null;this.src='{}'\"{}>",
        escape(&normalize_image_url(url)),
        escape(alt),
        IMAGE_PLACEHOLDER,
        class_attr
    )
}

/// Load state of one rendered image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSlot {
    src: String,
    fallback_armed: bool,
}

impl ImageSlot {
    pub fn new(url: &str) -> Self {
        Self {
            src: normalize_image_url(url),
            fallback_armed: true,
        }
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    /// Handle a load failure; returns true if the placeholder was swapped in
    ///
    /// Only the first failure swaps, so a failing placeholder cannot loop.
    pub fn on_load_error(&mut self) -> bool {
        if !self.fallback_armed {
            return false;
        }
        self.fallback_armed = false;
        self.src = IMAGE_PLACEHOLDER.to_string();
        true
    }

    pub fn is_placeholder(&self) -> bool {
        self.src == IMAGE_PLACEHOLDER
    }
}
