//! Helpers for presenting stored media: kind detection from URLs, count
//! rounding and URL shortening.

use serde::{Deserialize, Serialize};

const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "avi", "mov", "wmv", "flv", "mkv", "webm", "m4v", "mpg", "mpeg", "3gp", "3g2", "m2ts",
    "ts", "ogv",
];

const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "tiff", "svg", "webp", "ico", "heic", "heif", "raw", "ppm",
    "pgm", "pbm", "pnm",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MediaKind {
    Video,
    Image,
    Unknown,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Video => "VIDEO",
            MediaKind::Image => "IMAGE",
            MediaKind::Unknown => "UNKNOWN",
        }
    }

    /// Classify a URL or file name by its extension. Query strings and
    /// fragments are ignored.
    pub fn from_url(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        let extension = match path.rsplit_once('.') {
            Some((_, ext)) if !ext.contains('/') => ext.to_ascii_lowercase(),
            _ => return MediaKind::Unknown,
        };

        if VIDEO_EXTENSIONS.contains(&extension.as_str()) {
            MediaKind::Video
        } else if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            MediaKind::Image
        } else {
            MediaKind::Unknown
        }
    }
}

/// Shorten long URLs to `first20...last8` for table cells.
pub fn truncate_url(url: &str) -> String {
    let chars: Vec<char> = url.chars().collect();
    if chars.len() <= 29 {
        return url.to_string();
    }
    let start: String = chars[..20].iter().collect();
    let end: String = chars[chars.len() - 8..].iter().collect();
    format!("{}...{}", start, end)
}

/// Render a count with at most two decimals, truncated (not rounded).
/// Missing counts render as an empty string.
pub fn format_count(count: Option<f64>) -> String {
    let Some(value) = count else {
        return String::new();
    };
    let text = value.to_string();
    match text.find('.') {
        Some(dot) => text.chars().take(dot + 3).collect(),
        None => text,
    }
}
