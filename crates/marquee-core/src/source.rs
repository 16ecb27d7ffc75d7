//! Media source classification.
//!
//! Decides whether a URL points at a segmented adaptive stream (an HLS
//! manifest) or a single progressive file, which in turn selects the delivery
//! path the streaming session takes.

use serde::{Deserialize, Serialize};

/// File extension of a segmented-stream manifest.
pub const SEGMENTED_MANIFEST_EXTENSION: &str = ".m3u8";

/// MIME type probed on the surface for native segmented playback.
pub const SEGMENTED_MIME_TYPE: &str = "application/vnd.apple.mpegurl";

/// A classified playback source. Immutable for the lifetime of a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSource {
    /// The URL as supplied by the page layer.
    pub url: String,
    /// Whether the URL is a segmented-stream manifest.
    pub is_segmented: bool,
}

impl PlaybackSource {
    /// Classify `url`.
    pub fn resolve(url: impl Into<String>) -> Self {
        let url = url.into();
        let is_segmented = is_segmented_url(&url);
        Self { url, is_segmented }
    }
}

/// Returns true if the URL's path ends with the manifest extension.
///
/// Query strings and fragments are ignored so signed CDN URLs such as
/// `index.m3u8?token=...` still classify as segmented.
pub fn is_segmented_url(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.ends_with(SEGMENTED_MANIFEST_EXTENSION)
}
