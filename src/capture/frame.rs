//! Frame type representing a grabbed still image with device metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metadata supplied by the device layer alongside a frame.
///
/// The session never inspects or modifies it; it is handed to the host
/// exactly as the device produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkMetadata {
    /// Capture timestamp in milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
    /// Human-readable device label, when the device reports one.
    pub device_label: Option<String>,
    /// Any other device-specific fields.
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl SdkMetadata {
    /// Creates metadata carrying only a timestamp.
    pub fn at(timestamp_ms: i64) -> Self {
        Self {
            timestamp_ms,
            ..Default::default()
        }
    }

    /// Creates metadata stamped with the current wall-clock time.
    pub fn now() -> Self {
        Self::at(Utc::now().timestamp_millis())
    }

    /// Returns the capture timestamp as a UTC datetime.
    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp_ms)
    }
}

/// A single still image grabbed from the live stream.
#[derive(Clone)]
pub struct Frame {
    /// Encoded image bytes.
    bytes: Vec<u8>,
    /// Device-supplied metadata.
    metadata: SdkMetadata,
    /// MIME type of `bytes`, e.g. `image/jpeg`.
    mime_type: String,
}

impl Frame {
    /// Creates a new frame.
    pub fn new(bytes: Vec<u8>, metadata: SdkMetadata, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            metadata,
            mime_type: mime_type.into(),
        }
    }

    /// Returns the encoded image bytes.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the device metadata.
    #[inline]
    pub fn metadata(&self) -> &SdkMetadata {
        &self.metadata
    }

    /// Returns the MIME type of the bytes.
    #[inline]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// File extension derived from the MIME subtype.
    pub fn extension(&self) -> &str {
        mime_extension(&self.mime_type)
    }

    /// Splits the frame into its parts.
    pub fn into_parts(self) -> (Vec<u8>, SdkMetadata, String) {
        (self.bytes, self.metadata, self.mime_type)
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("mime_type", &self.mime_type)
            .field("timestamp_ms", &self.metadata.timestamp_ms)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Returns the subtype of a MIME type, ignoring parameters.
///
/// `image/jpeg` gives `jpeg`; a value without a slash is returned trimmed.
pub fn mime_extension(mime_type: &str) -> &str {
    let essence = mime_type.split(';').next().unwrap_or(mime_type).trim();
    match essence.split_once('/') {
        Some((_, subtype)) => subtype,
        None => essence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_extension() {
        assert_eq!(mime_extension("image/jpeg"), "jpeg");
        assert_eq!(mime_extension("image/png; q=0.9"), "png");
        assert_eq!(mime_extension("webp"), "webp");
    }

    #[test]
    fn test_frame_parts() {
        let frame = Frame::new(vec![1, 2, 3], SdkMetadata::at(1000), "image/jpeg");
        assert_eq!(frame.extension(), "jpeg");

        let (bytes, metadata, mime) = frame.into_parts();
        assert_eq!(bytes, vec![1, 2, 3]);
        assert_eq!(metadata.timestamp_ms, 1000);
        assert_eq!(mime, "image/jpeg");
    }

    #[test]
    fn test_captured_at() {
        let metadata = SdkMetadata::at(1_000);
        let at = metadata.captured_at().unwrap();
        assert_eq!(at.timestamp_millis(), 1_000);
    }
}
