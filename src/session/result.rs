//! The value handed to the host after a successful capture.

use crate::capture::{Frame, SdkMetadata};
use sha2::{Digest, Sha256};

/// Base name of every captured document file.
const CAPTURE_FILE_STEM: &str = "document_capture";

/// A captured document photo.
///
/// Built once from a grabbed frame and moved into the host callback;
/// the session keeps no copy.
#[derive(Clone, PartialEq, Eq)]
pub struct CaptureResult {
    image_bytes: Vec<u8>,
    metadata: SdkMetadata,
    filename: String,
    is_preview_cropped: bool,
}

impl CaptureResult {
    /// Packages a frame as `document_capture.<ext>`.
    pub fn from_frame(frame: Frame) -> Self {
        let filename = format!("{}.{}", CAPTURE_FILE_STEM, frame.extension());
        let (image_bytes, metadata, _) = frame.into_parts();
        Self {
            image_bytes,
            metadata,
            filename,
            is_preview_cropped: true,
        }
    }

    /// Encoded image bytes.
    #[inline]
    pub fn image_bytes(&self) -> &[u8] {
        &self.image_bytes
    }

    /// Device metadata, untouched.
    #[inline]
    pub fn metadata(&self) -> &SdkMetadata {
        &self.metadata
    }

    /// `document_capture.<ext>`.
    #[inline]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Always true for live captures.
    #[inline]
    pub fn is_preview_cropped(&self) -> bool {
        self.is_preview_cropped
    }

    /// SHA-256 of the image, hex encoded. Used in logs instead of the bytes.
    pub fn fingerprint(&self) -> String {
        Sha256::digest(&self.image_bytes)
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }

    /// Consumes the result, returning the image bytes.
    pub fn into_image_bytes(self) -> Vec<u8> {
        self.image_bytes
    }
}

impl std::fmt::Debug for CaptureResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureResult")
            .field("filename", &self.filename)
            .field("is_preview_cropped", &self.is_preview_cropped)
            .field("metadata", &self.metadata)
            .field("image_bytes", &self.image_bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_from_mime() {
        let frame = Frame::new(vec![1, 2, 3], SdkMetadata::at(1000), "image/png");
        let result = CaptureResult::from_frame(frame);

        assert_eq!(result.filename(), "document_capture.png");
        assert!(result.is_preview_cropped());
        assert_eq!(result.metadata(), &SdkMetadata::at(1000));
        assert_eq!(result.image_bytes(), &[1, 2, 3]);
    }

    #[test]
    fn test_fingerprint() {
        let frame = Frame::new(b"abc".to_vec(), SdkMetadata::default(), "image/jpeg");
        let result = CaptureResult::from_frame(frame);
        assert_eq!(
            result.fingerprint(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
