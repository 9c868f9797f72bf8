//! Document size classification.

use serde::{Deserialize, Serialize};

/// Document types printed on ID-1 (credit card sized) stock.
pub const ID1_DOCUMENT_TYPES: &[&str] = &["driving_licence", "national_identity_card"];

/// ISO/IEC 7810 size class used to shape the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentSizeClass {
    /// 85.60 × 53.98 mm cards.
    ID1,
    /// 125 × 88 mm passport pages; the default for anything else.
    ID3,
}

impl DocumentSizeClass {
    /// Width over height of the outline.
    pub fn aspect_ratio(self) -> f64 {
        match self {
            DocumentSizeClass::ID1 => 85.60 / 53.98,
            DocumentSizeClass::ID3 => 125.0 / 88.0,
        }
    }
}

/// Classifies a document type. Unknown or missing types are `ID3`.
pub fn document_size(document_type: Option<&str>) -> DocumentSizeClass {
    match document_type {
        Some(t) if ID1_DOCUMENT_TYPES.contains(&t) => DocumentSizeClass::ID1,
        _ => DocumentSizeClass::ID3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id1_documents() {
        assert_eq!(document_size(Some("driving_licence")), DocumentSizeClass::ID1);
        assert_eq!(
            document_size(Some("national_identity_card")),
            DocumentSizeClass::ID1
        );
    }

    #[test]
    fn test_everything_else_is_id3() {
        assert_eq!(document_size(Some("passport")), DocumentSizeClass::ID3);
        assert_eq!(document_size(Some("residence_permit")), DocumentSizeClass::ID3);
        assert_eq!(document_size(Some("")), DocumentSizeClass::ID3);
        assert_eq!(document_size(None), DocumentSizeClass::ID3);
    }

    #[test]
    fn test_repeated_calls_agree() {
        let first = document_size(Some("driving_licence"));
        for _ in 0..10 {
            assert_eq!(document_size(Some("driving_licence")), first);
        }
    }

    #[test]
    fn test_id1_is_wider() {
        assert!(DocumentSizeClass::ID1.aspect_ratio() > DocumentSizeClass::ID3.aspect_ratio());
    }
}
