//! Overlay sizing hints.
//!
//! Maps a document type to the card outline drawn over the preview.
//! Purely presentational: capture logic never consults it.

mod policy;

pub use policy::{document_size, DocumentSizeClass, ID1_DOCUMENT_TYPES};
