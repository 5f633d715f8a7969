//! Error types for docsim library.

use std::io;
use thiserror::Error;

/// Result type alias for docsim operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading, scoring or highlighting documents.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// No loader is registered for the requested document type.
    #[error("Unsupported document type: {0}")]
    UnsupportedDocType(String),

    /// A document could not be read or decoded.
    #[error("Failed to load document '{name}': {reason}")]
    DocumentLoad {
        /// Path or handle name of the document
        name: String,
        /// Underlying cause
        reason: String,
    },

    /// The word has no entry in the word-vector table.
    #[error("Word not found in vocabulary: {0}")]
    VocabularyLookup(String),

    /// Normalization left nothing to vectorize.
    #[error("Document is empty after normalization: {0}")]
    EmptyDocument(String),

    /// The word-vector file is malformed.
    #[error("Invalid vectors file at line {line}: {reason}")]
    VectorFormat {
        /// 1-based line number
        line: usize,
        /// What was wrong with the line
        reason: String,
    },

    /// A highlight annotation could not be attached to a page.
    #[error("Annotation error: {0}")]
    Annotation(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a [`Error::DocumentLoad`] from a name and any displayable cause.
    pub fn load(name: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Error::DocumentLoad {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}
