//! PDF document loader.

use crate::detect::detect_pdf;
use crate::error::{Error, Result};
use crate::pdf::{LayoutAnalyzer, LopdfBackend, PdfBackend};

use super::{DocType, DocumentLoader};

/// PDF document loader.
///
/// Extracts the plain text of every page, in page order. Lines are joined
/// with `\n` and pages with a blank line.
#[derive(Debug, Clone, Default)]
pub struct PdfLoader {
    _private: (),
}

impl PdfLoader {
    /// Create a new PDF loader.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl DocumentLoader for PdfLoader {
    fn doc_type(&self) -> DocType {
        DocType::Pdf
    }

    fn name(&self) -> &str {
        "pdf"
    }

    fn load_bytes(&self, bytes: &[u8]) -> Result<String> {
        let format = detect_pdf(bytes)?;
        let backend = LopdfBackend::load_bytes(bytes)?;
        if backend.is_encrypted() {
            return Err(Error::Encrypted);
        }

        log::trace!("{}, {} pages", format, backend.pages().len());
        LayoutAnalyzer::new(&backend).document_text()
    }
}
