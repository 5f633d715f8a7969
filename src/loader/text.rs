//! Plain text loader.

use crate::error::{Error, Result};

use super::{DocType, DocumentLoader};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// UTF-8 plain text loader.
///
/// Decoding is strict; a leading byte-order mark is dropped.
#[derive(Debug, Clone, Default)]
pub struct TextLoader {
    _private: (),
}

impl TextLoader {
    /// Create a new text loader.
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl DocumentLoader for TextLoader {
    fn doc_type(&self) -> DocType {
        DocType::Text
    }

    fn name(&self) -> &str {
        "text"
    }

    fn load_bytes(&self, bytes: &[u8]) -> Result<String> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|e| Error::Other(format!("invalid UTF-8: {}", e)))
    }
}
