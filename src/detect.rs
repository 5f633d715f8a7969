//! Document type sniffing and PDF header validation.

use crate::error::{Error, Result};
use crate::loader::DocType;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// PDF header information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfFormat {
    /// PDF version (e.g., "1.7", "2.0")
    pub version: String,
}

impl std::fmt::Display for PdfFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)
    }
}

const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// Number of leading bytes searched for the PDF magic.
///
/// Some producers emit garbage before the header; readers accept it within
/// the first kilobyte.
const HEADER_WINDOW: usize = 1024;

/// Validate the PDF header in `data` and return its version.
///
/// # Returns
/// * `Ok(PdfFormat)` if a `%PDF-x.y` header is found near the start
/// * `Err(Error::UnknownFormat)` if there is no header
/// * `Err(Error::UnsupportedVersion)` if the version is not `digit.digit`
pub fn detect_pdf(data: &[u8]) -> Result<PdfFormat> {
    let window = &data[..data.len().min(HEADER_WINDOW)];
    let start = window
        .windows(PDF_MAGIC.len())
        .position(|w| w == PDF_MAGIC)
        .ok_or(Error::UnknownFormat)?;

    let version_start = start + PDF_MAGIC.len();
    let version_bytes = data
        .get(version_start..version_start + VERSION_LEN)
        .ok_or(Error::UnknownFormat)?;
    let version = String::from_utf8_lossy(version_bytes).to_string();

    if !is_valid_version(&version) {
        return Err(Error::UnsupportedVersion(version));
    }

    Ok(PdfFormat { version })
}

fn is_valid_version(version: &str) -> bool {
    let bytes = version.as_bytes();
    bytes.len() == 3 && bytes[0].is_ascii_digit() && bytes[1] == b'.' && bytes[2].is_ascii_digit()
}

/// Check if bytes start like a PDF file.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    detect_pdf(data).is_ok()
}

/// Guess the document type of raw bytes: PDF when a header is present,
/// text otherwise.
pub fn sniff_doc_type(data: &[u8]) -> DocType {
    if is_pdf_bytes(data) {
        DocType::Pdf
    } else {
        DocType::Text
    }
}

/// Guess the document type of a file from its leading bytes.
pub fn sniff_doc_type_from_path<P: AsRef<Path>>(path: P) -> Result<DocType> {
    let mut header = Vec::with_capacity(HEADER_WINDOW);
    File::open(path)?
        .take(HEADER_WINDOW as u64)
        .read_to_end(&mut header)?;
    Ok(sniff_doc_type(&header))
}
