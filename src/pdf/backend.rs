//! PDF backend abstraction layer.
//!
//! Provides a trait-based interface for the PDF operations the layout walker
//! needs, isolating the concrete PDF library (lopdf) from glyph positioning.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use super::metrics::{core_metrics, CoreMetrics};
use crate::error::{Error, Result};

/// Page identifier: (object number, generation number).
pub type PageId = (u32, u16);

/// Width used for codes the font has no metrics for, in thousandths of
/// an em.
pub const DEFAULT_GLYPH_WIDTH: f32 = 500.0;

/// Width of the space character when the font carries no metrics.
const DEFAULT_SPACE_WIDTH: f32 = 250.0;

/// Font information returned by the backend.
#[derive(Debug, Clone)]
pub struct BackendFontInfo {
    /// Font resource name (key in the page's font dictionary).
    pub name: Vec<u8>,
    /// Base font name (e.g., "Helvetica-Bold").
    pub base_font: String,
    /// Bytes per character code (2 for composite fonts).
    pub code_len: usize,
    /// First code covered by `widths`.
    pub first_char: u32,
    /// Glyph widths in thousandths of an em, starting at `first_char`.
    pub widths: Vec<f32>,
    /// Built-in metrics of a standard font, used for codes `widths` misses.
    pub core: Option<&'static CoreMetrics>,
}

impl BackendFontInfo {
    /// Font info for a name with no metrics available.
    pub fn unknown(name: &[u8]) -> Self {
        Self {
            name: name.to_vec(),
            base_font: String::from_utf8_lossy(name).to_string(),
            code_len: 1,
            first_char: 0,
            widths: Vec::new(),
            core: None,
        }
    }

    /// Width of a character code in thousandths of an em.
    ///
    /// Looks in `/Widths` first, then in the standard font metrics, then
    /// falls back to fixed defaults.
    pub fn glyph_width(&self, code: u32) -> f32 {
        code.checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize))
            .copied()
            .filter(|w| *w > 0.0)
            .or_else(|| self.core.map(|m| m.width(code)))
            .unwrap_or(if code == 32 {
                DEFAULT_SPACE_WIDTH
            } else {
                DEFAULT_GLYPH_WIDTH
            })
    }
}

/// A value from a PDF content stream operand.
#[derive(Debug, Clone)]
pub enum PdfValue {
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Other,
}

/// A single operation from a PDF content stream.
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    /// Numeric operand at `index`, if present.
    pub fn number(&self, index: usize) -> Option<f32> {
        self.operands.get(index).and_then(get_number_from_value)
    }
}

/// Abstract interface for PDF document access.
///
/// Implementations provide page enumeration, font metrics, content stream
/// decoding, and text decoding without exposing concrete PDF library types.
pub trait PdfBackend {
    /// Return all pages as (page_number → PageId).
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Return font info for a given page.
    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>>;

    /// Return the raw (decompressed) content stream bytes for a page.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>>;

    /// Parse raw content stream bytes into a sequence of operations.
    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>>;

    /// Resolve the text encodings of every font on a page.
    ///
    /// Called once per page; the returned decoder is then used for each
    /// character code drawn on it.
    fn page_decoder(&self, page: PageId) -> Box<dyn TextDecoder + '_>;
}

/// Decodes string operands into text for the fonts of one page.
pub trait TextDecoder {
    /// Decode `bytes` drawn with the font resource `font_name`.
    fn decode(&self, font_name: &[u8], bytes: &[u8]) -> String;
}

/// Decoder for pages whose fonts carry no usable encoding.
pub struct SimpleDecoder;

impl TextDecoder for SimpleDecoder {
    fn decode(&self, _font_name: &[u8], bytes: &[u8]) -> String {
        decode_text_simple(bytes)
    }
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

// ---------------------------------------------------------------------------
// LopdfBackend: concrete implementation backed by lopdf
// ---------------------------------------------------------------------------

use lopdf::{Dictionary, Document as LopdfDocument, Encoding, Object};

/// Concrete [`PdfBackend`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
}

impl LopdfBackend {
    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let doc = LopdfDocument::load(path)?;
        Ok(Self { doc })
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data)?;
        Ok(Self { doc })
    }

    /// Wrap an already loaded document.
    pub fn from_document(doc: LopdfDocument) -> Self {
        Self { doc }
    }

    /// Direct access to the underlying `lopdf::Document`.
    pub fn raw_doc(&self) -> &LopdfDocument {
        &self.doc
    }

    /// Mutable access to the underlying document, for annotation writing.
    pub fn raw_doc_mut(&mut self) -> &mut LopdfDocument {
        &mut self.doc
    }

    /// Check if the document is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted()
    }

    /// Follow a reference, or return the object itself.
    fn resolve<'a>(&'a self, obj: &'a Object) -> Option<&'a Object> {
        match obj {
            Object::Reference(r) => self.doc.get_object(*r).ok(),
            other => Some(other),
        }
    }

    fn font_info(&self, name: &[u8], font: &Dictionary) -> BackendFontInfo {
        let base_font = font
            .get(b"BaseFont")
            .ok()
            .and_then(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        let composite = font
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            .is_some_and(|n| n == b"Type0");

        let first_char = font
            .get(b"FirstChar")
            .ok()
            .and_then(|o| self.resolve(o))
            .and_then(get_number)
            .map(|n| n.max(0.0) as u32)
            .unwrap_or(0);

        let widths: Vec<f32> = font
            .get(b"Widths")
            .ok()
            .and_then(|o| self.resolve(o))
            .and_then(|o| o.as_array().ok())
            .map(|arr| {
                arr.iter()
                    .map(|w| self.resolve(w).and_then(get_number).unwrap_or(0.0))
                    .collect()
            })
            .unwrap_or_default();

        let core = if composite {
            None
        } else {
            core_metrics(&base_font)
        };
        if widths.is_empty() && core.is_none() {
            log::debug!("No glyph metrics for font {}", base_font);
        }

        BackendFontInfo {
            name: name.to_vec(),
            base_font,
            code_len: if composite { 2 } else { 1 },
            first_char,
            widths,
            core,
        }
    }

    /// The font's text encoding, or `None` when it declares neither
    /// `/Encoding` nor `/ToUnicode`.
    fn font_encoding<'a>(&'a self, font: &'a Dictionary) -> Option<Encoding<'a>> {
        if !font.has(b"Encoding") && !font.has(b"ToUnicode") {
            return None;
        }
        font.get_font_encoding(&self.doc)
            .map_err(|e| log::debug!("Unusable font encoding: {}", e))
            .ok()
    }
}

/// Encodings of one page's fonts, keyed by resource name.
struct PageEncodings<'a> {
    encodings: HashMap<Vec<u8>, Encoding<'a>>,
}

impl TextDecoder for PageEncodings<'_> {
    fn decode(&self, font_name: &[u8], bytes: &[u8]) -> String {
        self.encodings
            .get(font_name)
            .and_then(|enc| LopdfDocument::decode_text(enc, bytes).ok())
            .unwrap_or_else(|| decode_text_simple(bytes))
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>> {
        let lopdf_fonts = self
            .doc
            .get_page_fonts(page)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        Ok(lopdf_fonts
            .iter()
            .map(|(name, font_dict)| self.font_info(name, font_dict))
            .collect())
    }

    fn page_content(&self, page_id: PageId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        // A page without /Contents is blank
        let contents = match page_dict.get(b"Contents") {
            Ok(c) => c,
            Err(_) => return Ok(Vec::new()),
        };

        match contents {
            Object::Reference(r) => match self.doc.get_object(*r) {
                // Unfiltered streams do not decompress; use them as stored
                Ok(Object::Stream(s)) => Ok(s
                    .decompressed_content()
                    .unwrap_or_else(|_| s.content.clone())),
                Ok(Object::Array(arr)) => Ok(self.concat_streams(arr)),
                _ => Err(Error::PdfParse("Invalid content stream".to_string())),
            },
            Object::Array(arr) => Ok(self.concat_streams(arr)),
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>> {
        let content =
            lopdf::content::Content::decode(data).map_err(|e| Error::PdfParse(e.to_string()))?;

        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operator: op.operator,
                operands: op.operands.iter().map(convert_object).collect(),
            })
            .collect())
    }

    fn page_decoder(&self, page: PageId) -> Box<dyn TextDecoder + '_> {
        let fonts = match self.doc.get_page_fonts(page) {
            Ok(fonts) => fonts,
            Err(_) => return Box::new(SimpleDecoder),
        };

        let encodings = fonts
            .into_iter()
            .filter_map(|(name, font)| Some((name, self.font_encoding(font)?)))
            .collect();
        Box::new(PageEncodings { encodings })
    }
}

impl LopdfBackend {
    fn concat_streams(&self, arr: &[Object]) -> Vec<u8> {
        let mut content = Vec::new();
        for obj in arr {
            if let Object::Reference(r) = obj {
                if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                    match s.decompressed_content() {
                        Ok(data) => content.extend_from_slice(&data),
                        Err(_) => content.extend_from_slice(&s.content),
                    }
                    content.push(b'\n');
                }
            }
        }
        content
    }
}

/// Convert a `lopdf::Object` to [`PdfValue`].
fn convert_object(obj: &Object) -> PdfValue {
    match obj {
        Object::Integer(i) => PdfValue::Integer(*i),
        Object::Real(r) => PdfValue::Real(*r),
        Object::Name(n) => PdfValue::Name(n.clone()),
        Object::String(b, _) => PdfValue::Str(b.clone()),
        Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        _ => PdfValue::Other,
    }
}

fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Helper: extract a number from a [`PdfValue`].
pub fn get_number_from_value(val: &PdfValue) -> Option<f32> {
    match val {
        PdfValue::Integer(i) => Some(*i as f32),
        PdfValue::Real(r) => Some(*r),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_text_simple_utf8() {
        assert_eq!(decode_text_simple(b"Hello"), "Hello");
    }

    #[test]
    fn test_decode_text_simple_latin1() {
        // 0xE9 = 'é' in Latin-1
        let bytes = vec![0x48, 0x65, 0x6C, 0x6C, 0xE9];
        assert_eq!(decode_text_simple(&bytes), "Hellé");
    }

    #[test]
    fn test_decode_text_simple_utf16be() {
        let bytes = vec![0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69];
        assert_eq!(decode_text_simple(&bytes), "Hi");
    }

    #[test]
    fn test_glyph_width_lookup() {
        let font = BackendFontInfo {
            name: b"F1".to_vec(),
            base_font: "Test".to_string(),
            code_len: 1,
            first_char: 65,
            widths: vec![600.0, 0.0, 700.0],
            core: None,
        };
        assert_eq!(font.glyph_width(65), 600.0);
        assert_eq!(font.glyph_width(67), 700.0);
        // Zero width and out-of-range codes fall back to defaults
        assert_eq!(font.glyph_width(66), DEFAULT_GLYPH_WIDTH);
        assert_eq!(font.glyph_width(32), DEFAULT_SPACE_WIDTH);
        assert_eq!(font.glyph_width(10), DEFAULT_GLYPH_WIDTH);
    }

    #[test]
    fn test_glyph_width_standard_font() {
        let font = BackendFontInfo {
            name: b"F1".to_vec(),
            base_font: "Helvetica".to_string(),
            code_len: 1,
            first_char: 0,
            widths: Vec::new(),
            core: core_metrics("Helvetica"),
        };
        assert_eq!(font.glyph_width(u32::from(b'i')), 222.0);
        assert_eq!(font.glyph_width(u32::from(b'W')), 944.0);
        assert_eq!(font.glyph_width(32), 278.0);
    }

    #[test]
    fn test_font_info_without_widths_uses_core_metrics() {
        use lopdf::dictionary;

        let backend = LopdfBackend::from_document(LopdfDocument::with_version("1.5"));
        let helvetica = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        };
        let info = backend.font_info(b"F1", &helvetica);
        assert!(info.widths.is_empty());
        assert_eq!(info.core.map(|m| m.name), Some("Helvetica"));
        assert_eq!(info.glyph_width(u32::from(b'I')), 278.0);

        let custom = dictionary! {
            "Type" => "Font",
            "Subtype" => "TrueType",
            "BaseFont" => "MyFont",
        };
        let info = backend.font_info(b"F2", &custom);
        assert!(info.core.is_none());
        assert_eq!(info.glyph_width(u32::from(b'I')), DEFAULT_GLYPH_WIDTH);
    }

    #[test]
    fn test_font_without_encoding_decodes_simply() {
        use lopdf::dictionary;

        let backend = LopdfBackend::from_document(LopdfDocument::with_version("1.5"));
        let bare = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        };
        assert!(backend.font_encoding(&bare).is_none());

        let win_ansi = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        };
        let enc = backend.font_encoding(&win_ansi).unwrap();
        assert_eq!(LopdfDocument::decode_text(&enc, b"Invoice").unwrap(), "Invoice");
    }

    #[test]
    fn test_simple_decoder() {
        assert_eq!(SimpleDecoder.decode(b"F1", b"abc"), "abc");
    }

    #[test]
    fn test_content_op_number() {
        let op = ContentOp {
            operator: "Td".to_string(),
            operands: vec![PdfValue::Integer(72), PdfValue::Real(1.5), PdfValue::Other],
        };
        assert_eq!(op.number(0), Some(72.0));
        assert_eq!(op.number(1), Some(1.5));
        assert_eq!(op.number(2), None);
        assert_eq!(op.number(3), None);
    }
}
