//! Glyph-level layout analysis for PDF pages.
//!
//! Walks page content streams, tracking the graphics and text state, and
//! produces positioned glyphs grouped into lines. The positions are what the
//! search and highlight steps turn into quads, and the line text is what the
//! PDF loader feeds into normalization.

use std::collections::HashMap;

use super::backend::{BackendFontInfo, ContentOp, PageId, PdfBackend, PdfValue, TextDecoder};
use crate::error::{Error, Result};

/// Affine matrix `[a b c d e f]` in PDF row-vector convention.
pub type Matrix = [f32; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// Descender depth as a fraction of the effective font size.
const DESCENT: f32 = 0.2;
/// Ascender height as a fraction of the effective font size.
const ASCENT: f32 = 0.8;

/// `m1 × m2`.
fn multiply(m1: &Matrix, m2: &Matrix) -> Matrix {
    [
        m1[0] * m2[0] + m1[1] * m2[2],
        m1[0] * m2[1] + m1[1] * m2[3],
        m1[2] * m2[0] + m1[3] * m2[2],
        m1[2] * m2[1] + m1[3] * m2[3],
        m1[4] * m2[0] + m1[5] * m2[2] + m2[4],
        m1[4] * m2[1] + m1[5] * m2[3] + m2[5],
    ]
}

fn translation(tx: f32, ty: f32) -> Matrix {
    [1.0, 0.0, 0.0, 1.0, tx, ty]
}

fn transform_point(m: &Matrix, x: f32, y: f32) -> (f32, f32) {
    (m[0] * x + m[2] * y + m[4], m[1] * x + m[3] * y + m[5])
}

fn matrix_operands(op: &ContentOp) -> Option<Matrix> {
    Some([
        op.number(0)?,
        op.number(1)?,
        op.number(2)?,
        op.number(3)?,
        op.number(4)?,
        op.number(5)?,
    ])
}

/// A single positioned character in page user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    /// The decoded character
    pub ch: char,
    /// Left edge
    pub x0: f32,
    /// Right edge
    pub x1: f32,
    /// Baseline Y
    pub baseline: f32,
    /// Bottom of the glyph box (baseline minus descender)
    pub bottom: f32,
    /// Top of the glyph box (baseline plus ascender)
    pub top: f32,
    /// Effective font size in user space
    pub size: f32,
}

impl Glyph {
    /// Whether this glyph is whitespace.
    pub fn is_space(&self) -> bool {
        self.ch.is_whitespace()
    }

    /// A synthetic space filling the gap between two glyphs.
    fn gap_filler(prev: &Glyph, next: &Glyph) -> Glyph {
        Glyph {
            ch: ' ',
            x0: prev.x1,
            x1: next.x0,
            baseline: prev.baseline,
            bottom: prev.bottom.min(next.bottom),
            top: prev.top.max(next.top),
            size: prev.size.max(next.size),
        }
    }
}

/// Glyphs drawn by one text-showing operator.
#[derive(Debug, Clone)]
pub struct TextSpan {
    /// Glyphs in drawing order
    pub glyphs: Vec<Glyph>,
    /// Baseline Y of the first glyph
    pub baseline: f32,
    /// Effective font size
    pub font_size: f32,
}

impl TextSpan {
    fn from_glyphs(glyphs: Vec<Glyph>) -> Option<Self> {
        let first = glyphs.first()?;
        Some(Self {
            baseline: first.baseline,
            font_size: first.size,
            glyphs,
        })
    }

    /// Left edge of the span.
    pub fn x0(&self) -> f32 {
        self.glyphs.iter().map(|g| g.x0).fold(f32::INFINITY, f32::min)
    }

    /// The span's text.
    pub fn text(&self) -> String {
        self.glyphs.iter().map(|g| g.ch).collect()
    }
}

/// A line of glyphs sharing a baseline, ordered left to right.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// Glyphs in reading order, including synthetic spaces for visual gaps
    pub glyphs: Vec<Glyph>,
    /// Y position (baseline)
    pub baseline: f32,
    /// Largest effective font size on the line
    pub font_size: f32,
}

impl TextLine {
    /// Create a new text line from spans on the same baseline.
    ///
    /// Gaps wider than a fifth of the font size between two non-space glyphs
    /// become a synthetic space, so words drawn by separate operators or
    /// separated by kerning adjustments stay apart.
    pub fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        spans.sort_by(|a, b| a.x0().partial_cmp(&b.x0()).unwrap_or(std::cmp::Ordering::Equal));

        let baseline = spans.first().map(|s| s.baseline).unwrap_or(0.0);
        let font_size = spans.iter().map(|s| s.font_size).fold(0.0, f32::max);

        let mut glyphs: Vec<Glyph> = Vec::new();
        for glyph in spans.into_iter().flat_map(|s| s.glyphs) {
            if let Some(prev) = glyphs.last() {
                let gap = glyph.x0 - prev.x1;
                let threshold = prev.size.max(glyph.size) * 0.2;
                if gap > threshold && !prev.is_space() && !glyph.is_space() {
                    let filler = Glyph::gap_filler(prev, &glyph);
                    glyphs.push(filler);
                }
            }
            glyphs.push(glyph);
        }

        Self {
            glyphs,
            baseline,
            font_size,
        }
    }

    /// The line's text.
    pub fn text(&self) -> String {
        self.glyphs.iter().map(|g| g.ch).collect()
    }
}

/// All text lines of one page, top to bottom.
#[derive(Debug, Clone)]
pub struct PageLayout {
    /// 1-based page number
    pub page_number: u32,
    /// Page object id
    pub page_id: PageId,
    /// Lines sorted top to bottom
    pub lines: Vec<TextLine>,
}

impl PageLayout {
    /// Page text with one line per text line.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Whether the page has no text.
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.glyphs.iter().all(Glyph::is_space))
    }
}

/// Text state parameters (PDF 32000-1, 9.3).
#[derive(Debug, Clone)]
struct TextState {
    font: Option<Vec<u8>>,
    size: f32,
    char_spacing: f32,
    word_spacing: f32,
    h_scale: f32,
    leading: f32,
    rise: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font: None,
            size: 12.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            h_scale: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    text: TextState,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: IDENTITY,
            text: TextState::default(),
        }
    }
}

/// Text object matrices, reset by `BT`.
struct TextObject {
    tm: Matrix,
    tlm: Matrix,
}

impl TextObject {
    fn new() -> Self {
        Self {
            tm: IDENTITY,
            tlm: IDENTITY,
        }
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.tlm = multiply(&translation(tx, ty), &self.tlm);
        self.tm = self.tlm;
    }

    fn next_line(&mut self, state: &TextState) {
        // T* with no leading set would stack lines on top of each other
        let leading = if state.leading != 0.0 {
            state.leading
        } else {
            state.size * 1.2
        };
        self.move_line(0.0, -leading);
    }

    fn advance(&mut self, tx: f32) {
        self.tm = multiply(&translation(tx, 0.0), &self.tm);
    }
}

/// Layout analyzer extracting positioned glyphs from PDF pages.
pub struct LayoutAnalyzer<'a, B: PdfBackend> {
    backend: &'a B,
}

impl<'a, B: PdfBackend> LayoutAnalyzer<'a, B> {
    /// Create a new layout analyzer.
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.backend.pages().len() as u32
    }

    /// Extract text spans from a page with glyph positions.
    pub fn extract_page_spans(&self, page_num: u32) -> Result<Vec<TextSpan>> {
        let pages = self.backend.pages();
        let page_id = *pages
            .get(&page_num)
            .ok_or(Error::PageOutOfRange(page_num, pages.len() as u32))?;

        let fonts: HashMap<Vec<u8>, BackendFontInfo> = self
            .backend
            .page_fonts(page_id)
            .unwrap_or_else(|e| {
                log::warn!("Page {}: font lookup failed: {}", page_num, e);
                Vec::new()
            })
            .into_iter()
            .map(|f| (f.name.clone(), f))
            .collect();

        let content = self.backend.page_content(page_id)?;
        let ops = self.backend.decode_content(&content)?;
        let decoder = self.backend.page_decoder(page_id);
        Ok(walk(page_id, &ops, &fonts, decoder.as_ref()))
    }

    /// Lay out a page into lines.
    pub fn page_layout(&self, page_num: u32) -> Result<PageLayout> {
        let pages = self.backend.pages();
        let page_id = *pages
            .get(&page_num)
            .ok_or(Error::PageOutOfRange(page_num, pages.len() as u32))?;

        let spans = self.extract_page_spans(page_num)?;
        let lines = group_spans_into_lines(spans);
        log::debug!("Page {}: {} text lines", page_num, lines.len());

        Ok(PageLayout {
            page_number: page_num,
            page_id,
            lines,
        })
    }

    /// Lay out every page, in page order.
    pub fn document_layout(&self) -> Result<Vec<PageLayout>> {
        self.backend
            .pages()
            .keys()
            .map(|&n| self.page_layout(n))
            .collect()
    }

    /// Plain text of the whole document; pages separated by a blank line.
    pub fn document_text(&self) -> Result<String> {
        let pages = self.document_layout()?;
        Ok(pages
            .iter()
            .map(PageLayout::text)
            .collect::<Vec<_>>()
            .join("\n\n"))
    }
}

fn walk(
    page_id: PageId,
    ops: &[ContentOp],
    fonts: &HashMap<Vec<u8>, BackendFontInfo>,
    decoder: &dyn TextDecoder,
) -> Vec<TextSpan> {
    let mut spans = Vec::new();
    let mut stack: Vec<GraphicsState> = Vec::new();
    let mut gs = GraphicsState::default();
    let mut text = TextObject::new();

    for op in ops {
        match op.operator.as_str() {
            "q" => stack.push(gs.clone()),
            "Q" => {
                if let Some(saved) = stack.pop() {
                    gs = saved;
                }
            }
            "cm" => {
                if let Some(m) = matrix_operands(op) {
                    gs.ctm = multiply(&m, &gs.ctm);
                }
            }
            "BT" => text = TextObject::new(),
            "Tf" => {
                if let Some(PdfValue::Name(name)) = op.operands.first() {
                    gs.text.font = Some(name.clone());
                }
                if let Some(size) = op.number(1) {
                    gs.text.size = size;
                }
            }
            "Tc" => gs.text.char_spacing = op.number(0).unwrap_or(0.0),
            "Tw" => gs.text.word_spacing = op.number(0).unwrap_or(0.0),
            "Tz" => gs.text.h_scale = op.number(0).unwrap_or(100.0) / 100.0,
            "TL" => gs.text.leading = op.number(0).unwrap_or(0.0),
            "Ts" => gs.text.rise = op.number(0).unwrap_or(0.0),
            "Td" | "TD" => {
                let tx = op.number(0).unwrap_or(0.0);
                let ty = op.number(1).unwrap_or(0.0);
                if op.operator == "TD" {
                    gs.text.leading = -ty;
                }
                text.move_line(tx, ty);
            }
            "Tm" => {
                if let Some(m) = matrix_operands(op) {
                    text.tm = m;
                    text.tlm = m;
                }
            }
            "T*" => text.next_line(&gs.text),
            "Tj" => {
                if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                    let glyphs = show_text(bytes, &gs, &mut text, fonts, decoder);
                    spans.extend(TextSpan::from_glyphs(glyphs));
                }
            }
            "TJ" => {
                if let Some(PdfValue::Array(items)) = op.operands.first() {
                    let mut glyphs = Vec::new();
                    for item in items {
                        match item {
                            PdfValue::Str(bytes) => glyphs.extend(
                                show_text(bytes, &gs, &mut text, fonts, decoder),
                            ),
                            PdfValue::Integer(_) | PdfValue::Real(_) => {
                                // Adjustments are in thousandths of text space units
                                let n = super::backend::get_number_from_value(item)
                                    .unwrap_or(0.0);
                                text.advance(-n / 1000.0 * gs.text.size * gs.text.h_scale);
                            }
                            _ => {}
                        }
                    }
                    spans.extend(TextSpan::from_glyphs(glyphs));
                }
            }
            "'" | "\"" => {
                let text_idx = if op.operator == "\"" {
                    gs.text.word_spacing = op.number(0).unwrap_or(gs.text.word_spacing);
                    gs.text.char_spacing = op.number(1).unwrap_or(gs.text.char_spacing);
                    2
                } else {
                    0
                };
                text.next_line(&gs.text);
                if let Some(PdfValue::Str(bytes)) = op.operands.get(text_idx) {
                    let glyphs = show_text(bytes, &gs, &mut text, fonts, decoder);
                    spans.extend(TextSpan::from_glyphs(glyphs));
                }
            }
            "Do" => {
                // Form XObjects are not descended into
                log::trace!("Skipping XObject on page {:?}", page_id);
            }
            _ => {}
        }
    }

    spans
}

/// Position the glyphs of one string operand and advance the text matrix.
fn show_text(
    bytes: &[u8],
    gs: &GraphicsState,
    text: &mut TextObject,
    fonts: &HashMap<Vec<u8>, BackendFontInfo>,
    decoder: &dyn TextDecoder,
) -> Vec<Glyph> {
    let state = &gs.text;
    let font_key = state.font.clone().unwrap_or_default();
    let unknown;
    let font = match fonts.get(&font_key) {
        Some(f) => f,
        None => {
            unknown = BackendFontInfo::unknown(&font_key);
            &unknown
        }
    };

    let mut glyphs = Vec::new();
    for code_bytes in bytes.chunks(font.code_len.max(1)) {
        let code = code_bytes
            .iter()
            .fold(0u32, |acc, b| (acc << 8) | u32::from(*b));
        let w0 = font.glyph_width(code) / 1000.0;
        let advance_width = w0 * state.size * state.h_scale;

        let trm = multiply(&text.tm, &gs.ctm);
        let (sx, baseline) = transform_point(&trm, 0.0, state.rise);
        let (ex, _) = transform_point(&trm, advance_width, state.rise);
        let scale = (trm[2] * trm[2] + trm[3] * trm[3]).sqrt();
        let size = state.size * scale;
        let (x0, x1) = (sx.min(ex), sx.max(ex));

        let decoded = decoder.decode(&font.name, code_bytes);
        let chars: Vec<char> = decoded.chars().filter(|c| *c != '\0').collect();
        if !chars.is_empty() {
            // Ligatures share the glyph box evenly
            let step = (x1 - x0) / chars.len() as f32;
            for (i, ch) in chars.into_iter().enumerate() {
                glyphs.push(Glyph {
                    ch,
                    x0: x0 + step * i as f32,
                    x1: x0 + step * (i + 1) as f32,
                    baseline,
                    bottom: baseline - size * DESCENT,
                    top: baseline + size * ASCENT,
                    size,
                });
            }
        }

        let mut tx = (w0 * state.size + state.char_spacing) * state.h_scale;
        if code_bytes.len() == 1 && code == 32 {
            tx += state.word_spacing * state.h_scale;
        }
        text.advance(tx);
    }

    glyphs
}

/// Group spans into lines by baseline, top to bottom.
fn group_spans_into_lines(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    if spans.is_empty() {
        return vec![];
    }

    // Sort spans by Y (descending, since PDF Y is bottom-up) then X
    spans.sort_by(|a, b| {
        b.baseline
            .partial_cmp(&a.baseline)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.x0().partial_cmp(&b.x0()).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut lines: Vec<TextLine> = Vec::new();
    let mut current_line_spans: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let y_tolerance = span.font_size * 0.3;

        match current_y {
            Some(y) if (span.baseline - y).abs() <= y_tolerance => {
                current_line_spans.push(span);
            }
            _ => {
                if !current_line_spans.is_empty() {
                    lines.push(TextLine::from_spans(std::mem::take(
                        &mut current_line_spans,
                    )));
                }
                current_y = Some(span.baseline);
                current_line_spans.push(span);
            }
        }
    }

    if !current_line_spans.is_empty() {
        lines.push(TextLine::from_spans(current_line_spans));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::backend::SimpleDecoder;
    use std::collections::BTreeMap;

    /// Backend serving a single page from pre-built operations.
    struct MockBackend {
        ops: Vec<ContentOp>,
        fonts: Vec<BackendFontInfo>,
    }

    impl PdfBackend for MockBackend {
        fn pages(&self) -> BTreeMap<u32, PageId> {
            BTreeMap::from([(1, (3, 0))])
        }

        fn page_fonts(&self, _page: PageId) -> Result<Vec<BackendFontInfo>> {
            Ok(self.fonts.clone())
        }

        fn page_content(&self, _page: PageId) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }

        fn decode_content(&self, _data: &[u8]) -> Result<Vec<ContentOp>> {
            Ok(self.ops.clone())
        }

        fn page_decoder(&self, _page: PageId) -> Box<dyn TextDecoder + '_> {
            Box::new(SimpleDecoder)
        }
    }

    fn op(operator: &str, operands: Vec<PdfValue>) -> ContentOp {
        ContentOp {
            operator: operator.to_string(),
            operands,
        }
    }

    fn num(n: i64) -> PdfValue {
        PdfValue::Integer(n)
    }

    fn text_op(x: i64, y: i64, s: &str) -> Vec<ContentOp> {
        vec![
            op("BT", vec![]),
            op("Tf", vec![PdfValue::Name(b"F1".to_vec()), num(10)]),
            op("Td", vec![num(x), num(y)]),
            op("Tj", vec![PdfValue::Str(s.as_bytes().to_vec())]),
            op("ET", vec![]),
        ]
    }

    fn fixed_width_font() -> BackendFontInfo {
        BackendFontInfo {
            name: b"F1".to_vec(),
            base_font: "Fixed".to_string(),
            code_len: 1,
            first_char: 32,
            widths: vec![600.0; 95],
            core: None,
        }
    }

    #[test]
    fn test_glyph_positions_follow_widths() {
        let backend = MockBackend {
            ops: text_op(100, 700, "AB"),
            fonts: vec![fixed_width_font()],
        };
        let analyzer = LayoutAnalyzer::new(&backend);
        let spans = analyzer.extract_page_spans(1).unwrap();

        assert_eq!(spans.len(), 1);
        let glyphs = &spans[0].glyphs;
        assert_eq!(glyphs.len(), 2);
        // 600/1000 em at 10pt = 6pt per glyph
        assert!((glyphs[0].x0 - 100.0).abs() < 1e-4);
        assert!((glyphs[0].x1 - 106.0).abs() < 1e-4);
        assert!((glyphs[1].x0 - 106.0).abs() < 1e-4);
        assert!((glyphs[1].top - 708.0).abs() < 1e-4);
        assert!((glyphs[1].bottom - 698.0).abs() < 1e-4);
    }

    #[test]
    fn test_lines_sorted_top_to_bottom() {
        let mut ops = text_op(72, 600, "second");
        ops.extend(text_op(72, 700, "first"));
        let backend = MockBackend {
            ops,
            fonts: vec![fixed_width_font()],
        };
        let layout = LayoutAnalyzer::new(&backend).page_layout(1).unwrap();

        assert_eq!(layout.lines.len(), 2);
        assert_eq!(layout.text(), "first\nsecond");
    }

    #[test]
    fn test_same_baseline_spans_merge_with_space() {
        let mut ops = text_op(200, 700, "world");
        ops.extend(text_op(72, 700, "hello"));
        let backend = MockBackend {
            ops,
            fonts: vec![fixed_width_font()],
        };
        let layout = LayoutAnalyzer::new(&backend).page_layout(1).unwrap();

        assert_eq!(layout.lines.len(), 1);
        assert_eq!(layout.lines[0].text(), "hello world");
    }

    #[test]
    fn test_cm_translates_glyphs() {
        let mut ops = vec![op("cm", vec![num(1), num(0), num(0), num(1), num(50), num(20)])];
        ops.extend(text_op(10, 10, "x"));
        let backend = MockBackend {
            ops,
            fonts: vec![fixed_width_font()],
        };
        let spans = LayoutAnalyzer::new(&backend).extract_page_spans(1).unwrap();

        assert!((spans[0].glyphs[0].x0 - 60.0).abs() < 1e-4);
        assert!((spans[0].glyphs[0].baseline - 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_tj_kerning_inserts_space() {
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![PdfValue::Name(b"F1".to_vec()), num(10)]),
            op("Td", vec![num(72), num(700)]),
            op(
                "TJ",
                vec![PdfValue::Array(vec![
                    PdfValue::Str(b"ab".to_vec()),
                    num(-400),
                    PdfValue::Str(b"cd".to_vec()),
                ])],
            ),
            op("ET", vec![]),
        ];
        let backend = MockBackend {
            ops,
            fonts: vec![fixed_width_font()],
        };
        let layout = LayoutAnalyzer::new(&backend).page_layout(1).unwrap();
        assert_eq!(layout.lines[0].text(), "ab cd");
    }

    /// Backend counting decoder lookups.
    struct CountingBackend {
        inner: MockBackend,
        decoders: std::cell::Cell<usize>,
    }

    impl PdfBackend for CountingBackend {
        fn pages(&self) -> BTreeMap<u32, PageId> {
            self.inner.pages()
        }

        fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>> {
            self.inner.page_fonts(page)
        }

        fn page_content(&self, page: PageId) -> Result<Vec<u8>> {
            self.inner.page_content(page)
        }

        fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>> {
            self.inner.decode_content(data)
        }

        fn page_decoder(&self, page: PageId) -> Box<dyn TextDecoder + '_> {
            self.decoders.set(self.decoders.get() + 1);
            self.inner.page_decoder(page)
        }
    }

    #[test]
    fn test_decoder_resolved_once_per_page() {
        let mut ops = text_op(72, 700, "many glyphs on one line");
        ops.extend(text_op(72, 680, "and more on another"));
        let backend = CountingBackend {
            inner: MockBackend {
                ops,
                fonts: vec![fixed_width_font()],
            },
            decoders: std::cell::Cell::new(0),
        };
        let layout = LayoutAnalyzer::new(&backend).page_layout(1).unwrap();

        assert_eq!(layout.lines.len(), 2);
        assert_eq!(backend.decoders.get(), 1);
    }

    #[test]
    fn test_unknown_page() {
        let backend = MockBackend {
            ops: vec![],
            fonts: vec![],
        };
        let result = LayoutAnalyzer::new(&backend).page_layout(2);
        assert!(matches!(result, Err(Error::PageOutOfRange(2, 1))));
    }

    #[test]
    fn test_matrix_multiply_identity() {
        let m = [2.0, 0.0, 0.0, 3.0, 5.0, 7.0];
        assert_eq!(multiply(&IDENTITY, &m), m);
        assert_eq!(multiply(&m, &IDENTITY), m);
    }
}
