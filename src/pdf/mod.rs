//! PDF text layout, search and highlight annotation.

mod annotate;
pub mod backend;
mod highlight;
mod layout;
mod metrics;
mod search;

pub use annotate::{add_highlight, count_highlights};
pub use backend::{LopdfBackend, PageId, PdfBackend, TextDecoder};
pub use highlight::{
    highlight_pattern, highlight_words, highlighted_path, HighlightOptions, PdfEditor,
    DEFAULT_SUFFIX,
};
pub use layout::{Glyph, LayoutAnalyzer, PageLayout, TextLine, TextSpan};
pub use search::{search_lines, Point, Quad, Rect};
