//! # docsim
//!
//! Document similarity scoring and PDF highlighting.
//!
//! This library compares documents lexically (TF-IDF) and semantically
//! (averaged pretrained word vectors), finds related words, matches tokens
//! and marks words inside PDF files with highlight annotations.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docsim::{Analyzer, DocType, DocumentSource, WordVectors};
//!
//! fn main() -> docsim::Result<()> {
//!     let vectors = WordVectors::load("vectors.txt")?;
//!     let analyzer = Analyzer::new(&vectors);
//!
//!     // TF-IDF cosine of two text files
//!     let score = analyzer.lexical_similarity(
//!         DocType::Text,
//!         DocumentSource::path("a.txt"),
//!         DocumentSource::path("b.txt"),
//!     )?;
//!     println!("{:.3}", score);
//!
//!     // Highlight a word in a PDF
//!     let output = analyzer.highlight_pattern("invoice.pdf", "total")?;
//!     println!("{}", output.display());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Lexical similarity**: TF-IDF with smooth IDF and cosine
//! - **Semantic similarity**: mean word vectors, GloVe/word2vec text files
//! - **Related words**: nearest neighbours in the vector table (parallel scan)
//! - **Pattern matching**: case-insensitive exact-token matches
//! - **PDF highlighting**: positioned text search and `/Highlight` annotations

pub mod analyzer;
pub mod detect;
pub mod error;
pub mod loader;
pub mod matcher;
pub mod pdf;
pub mod similarity;
pub mod text;

// Re-export commonly used types
pub use analyzer::{Analyzer, AnalyzerOptions, DEFAULT_NEIGHBORS, DEFAULT_PRECISION};
pub use detect::{detect_pdf, is_pdf_bytes, sniff_doc_type, sniff_doc_type_from_path, PdfFormat};
pub use error::{Error, Result};
pub use loader::{
    process_document, read_document, DocType, DocumentLoader, DocumentSource, LoaderRegistry,
};
pub use matcher::{match_tokens, records_to_json, JsonFormat, MatchRecord};
pub use pdf::{highlight_pattern, highlight_words, HighlightOptions, PdfEditor};
pub use similarity::{lexical_score, semantic_score, SemanticScore, WordVectors};
pub use text::{normalize, tokenize, NormalizeOptions};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
