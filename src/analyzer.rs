//! The analysis service: every document operation behind one value.
//!
//! An [`Analyzer`] borrows the word-vector table (loaded once at start-up)
//! and owns the loader registry and options. It is immutable; build it once
//! and share it by reference.
//!
//! # Example
//!
//! ```no_run
//! use docsim::{Analyzer, DocType, DocumentSource, WordVectors};
//!
//! fn main() -> docsim::Result<()> {
//!     let vectors = WordVectors::load("glove.6B.50d.txt")?;
//!     let analyzer = Analyzer::new(&vectors);
//!
//!     let score = analyzer.semantic_similarity(
//!         DocType::Pdf,
//!         DocumentSource::path("a.pdf"),
//!         DocumentSource::path("b.pdf"),
//!     )?;
//!     println!("{}", score);
//!     Ok(())
//! }
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::loader::{DocType, DocumentSource, LoaderRegistry};
use crate::matcher::{match_tokens, MatchRecord};
use crate::pdf::{highlight_pattern, highlight_words, HighlightOptions};
use crate::similarity::{
    categorical_message, lexical_score, round_to, semantic_score, SemanticScore, WordVectors,
};
use crate::text::{tokenize, NormalizeOptions, Normalizer};

/// Default number of related words returned.
pub const DEFAULT_NEIGHBORS: usize = 50;

/// Default decimal places of semantic scores.
pub const DEFAULT_PRECISION: u32 = 2;

/// Options for an [`Analyzer`].
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerOptions {
    /// Text cleanup applied to every loaded document
    pub normalize: NormalizeOptions,

    /// Number of related words to return
    pub neighbors: usize,

    /// Decimal places of semantic and category scores
    pub precision: u32,

    /// Annotation style and output naming
    pub highlight: HighlightOptions,
}

impl AnalyzerOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the normalization options.
    pub fn with_normalize(mut self, normalize: NormalizeOptions) -> Self {
        self.normalize = normalize;
        self
    }

    /// Set the number of related words.
    pub fn with_neighbors(mut self, neighbors: usize) -> Self {
        self.neighbors = neighbors;
        self
    }

    /// Set the score precision.
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    /// Set the highlight options.
    pub fn with_highlight(mut self, highlight: HighlightOptions) -> Self {
        self.highlight = highlight;
        self
    }
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            normalize: NormalizeOptions::standard(),
            neighbors: DEFAULT_NEIGHBORS,
            precision: DEFAULT_PRECISION,
            highlight: HighlightOptions::default(),
        }
    }
}

/// Document similarity, matching and highlighting service.
pub struct Analyzer<'v> {
    vectors: &'v WordVectors,
    registry: LoaderRegistry,
    normalizer: Normalizer,
    options: AnalyzerOptions,
}

impl<'v> Analyzer<'v> {
    /// Create an analyzer with default options and loaders.
    pub fn new(vectors: &'v WordVectors) -> Self {
        Self::with_options(vectors, AnalyzerOptions::default())
    }

    /// Create an analyzer with the given options.
    pub fn with_options(vectors: &'v WordVectors, options: AnalyzerOptions) -> Self {
        Self {
            vectors,
            registry: LoaderRegistry::with_defaults(),
            normalizer: Normalizer::new(options.normalize.clone()),
            options,
        }
    }

    /// Replace the loader registry.
    pub fn with_registry(mut self, registry: LoaderRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn options(&self) -> &AnalyzerOptions {
        &self.options
    }

    pub fn vectors(&self) -> &WordVectors {
        self.vectors
    }

    pub fn registry(&self) -> &LoaderRegistry {
        &self.registry
    }

    /// Load and normalize a document.
    pub fn normalized_text(
        &self,
        doc_type: DocType,
        source: DocumentSource<'_>,
    ) -> Result<String> {
        let raw = self.registry.read(doc_type, source)?;
        Ok(self.normalizer.process(&raw))
    }

    /// Load and normalize a document that must have content.
    fn load_nonempty(&self, doc_type: DocType, source: DocumentSource<'_>) -> Result<String> {
        let name = source.name().display().to_string();
        let text = self.normalized_text(doc_type, source)?;
        if text.trim().is_empty() {
            return Err(Error::EmptyDocument(name));
        }
        Ok(text)
    }

    /// TF-IDF cosine similarity of two documents, unrounded.
    pub fn lexical_similarity(
        &self,
        doc_type: DocType,
        first: DocumentSource<'_>,
        second: DocumentSource<'_>,
    ) -> Result<f64> {
        let first = self.load_nonempty(doc_type, first)?;
        let second = self.load_nonempty(doc_type, second)?;
        lexical_score(&first, &second)
    }

    /// Word-vector similarity of two documents.
    pub fn semantic_similarity(
        &self,
        doc_type: DocType,
        first: DocumentSource<'_>,
        second: DocumentSource<'_>,
    ) -> Result<SemanticScore> {
        let first = self.load_nonempty(doc_type, first)?;
        let second = self.load_nonempty(doc_type, second)?;
        let score = semantic_score(self.vectors, &first, &second);
        Ok(SemanticScore::documents(round_to(score, self.options.precision)))
    }

    /// Word-vector similarity of a document to a category term or phrase.
    pub fn categorical_similarity(
        &self,
        category: &str,
        doc_type: DocType,
        document: DocumentSource<'_>,
    ) -> Result<String> {
        let document = self.load_nonempty(doc_type, document)?;
        let category_text = self.normalizer.process(category);
        if category_text.trim().is_empty() {
            return Err(Error::EmptyDocument(format!("category '{}'", category)));
        }

        let score = semantic_score(self.vectors, &document, &category_text);
        Ok(categorical_message(round_to(score, self.options.precision)))
    }

    /// The vocabulary entries closest to `word`, closest first.
    ///
    /// Returns [`AnalyzerOptions::neighbors`] entries at most, the query word
    /// included.
    pub fn related_words(&self, word: &str) -> Result<Vec<String>> {
        let neighbors = self.vectors.most_similar(word, self.options.neighbors)?;
        Ok(neighbors.into_iter().map(|(w, _)| w).collect())
    }

    /// Tokens of the normalized document equal to `pattern`, ignoring case.
    pub fn match_pattern(
        &self,
        pattern: &str,
        doc_type: DocType,
        document: DocumentSource<'_>,
    ) -> Result<Vec<MatchRecord>> {
        let text = self.normalized_text(doc_type, document)?;
        let records = match_tokens(pattern, &text);
        log::debug!("'{}': {} matches", pattern, records.len());
        Ok(records)
    }

    /// Highlight every occurrence of `pattern` in a PDF.
    pub fn highlight_pattern<P: AsRef<Path>>(
        &self,
        pdf_path: P,
        pattern: &str,
    ) -> Result<PathBuf> {
        highlight_pattern(pdf_path, pattern, &self.options.highlight)
    }

    /// Highlight, in both PDFs, the words of the first that also occur in the
    /// second.
    ///
    /// A word of the first document counts as shared when it appears anywhere
    /// in the second document's normalized text, including inside a longer
    /// word. Both outputs are written even when nothing is shared.
    pub fn highlight_similar_words(
        &self,
        first: DocumentSource<'_>,
        second: DocumentSource<'_>,
    ) -> Result<(PathBuf, PathBuf)> {
        let first_path = first.name().to_path_buf();
        let second_path = second.name().to_path_buf();

        let first_text = self.normalized_text(DocType::Pdf, first)?;
        let second_text = self.normalized_text(DocType::Pdf, second)?;

        let shared: BTreeSet<&str> = tokenize(&first_text)
            .into_iter()
            .map(|t| t.text)
            .filter(|w| second_text.contains(w))
            .collect();
        let shared: Vec<&str> = shared.into_iter().collect();
        log::debug!("{} shared words", shared.len());

        let (first_out, first_count) =
            highlight_words(&first_path, shared.as_slice(), &self.options.highlight)?;
        let (second_out, second_count) =
            highlight_words(&second_path, shared.as_slice(), &self.options.highlight)?;
        log::info!(
            "Highlighted {} + {} occurrences of {} shared words",
            first_count,
            second_count,
            shared.len()
        );

        Ok((first_out, second_out))
    }

    /// Highlight `pattern` in a PDF, then match it against the document's
    /// tokens.
    ///
    /// The highlighted file is kept even if matching fails afterwards.
    pub fn pattern_interface<P: AsRef<Path>>(
        &self,
        pattern: &str,
        doc_type: DocType,
        pdf_path: P,
    ) -> Result<(PathBuf, Vec<MatchRecord>)> {
        let pdf_path = pdf_path.as_ref();
        let output = self.highlight_pattern(pdf_path, pattern)?;
        let records = self.match_pattern(pattern, doc_type, DocumentSource::path(pdf_path))?;
        Ok((output, records))
    }
}
