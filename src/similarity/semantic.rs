//! Semantic similarity from averaged word vectors.

use std::fmt;

use serde::Serialize;

use super::{cosine, norm, WordVectors};
use crate::text::words;

/// Label carried by document-to-document scores.
pub const DOCUMENT_LABEL: &str = "Similarity score of documents: ";

/// Prefix of the category similarity message.
pub const CATEGORY_PREFIX: &str = "Similarity according to category: ";

/// A labelled similarity score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemanticScore {
    pub label: String,
    pub score: f64,
}

impl SemanticScore {
    /// A document-to-document score.
    pub fn documents(score: f64) -> Self {
        Self {
            label: DOCUMENT_LABEL.to_string(),
            score,
        }
    }
}

impl fmt::Display for SemanticScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.label, format_score(self.score))
    }
}

/// Shortest form of a score that reads back exactly, always with a
/// fractional part (`1.0`, `0.87`).
pub fn format_score(score: f64) -> String {
    format!("{:?}", score)
}

/// Message reporting a category score.
pub fn categorical_message(score: f64) -> String {
    format!("{}{}", CATEGORY_PREFIX, format_score(score))
}

/// Cosine similarity of the mean word vectors of two texts.
///
/// A text whose tokens are all unknown has a zero vector; the score is then
/// 0.0.
pub fn semantic_score(vectors: &WordVectors, first: &str, second: &str) -> f64 {
    let a = vectors.doc_vector(words(first).as_slice());
    let b = vectors.doc_vector(words(second).as_slice());

    if norm(&a) == 0.0 || norm(&b) == 0.0 {
        log::warn!("Document vector is zero (no known words), similarity set to 0.0");
        return 0.0;
    }
    cosine(&a, &b)
}
