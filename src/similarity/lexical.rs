//! TF-IDF vectorization and lexical similarity.
//!
//! Term extraction and weighting follow the usual vectorizer defaults:
//! lowercased terms of two or more word characters, raw term counts, smooth
//! inverse document frequency `ln((1 + n) / (1 + df)) + 1` and L2-normalized
//! rows. Cosine similarity of two rows is then their dot product.

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};

fn term_regex() -> &'static Regex {
    static TERM: OnceLock<Regex> = OnceLock::new();
    TERM.get_or_init(|| Regex::new(r"\b\w\w+\b").unwrap())
}

/// Lowercased terms of `text`, in document order.
pub fn terms(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    term_regex()
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn term_counts(text: &str) -> HashMap<String, u32> {
    let mut counts = HashMap::new();
    for term in terms(text) {
        *counts.entry(term).or_insert(0) += 1;
    }
    counts
}

/// A TF-IDF model fitted over a small corpus.
#[derive(Debug, Clone)]
pub struct TfIdf {
    /// Term to column index, in sorted term order
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfIdf {
    /// Fit vocabulary and IDF weights over `documents`.
    pub fn fit<S: AsRef<str>>(documents: &[S]) -> Self {
        let n = documents.len() as f64;
        let mut df: BTreeMap<String, u32> = BTreeMap::new();
        for doc in documents {
            for term in term_counts(doc.as_ref()).into_keys() {
                *df.entry(term).or_insert(0) += 1;
            }
        }

        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(df.len());
        for (column, (term, count)) in df.into_iter().enumerate() {
            idf.push(((1.0 + n) / (1.0 + count as f64)).ln() + 1.0);
            vocabulary.insert(term, column);
        }

        Self { vocabulary, idf }
    }

    /// Number of distinct terms seen while fitting.
    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// IDF weight of a term, if it is in the vocabulary.
    pub fn idf(&self, term: &str) -> Option<f64> {
        self.vocabulary.get(term).map(|&column| self.idf[column])
    }

    /// Dense, L2-normalized TF-IDF row for `text`.
    ///
    /// Terms outside the fitted vocabulary are ignored.
    pub fn transform(&self, text: &str) -> Vec<f64> {
        let mut row = vec![0f64; self.vocabulary.len()];
        for (term, count) in term_counts(text) {
            if let Some(&column) = self.vocabulary.get(&term) {
                row[column] = count as f64 * self.idf[column];
            }
        }

        let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            row.iter_mut().for_each(|v| *v /= norm);
        }
        row
    }
}

/// Cosine similarity of the TF-IDF vectors of two texts.
///
/// The model is fitted over the two texts only. Fails with
/// [`Error::EmptyDocument`] when a text has no terms.
pub fn lexical_score(first: &str, second: &str) -> Result<f64> {
    for (position, text) in [("first", first), ("second", second)] {
        if terms(text).is_empty() {
            return Err(Error::EmptyDocument(format!("{} document has no terms", position)));
        }
    }

    let model = TfIdf::fit(&[first, second]);
    let a = model.transform(first);
    let b = model.transform(second);
    let score: f64 = a.iter().zip(&b).map(|(x, y)| x * y).sum();

    log::debug!(
        "Lexical score {:.6} over {} terms",
        score,
        model.vocabulary_len()
    );
    Ok(score.clamp(0.0, 1.0))
}
