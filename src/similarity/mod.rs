//! Document similarity: sparse TF-IDF scoring and dense word vectors.

mod lexical;
mod semantic;
mod vectors;

pub use lexical::{lexical_score, terms, TfIdf};
pub use semantic::{
    categorical_message, format_score, semantic_score, SemanticScore, CATEGORY_PREFIX,
    DOCUMENT_LABEL,
};
pub use vectors::WordVectors;

/// Round `value` to `precision` decimal places.
pub fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}

/// Cosine similarity of two dense vectors.
///
/// Returns 0.0 when either vector has zero norm. Vectors of different
/// lengths are compared over their common prefix.
pub fn cosine(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0f64;
    let mut norm_a = 0f64;
    let mut norm_b = 0f64;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a.sqrt() * norm_b.sqrt())
    }
}

/// Euclidean norm of a dense vector.
pub(crate) fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}
