//! Text normalization and tokenization.

mod normalize;
mod tokenize;

pub use normalize::{is_stopword, normalize, NormalizeOptions, Normalizer};
pub use tokenize::{tokenize, words, Token, Tokenizer};
