//! Word tokenization.

use std::sync::OnceLock;

use regex::Regex;

/// A word token borrowed from the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// Surface text of the token
    pub text: &'a str,
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset one past the last character
    pub end: usize,
}

/// Splits text into word tokens.
///
/// A word is a run of word characters, optionally joined by inner apostrophes
/// or hyphens ("don't", "state-of-the-art"). Punctuation and whitespace never
/// form tokens.
pub struct Tokenizer {
    word_regex: Regex,
}

impl Tokenizer {
    /// Create a new tokenizer.
    pub fn new() -> Self {
        Self {
            word_regex: Regex::new(r"\w+(?:['\-]\w+)*").unwrap(),
        }
    }

    /// Tokenize `text`, in document order.
    pub fn tokenize<'a>(&self, text: &'a str) -> Vec<Token<'a>> {
        self.word_regex
            .find_iter(text)
            .map(|m| Token {
                text: m.as_str(),
                start: m.start(),
                end: m.end(),
            })
            .collect()
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

fn shared_tokenizer() -> &'static Tokenizer {
    static TOKENIZER: OnceLock<Tokenizer> = OnceLock::new();
    TOKENIZER.get_or_init(Tokenizer::new)
}

/// Tokenize `text` with the shared default tokenizer.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    shared_tokenizer().tokenize(text)
}

/// Surface forms of the tokens in `text`.
pub fn words(text: &str) -> Vec<&str> {
    tokenize(text).into_iter().map(|t| t.text).collect()
}
