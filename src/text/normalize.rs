//! Text normalization applied before vectorization and matching.

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// English stopwords removed by the standard preset.
const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few", "for",
    "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself",
    "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just",
    "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once",
    "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "same", "she",
    "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "to", "too",
    "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours", "yourself",
    "yourselves",
];

/// Check whether a word is in the stopword list (case-insensitive).
pub fn is_stopword(word: &str) -> bool {
    let lower = word.to_lowercase();
    STOPWORDS.binary_search(&lower.as_str()).is_ok()
}

/// Options controlling [`Normalizer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Apply Unicode NFKC normalization (also expands ligatures)
    pub normalize_unicode: bool,

    /// Join words hyphenated across line breaks ("infor-\nmation")
    pub fix_hyphenation: bool,

    /// Lowercase the text
    pub lowercase: bool,

    /// Replace punctuation and symbols with spaces
    pub strip_punctuation: bool,

    /// Drop English stopwords
    pub remove_stopwords: bool,

    /// Collapse whitespace runs into single spaces and trim
    pub normalize_whitespace: bool,
}

impl NormalizeOptions {
    /// Create options with the standard preset.
    pub fn new() -> Self {
        Self::standard()
    }

    /// Every cleanup step enabled.
    pub fn standard() -> Self {
        Self {
            normalize_unicode: true,
            fix_hyphenation: true,
            lowercase: true,
            strip_punctuation: true,
            remove_stopwords: true,
            normalize_whitespace: true,
        }
    }

    /// Unicode and whitespace normalization only; case, punctuation and
    /// stopwords are preserved.
    pub fn minimal() -> Self {
        Self {
            normalize_unicode: true,
            fix_hyphenation: false,
            lowercase: false,
            strip_punctuation: false,
            remove_stopwords: false,
            normalize_whitespace: true,
        }
    }

    /// Enable or disable lowercasing.
    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    /// Enable or disable punctuation stripping.
    pub fn with_strip_punctuation(mut self, strip: bool) -> Self {
        self.strip_punctuation = strip;
        self
    }

    /// Enable or disable stopword removal.
    pub fn with_stopwords_removed(mut self, remove: bool) -> Self {
        self.remove_stopwords = remove;
        self
    }

    /// Enable or disable hyphenation repair.
    pub fn with_hyphenation_fix(mut self, fix: bool) -> Self {
        self.fix_hyphenation = fix;
        self
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self::standard()
    }
}

/// Text normalization pipeline.
pub struct Normalizer {
    options: NormalizeOptions,
    hyphenation_regex: Regex,
}

impl Normalizer {
    /// Create a new normalizer with the given options.
    pub fn new(options: NormalizeOptions) -> Self {
        Self {
            options,
            hyphenation_regex: Regex::new(r"(\p{Alphabetic})-[ \t]*\r?\n\s*(\p{Lowercase})")
                .unwrap(),
        }
    }

    /// The options this normalizer was built with.
    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Run the pipeline over `text`.
    pub fn process(&self, text: &str) -> String {
        let mut result: String = if self.options.normalize_unicode {
            text.nfkc().collect()
        } else {
            text.to_string()
        };

        if self.options.fix_hyphenation {
            result = self
                .hyphenation_regex
                .replace_all(&result, "$1$2")
                .into_owned();
        }

        if self.options.lowercase {
            result = result.to_lowercase();
        }

        if self.options.strip_punctuation {
            result = strip_punctuation(&result);
        }

        if self.options.remove_stopwords {
            // Rebuilding from words also collapses whitespace
            return result
                .split_whitespace()
                .filter(|w| !is_stopword(w))
                .collect::<Vec<_>>()
                .join(" ");
        }

        if self.options.normalize_whitespace {
            result = result.split_whitespace().collect::<Vec<_>>().join(" ");
        }

        result
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(NormalizeOptions::default())
    }
}

/// Normalize `text` with the given options.
pub fn normalize(text: &str, options: &NormalizeOptions) -> String {
    Normalizer::new(options.clone()).process(text)
}

/// Replace punctuation with spaces, keeping apostrophes and hyphens that sit
/// between two alphanumeric characters ("don't", "state-of-the-art").
fn strip_punctuation(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());

    for (i, &c) in chars.iter().enumerate() {
        if c.is_alphanumeric() || c.is_whitespace() {
            out.push(c);
            continue;
        }

        let joiner = matches!(c, '\'' | '-' | '\u{2019}');
        let inside_word = i > 0
            && chars[i - 1].is_alphanumeric()
            && chars.get(i + 1).is_some_and(|n| n.is_alphanumeric());

        if joiner && inside_word {
            out.push(if c == '\u{2019}' { '\'' } else { c });
        } else {
            out.push(' ');
        }
    }

    out
}
