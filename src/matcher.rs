//! Exact-token pattern matching.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::text::tokenize;

/// One token matching a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Token index of the match
    pub start: usize,
    /// One past the last matched token
    pub end: usize,
    /// Matched text as it appears in the document
    pub text: String,
}

/// Find every token of `text` equal to `pattern`, ignoring case.
///
/// The pattern is a single literal token: no substring or regex matching.
/// An empty pattern matches nothing.
pub fn match_tokens(pattern: &str, text: &str) -> Vec<MatchRecord> {
    let pattern = pattern.trim().to_lowercase();
    if pattern.is_empty() {
        return Vec::new();
    }

    tokenize(text)
        .into_iter()
        .enumerate()
        .filter(|(_, token)| token.text.to_lowercase() == pattern)
        .map(|(index, token)| MatchRecord {
            start: index,
            end: index + 1,
            text: token.text.to_string(),
        })
        .collect()
}

/// JSON output style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize match records as a JSON array.
pub fn records_to_json(records: &[MatchRecord], format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(records),
        JsonFormat::Compact => serde_json::to_string(records),
    };

    result.map_err(|e| Error::Other(format!("JSON serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_matches() {
        let records = match_tokens("cat", "The cat sat on the CAT mat");
        assert_eq!(
            records,
            vec![
                MatchRecord {
                    start: 1,
                    end: 2,
                    text: "cat".to_string()
                },
                MatchRecord {
                    start: 5,
                    end: 6,
                    text: "CAT".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_whole_tokens_only() {
        assert!(match_tokens("cat", "category concatenate").is_empty());
    }

    #[test]
    fn test_punctuation_is_not_a_token() {
        let records = match_tokens("cat", "cat, cat.");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].start, 1);
    }

    #[test]
    fn test_empty_pattern() {
        assert!(match_tokens("", "anything").is_empty());
        assert!(match_tokens("  ", "anything").is_empty());
    }

    #[test]
    fn test_no_match() {
        assert!(match_tokens("dog", "The cat sat").is_empty());
    }

    #[test]
    fn test_records_to_json() {
        let record = MatchRecord {
            start: 3,
            end: 4,
            text: "Invoice".to_string(),
        };
        let json = records_to_json(&[record], JsonFormat::Compact).unwrap();
        assert_eq!(json, r#"[{"start":3,"end":4,"text":"Invoice"}]"#);
    }
}
