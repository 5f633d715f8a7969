//! Pretrained word vectors.
//!
//! Vectors are read from the common text format: one `word v1 v2 ... vN`
//! entry per line, optionally preceded by a word2vec `count dim` header.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use rayon::prelude::*;

use super::norm;
use crate::error::{Error, Result};

/// An immutable word to vector table.
#[derive(Debug, Clone, Default)]
pub struct WordVectors {
    words: Vec<String>,
    index: HashMap<String, usize>,
    /// Row-major, `words.len() * dim` components
    data: Vec<f32>,
    norms: Vec<f32>,
    dim: usize,
}

impl WordVectors {
    /// Load vectors from a text file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let vectors = Self::from_reader(BufReader::new(file))?;
        log::info!(
            "Loaded {} vectors of dimension {} from {}",
            vectors.len(),
            vectors.dim(),
            path.display()
        );
        Ok(vectors)
    }

    /// Parse vectors from a reader.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut builder = Builder::default();
        let mut declared: Option<(usize, usize)> = None;
        let mut first = true;

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = i + 1;
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.is_empty() {
                continue;
            }

            if std::mem::take(&mut first) {
                if let Some(header) = parse_header(&fields) {
                    builder.dim = Some(header.1);
                    declared = Some(header);
                    continue;
                }
            }

            let components = fields[1..]
                .iter()
                .map(|f| f.parse::<f32>())
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| Error::VectorFormat {
                    line: line_no,
                    reason: format!("bad component for '{}': {}", fields[0], e),
                })?;
            builder.push(fields[0], components, line_no)?;
        }

        if let Some((count, _)) = declared {
            if count != builder.words.len() {
                log::warn!(
                    "Vectors header declares {} entries, found {}",
                    count,
                    builder.words.len()
                );
            }
        }

        Ok(builder.finish())
    }

    /// Build a table from in-memory entries.
    pub fn from_entries<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<f32>)>,
        S: AsRef<str>,
    {
        let mut builder = Builder::default();
        for (i, (word, vector)) in entries.into_iter().enumerate() {
            builder.push(word.as_ref(), vector, i + 1)?;
        }
        Ok(builder.finish())
    }

    /// Vector for `word`, by exact key.
    pub fn get(&self, word: &str) -> Option<&[f32]> {
        self.index.get(word).map(|&row| self.row(row))
    }

    /// Whether `word` has a vector.
    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    /// Vector dimension.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the table has no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Words in table order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    /// Mean of the token vectors; unknown tokens count as zero vectors.
    ///
    /// An empty token list gives the zero vector.
    pub fn doc_vector<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<f32> {
        let mut sum = vec![0f32; self.dim];
        if tokens.is_empty() {
            return sum;
        }

        let mut missing = 0usize;
        for token in tokens {
            match self.get(token.as_ref()) {
                Some(v) => sum.iter_mut().zip(v).for_each(|(s, x)| *s += x),
                None => missing += 1,
            }
        }
        if missing > 0 {
            log::debug!("{} of {} tokens out of vocabulary", missing, tokens.len());
        }

        let n = tokens.len() as f32;
        sum.iter_mut().for_each(|s| *s /= n);
        sum
    }

    /// The `k` words closest to `word` by cosine similarity, closest first.
    ///
    /// The query word itself is part of the result. Equal scores keep table
    /// order.
    pub fn most_similar(&self, word: &str, k: usize) -> Result<Vec<(String, f32)>> {
        let query_row = *self
            .index
            .get(word)
            .ok_or_else(|| Error::VocabularyLookup(word.to_string()))?;
        let query = self.row(query_row);
        let query_norm = self.norms[query_row];

        let mut scored: Vec<(usize, f32)> = (0..self.words.len())
            .into_par_iter()
            .map(|row| {
                let denom = query_norm * self.norms[row];
                let score = if denom == 0.0 {
                    0.0
                } else {
                    dot(query, self.row(row)) / denom
                };
                (row, score)
            })
            .collect();

        // Stable sort keeps table order among equal scores; NaN ranks last
        let rank = |score: f32| if score.is_nan() { f32::NEG_INFINITY } else { score };
        scored.sort_by(|a, b| rank(b.1).total_cmp(&rank(a.1)));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(row, score)| (self.words[row].clone(), score))
            .collect())
    }

    fn row(&self, row: usize) -> &[f32] {
        &self.data[row * self.dim..(row + 1) * self.dim]
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// `count dim` header, if the fields look like one.
fn parse_header(fields: &[&str]) -> Option<(usize, usize)> {
    match fields {
        [count, dim] => Some((count.parse().ok()?, dim.parse().ok()?)),
        _ => None,
    }
}

#[derive(Default)]
struct Builder {
    words: Vec<String>,
    index: HashMap<String, usize>,
    data: Vec<f32>,
    norms: Vec<f32>,
    dim: Option<usize>,
}

impl Builder {
    fn push(&mut self, word: &str, vector: Vec<f32>, line: usize) -> Result<()> {
        if vector.is_empty() {
            return Err(Error::VectorFormat {
                line,
                reason: format!("no components for '{}'", word),
            });
        }
        let dim = *self.dim.get_or_insert(vector.len());
        if vector.len() != dim {
            return Err(Error::VectorFormat {
                line,
                reason: format!("expected {} components, found {}", dim, vector.len()),
            });
        }
        if self.index.contains_key(word) {
            log::debug!("Duplicate vector for '{}' at line {} ignored", word, line);
            return Ok(());
        }

        self.index.insert(word.to_string(), self.words.len());
        self.words.push(word.to_string());
        self.norms.push(norm(&vector));
        self.data.extend(vector);
        Ok(())
    }

    fn finish(self) -> WordVectors {
        WordVectors {
            words: self.words,
            index: self.index,
            data: self.data,
            norms: self.norms,
            dim: self.dim.unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample() -> WordVectors {
        let text = "\
dog 1.0 0.0 0.0
puppy 0.9 0.1 0.0
cat 0.7 0.7 0.0
car 0.0 0.0 1.0
";
        WordVectors::from_reader(Cursor::new(text)).unwrap()
    }

    #[test]
    fn test_parse_plain() {
        let vectors = sample();
        assert_eq!(vectors.len(), 4);
        assert_eq!(vectors.dim(), 3);
        assert!(vectors.contains("cat"));
        assert!(!vectors.contains("Cat"));
        assert_eq!(vectors.get("car").unwrap(), &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_parse_with_header() {
        let vectors = WordVectors::from_reader(Cursor::new("2 2\nred 1 0\nblue 0 1\n")).unwrap();
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors.dim(), 2);
        assert_eq!(vectors.words().collect::<Vec<_>>(), vec!["red", "blue"]);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let result = WordVectors::from_reader(Cursor::new("a 1 2 3\nb 1 2\n"));
        assert!(matches!(result, Err(Error::VectorFormat { line: 2, .. })));
    }

    #[test]
    fn test_bad_component_rejected() {
        let result = WordVectors::from_reader(Cursor::new("a 1 x\n"));
        assert!(matches!(result, Err(Error::VectorFormat { line: 1, .. })));
    }

    #[test]
    fn test_header_dim_enforced() {
        let result = WordVectors::from_reader(Cursor::new("1 3\na 1 2\n"));
        assert!(matches!(result, Err(Error::VectorFormat { line: 2, .. })));
    }

    #[test]
    fn test_duplicates_keep_first() {
        let vectors =
            WordVectors::from_entries(vec![("a", vec![1.0]), ("a", vec![2.0])]).unwrap();
        assert_eq!(vectors.len(), 1);
        assert_eq!(vectors.get("a").unwrap(), &[1.0]);
    }

    #[test]
    fn test_doc_vector_counts_oov_as_zero() {
        let vectors = sample();
        let v = vectors.doc_vector(&["dog", "unknown"]);
        assert_eq!(v, vec![0.5, 0.0, 0.0]);
        assert_eq!(vectors.doc_vector::<&str>(&[]), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_most_similar_order() {
        let vectors = sample();
        let result = vectors.most_similar("dog", 3).unwrap();
        let words: Vec<&str> = result.iter().map(|(w, _)| w.as_str()).collect();
        assert_eq!(words, vec!["dog", "puppy", "cat"]);
        assert!(result.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn test_most_similar_caps_at_vocabulary() {
        let vectors = sample();
        assert_eq!(vectors.most_similar("car", 50).unwrap().len(), 4);
    }

    #[test]
    fn test_most_similar_unknown_word() {
        let result = sample().most_similar("zebra", 5);
        assert!(matches!(result, Err(Error::VocabularyLookup(w)) if w == "zebra"));
    }

    #[test]
    fn test_ties_keep_table_order() {
        let vectors = WordVectors::from_entries(vec![
            ("q", vec![1.0, 0.0]),
            ("b", vec![0.0, 1.0]),
            ("a", vec![0.0, 2.0]),
        ])
        .unwrap();
        let words: Vec<String> = vectors
            .most_similar("q", 3)
            .unwrap()
            .into_iter()
            .map(|(w, _)| w)
            .collect();
        assert_eq!(words, vec!["q", "b", "a"]);
    }

    #[test]
    fn test_nan_scores_rank_last() {
        let text = "a 1 0\nb NaN 0\nc 0.5 0.5\nd 0 1\n";
        let vectors = WordVectors::from_reader(std::io::Cursor::new(text)).unwrap();
        let result = vectors.most_similar("a", 4).unwrap();
        let words: Vec<&str> = result.iter().map(|(w, _)| w.as_str()).collect();
        assert_eq!(words, vec!["a", "c", "d", "b"]);
        assert!(result[3].1.is_nan());
    }
}
