//! Literal text search over laid-out pages.

use super::layout::{Glyph, TextLine};

/// A point in page user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Axis-aligned rectangle in page user space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    /// Width of the rectangle.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the rectangle.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }
}

/// Quadrilateral marking one line fragment of a match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    /// Upper left
    pub ul: Point,
    /// Upper right
    pub ur: Point,
    /// Lower left
    pub ll: Point,
    /// Lower right
    pub lr: Point,
}

impl Quad {
    /// Quad covering a rectangle.
    pub fn from_rect(rect: Rect) -> Self {
        Self {
            ul: Point { x: rect.x0, y: rect.y1 },
            ur: Point { x: rect.x1, y: rect.y1 },
            ll: Point { x: rect.x0, y: rect.y0 },
            lr: Point { x: rect.x1, y: rect.y0 },
        }
    }

    /// Bounding rectangle.
    pub fn rect(&self) -> Rect {
        let xs = [self.ul.x, self.ur.x, self.ll.x, self.lr.x];
        let ys = [self.ul.y, self.ur.y, self.ll.y, self.lr.y];
        Rect {
            x0: xs.iter().copied().fold(f32::INFINITY, f32::min),
            y0: ys.iter().copied().fold(f32::INFINITY, f32::min),
            x1: xs.iter().copied().fold(f32::NEG_INFINITY, f32::max),
            y1: ys.iter().copied().fold(f32::NEG_INFINITY, f32::max),
        }
    }

    /// `/QuadPoints` order: UL, UR, LL, LR.
    pub fn points(&self) -> [f32; 8] {
        [
            self.ul.x, self.ul.y, self.ur.x, self.ur.y, self.ll.x, self.ll.y, self.lr.x,
            self.lr.y,
        ]
    }

    fn covering(glyphs: &[&Glyph]) -> Option<Self> {
        let visible: Vec<&&Glyph> = glyphs.iter().filter(|g| !g.is_space()).collect();
        if visible.is_empty() {
            return None;
        }
        let rect = Rect {
            x0: visible.iter().map(|g| g.x0).fold(f32::INFINITY, f32::min),
            y0: visible.iter().map(|g| g.bottom).fold(f32::INFINITY, f32::min),
            x1: visible.iter().map(|g| g.x1).fold(f32::NEG_INFINITY, f32::max),
            y1: visible.iter().map(|g| g.top).fold(f32::NEG_INFINITY, f32::max),
        };
        Some(Self::from_rect(rect))
    }
}

/// Lowercase fold of a single character.
fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Search key: folded pattern with whitespace runs collapsed.
fn fold_pattern(pattern: &str) -> Vec<char> {
    pattern
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .map(fold)
        .collect()
}

/// Whether `prev` ends with a word broken by a hyphen that `next` finishes:
/// a letter and `-` at the end of one line, a lowercase letter opening the
/// next.
fn hyphenated_break(prev: &TextLine, next: &TextLine) -> bool {
    let mut tail = prev.glyphs.iter().rev().filter(|g| !g.is_space());
    let ends_with_hyphen = tail.next().is_some_and(|g| g.ch == '-')
        && tail.next().is_some_and(|g| g.ch.is_alphabetic());
    ends_with_hyphen
        && next
            .glyphs
            .iter()
            .find(|g| !g.is_space())
            .is_some_and(|g| g.ch.is_lowercase())
}

/// Find every occurrence of `pattern` in the page's lines.
///
/// Matching is case-insensitive and literal (no word boundaries, no regex).
/// Whitespace runs in both the pattern and the page compare as a single
/// space, and consecutive lines are joined by a space, so a hit can continue
/// onto the next line. A word hyphenated at a line end is joined without the
/// hyphen. Each hit yields one quad per line it touches; hits do not overlap.
pub fn search_lines(lines: &[TextLine], pattern: &str) -> Vec<Quad> {
    let needle = fold_pattern(pattern);
    if needle.is_empty() {
        return Vec::new();
    }

    // Folded page text with a back-reference to (line, glyph) per char
    let mut hay: Vec<char> = Vec::new();
    let mut refs: Vec<Option<(usize, usize)>> = Vec::new();
    for (li, line) in lines.iter().enumerate() {
        let joined = li > 0 && hyphenated_break(&lines[li - 1], line);
        if joined {
            // Drop the trailing hyphen (and any space after it)
            while hay.last() == Some(&' ') {
                hay.pop();
                refs.pop();
            }
            hay.pop();
            refs.pop();
        } else if !hay.is_empty() && hay.last() != Some(&' ') {
            hay.push(' ');
            refs.push(None);
        }
        let mut leading = joined;
        for (gi, glyph) in line.glyphs.iter().enumerate() {
            if glyph.is_space() {
                if leading || hay.last() == Some(&' ') || hay.is_empty() {
                    continue;
                }
                hay.push(' ');
            } else {
                leading = false;
                hay.push(fold(glyph.ch));
            }
            refs.push(Some((li, gi)));
        }
    }

    let mut quads = Vec::new();
    let mut i = 0;
    while i + needle.len() <= hay.len() {
        if hay[i..i + needle.len()] != needle[..] {
            i += 1;
            continue;
        }

        // Split the hit into per-line fragments
        let mut fragments: Vec<(usize, Vec<&Glyph>)> = Vec::new();
        for (li, gi) in refs[i..i + needle.len()].iter().flatten() {
            let glyph = &lines[*li].glyphs[*gi];
            let same_line = fragments.last().is_some_and(|(line, _)| line == li);
            match fragments.last_mut() {
                Some((_, glyphs)) if same_line => glyphs.push(glyph),
                _ => fragments.push((*li, vec![glyph])),
            }
        }
        quads.extend(fragments.iter().filter_map(|(_, g)| Quad::covering(g)));

        i += needle.len();
    }

    quads
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str, x: f32, baseline: f32) -> TextLine {
        let glyphs = text
            .chars()
            .enumerate()
            .map(|(i, ch)| Glyph {
                ch,
                x0: x + i as f32 * 5.0,
                x1: x + (i + 1) as f32 * 5.0,
                baseline,
                bottom: baseline - 2.0,
                top: baseline + 8.0,
                size: 10.0,
            })
            .collect();
        TextLine {
            glyphs,
            baseline,
            font_size: 10.0,
        }
    }

    #[test]
    fn test_case_insensitive_hits() {
        let lines = vec![line("Invoice for INVOICE items", 0.0, 700.0)];
        let quads = search_lines(&lines, "invoice");
        assert_eq!(quads.len(), 2);

        let first = quads[0].rect();
        assert_eq!(first.x0, 0.0);
        assert_eq!(first.x1, 35.0);
        assert_eq!(first.y0, 698.0);
        assert_eq!(first.y1, 708.0);
    }

    #[test]
    fn test_substring_hits() {
        let lines = vec![line("category cat", 0.0, 700.0)];
        assert_eq!(search_lines(&lines, "cat").len(), 2);
    }

    #[test]
    fn test_hit_across_lines_gives_two_quads() {
        let lines = vec![line("total due", 0.0, 700.0), line("amount here", 0.0, 680.0)];
        let quads = search_lines(&lines, "due amount");
        assert_eq!(quads.len(), 2);
        assert_eq!(quads[0].rect().y0, 698.0);
        assert_eq!(quads[1].rect().y0, 678.0);
    }

    #[test]
    fn test_hyphenated_word_across_lines() {
        let lines = vec![line("The infor-", 0.0, 700.0), line("mation desk", 0.0, 680.0)];
        let quads = search_lines(&lines, "information");
        assert_eq!(quads.len(), 2);

        // "infor" on the first line, without the hyphen
        let first = quads[0].rect();
        assert_eq!(first.x0, 20.0);
        assert_eq!(first.x1, 45.0);
        assert_eq!(first.y0, 698.0);

        // "mation" on the second
        let second = quads[1].rect();
        assert_eq!(second.x0, 0.0);
        assert_eq!(second.x1, 30.0);
        assert_eq!(second.y0, 678.0);

        // Words after the join still match
        assert_eq!(search_lines(&lines, "information desk").len(), 2);
    }

    #[test]
    fn test_hyphen_kept_before_capital_or_digit() {
        let lines = vec![line("North-", 0.0, 700.0), line("East 2024-", 0.0, 680.0)];
        assert_eq!(search_lines(&lines, "north- east").len(), 2);
        assert!(search_lines(&lines, "northeast").is_empty());

        let lines = vec![line("pre-", 0.0, 700.0), line("2024", 0.0, 680.0)];
        assert!(search_lines(&lines, "pre2024").is_empty());
    }

    #[test]
    fn test_whitespace_runs_collapse() {
        let lines = vec![line("net   amount", 0.0, 700.0)];
        assert_eq!(search_lines(&lines, "net amount").len(), 1);
        assert_eq!(search_lines(&lines, "  net\tamount ").len(), 1);
    }

    #[test]
    fn test_non_overlapping() {
        let lines = vec![line("aaaa", 0.0, 700.0)];
        assert_eq!(search_lines(&lines, "aa").len(), 2);
    }

    #[test]
    fn test_empty_pattern_and_no_hit() {
        let lines = vec![line("something", 0.0, 700.0)];
        assert!(search_lines(&lines, "").is_empty());
        assert!(search_lines(&lines, "   ").is_empty());
        assert!(search_lines(&lines, "nothing").is_empty());
        assert!(search_lines(&[], "x").is_empty());
    }

    #[test]
    fn test_quad_points_order() {
        let quad = Quad::from_rect(Rect {
            x0: 1.0,
            y0: 2.0,
            x1: 3.0,
            y1: 4.0,
        });
        assert_eq!(quad.points(), [1.0, 4.0, 3.0, 4.0, 1.0, 2.0, 3.0, 2.0]);
        assert_eq!(quad.rect().width(), 2.0);
        assert_eq!(quad.rect().height(), 2.0);
    }
}
