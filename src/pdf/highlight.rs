//! PDF highlighting: search pages and mark every hit.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::annotate::{add_highlight, count_highlights};
use super::backend::{LopdfBackend, PageId, PdfBackend};
use super::layout::{LayoutAnalyzer, PageLayout};
use super::search::{search_lines, Quad};
use crate::detect::detect_pdf;
use crate::error::{Error, Result};

/// Suffix inserted before `.pdf` in output file names.
pub const DEFAULT_SUFFIX: &str = "_highlighted";

/// Options for highlight annotations and output naming.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightOptions {
    /// RGB colour, components in 0.0..=1.0
    pub color: [f32; 3],

    /// Constant opacity, 0.0..=1.0
    pub opacity: f32,

    /// Inserted between the file stem and `.pdf`
    pub suffix: String,
}

impl HighlightOptions {
    /// Create options with defaults (opaque yellow, `_highlighted`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the highlight colour.
    pub fn with_color(mut self, r: f32, g: f32, b: f32) -> Self {
        self.color = [r.clamp(0.0, 1.0), g.clamp(0.0, 1.0), b.clamp(0.0, 1.0)];
        self
    }

    /// Set the highlight opacity.
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Set the output file suffix.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 0.0],
            opacity: 1.0,
            suffix: DEFAULT_SUFFIX.to_string(),
        }
    }
}

/// Output path for a highlighted copy: `<dir>/<stem><suffix>.pdf`.
pub fn highlighted_path(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{}{}.pdf", stem, suffix))
}

/// An open PDF being annotated.
///
/// Owns the parsed document for the duration of one highlighting call. The
/// source file is only read; [`PdfEditor::save`] always writes elsewhere.
pub struct PdfEditor {
    backend: LopdfBackend,
    source: PathBuf,
}

impl PdfEditor {
    /// Open a PDF file for annotation.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        detect_pdf(&data)?;

        let backend = LopdfBackend::load_bytes(&data)?;
        if backend.is_encrypted() {
            return Err(Error::Encrypted);
        }

        log::debug!("Opened {} for highlighting", path.display());
        Ok(Self {
            backend,
            source: path.to_path_buf(),
        })
    }

    /// Path the document was opened from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Number of pages.
    pub fn page_count(&self) -> u32 {
        self.backend.pages().len() as u32
    }

    /// Glyph layout of every page.
    pub fn layouts(&self) -> Result<Vec<PageLayout>> {
        LayoutAnalyzer::new(&self.backend).document_layout()
    }

    /// Quads of every hit of `pattern`, grouped per page.
    pub fn search(&self, pattern: &str) -> Result<Vec<(PageId, Vec<Quad>)>> {
        self.search_all(&[pattern])
    }

    /// Quads of every hit of every pattern, grouped per page.
    ///
    /// Each page is laid out once and then searched for all patterns.
    pub fn search_all<S: AsRef<str>>(
        &self,
        patterns: &[S],
    ) -> Result<Vec<(PageId, Vec<Quad>)>> {
        let mut hits = Vec::new();
        for layout in self.layouts()? {
            let quads: Vec<Quad> = patterns
                .iter()
                .flat_map(|p| search_lines(&layout.lines, p.as_ref()))
                .collect();
            log::debug!("Page {}: {} hits", layout.page_number, quads.len());
            hits.push((layout.page_id, quads));
        }
        Ok(hits)
    }

    /// Add one highlight annotation per quad.
    pub fn highlight(
        &mut self,
        page_id: PageId,
        quads: &[Quad],
        options: &HighlightOptions,
    ) -> Result<usize> {
        for quad in quads {
            add_highlight(self.backend.raw_doc_mut(), page_id, quad, options)?;
        }
        Ok(quads.len())
    }

    /// Highlight every hit of every pattern on all pages.
    pub fn highlight_all<S: AsRef<str>>(
        &mut self,
        patterns: &[S],
        options: &HighlightOptions,
    ) -> Result<usize> {
        let mut added = 0;
        for (page_id, quads) in self.search_all(patterns)? {
            added += self.highlight(page_id, &quads, options)?;
        }
        Ok(added)
    }

    /// Total `/Highlight` annotations across all pages.
    pub fn highlight_count(&self) -> usize {
        self.backend
            .pages()
            .values()
            .map(|&id| count_highlights(self.backend.raw_doc(), id))
            .sum()
    }

    /// Write the document to `path`, replacing any existing file.
    pub fn save<P: AsRef<Path>>(mut self, path: P) -> Result<PathBuf> {
        let path = path.as_ref();
        if path == self.source.as_path() {
            return Err(Error::Other(format!(
                "refusing to overwrite source file {}",
                path.display()
            )));
        }

        let mut writer = BufWriter::new(File::create(path)?);
        self.backend
            .raw_doc_mut()
            .save_to(&mut writer)
            .map_err(|e| Error::Io(io::Error::other(e.to_string())))?;
        writer.flush()?;

        log::info!("Wrote {}", path.display());
        Ok(path.to_path_buf())
    }
}

/// Highlight every occurrence of `pattern` in a PDF.
///
/// Writes `<stem><suffix>.pdf` next to the source and returns its path. The
/// output is written even when nothing matched.
pub fn highlight_pattern<P: AsRef<Path>>(
    pdf_path: P,
    pattern: &str,
    options: &HighlightOptions,
) -> Result<PathBuf> {
    let (output, _) = highlight_words(pdf_path, &[pattern], options)?;
    Ok(output)
}

/// Highlight every occurrence of every word in a PDF.
///
/// Returns the output path and the number of annotations added.
pub fn highlight_words<P: AsRef<Path>, S: AsRef<str>>(
    pdf_path: P,
    words: &[S],
    options: &HighlightOptions,
) -> Result<(PathBuf, usize)> {
    let pdf_path = pdf_path.as_ref();
    let output = highlighted_path(pdf_path, &options.suffix);

    let mut editor = PdfEditor::open(pdf_path)?;
    let added = editor.highlight_all(words, options)?;
    log::debug!(
        "{}: {} highlights over {} pages",
        pdf_path.display(),
        added,
        editor.page_count()
    );

    let output = editor.save(&output)?;
    Ok((output, added))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlighted_path() {
        assert_eq!(
            highlighted_path(Path::new("/tmp/docs/report.pdf"), DEFAULT_SUFFIX),
            PathBuf::from("/tmp/docs/report_highlighted.pdf")
        );
        assert_eq!(
            highlighted_path(Path::new("scan.PDF"), "_hl"),
            PathBuf::from("scan_hl.pdf")
        );
        assert_eq!(
            highlighted_path(Path::new("notes"), DEFAULT_SUFFIX),
            PathBuf::from("notes_highlighted.pdf")
        );
    }

    #[test]
    fn test_options_builder() {
        let options = HighlightOptions::new()
            .with_color(0.0, 2.0, -1.0)
            .with_opacity(0.4)
            .with_suffix("_marked");

        assert_eq!(options.color, [0.0, 1.0, 0.0]);
        assert_eq!(options.opacity, 0.4);
        assert_eq!(options.suffix, "_marked");
    }

    #[test]
    fn test_default_options() {
        let options = HighlightOptions::default();
        assert_eq!(options.color, [1.0, 1.0, 0.0]);
        assert_eq!(options.opacity, 1.0);
        assert_eq!(options.suffix, "_highlighted");
    }

    #[test]
    fn test_open_missing_file() {
        let result = PdfEditor::open("/nonexistent/file.pdf");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
