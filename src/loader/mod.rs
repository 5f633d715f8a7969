//! Document loading: resolve a source, extract its text.
//!
//! Loaders are registered per [`DocType`] and dispatched by the
//! [`LoaderRegistry`], which also owns the error wrapping: every failure to
//! open, read or decode a source surfaces as [`Error::DocumentLoad`] naming
//! the source.
//!
//! # Example
//!
//! ```no_run
//! use docsim::loader::{DocType, DocumentSource, LoaderRegistry};
//!
//! fn main() -> docsim::Result<()> {
//!     let registry = LoaderRegistry::with_defaults();
//!     let text = registry.read(DocType::Pdf, DocumentSource::path("invoice.pdf"))?;
//!     println!("{}", text);
//!     Ok(())
//! }
//! ```

mod pdf;
mod text;

pub use pdf::PdfLoader;
pub use text::TextLoader;

use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::text::{NormalizeOptions, Normalizer};

/// Kind of document a source holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocType {
    /// PDF file
    Pdf,
    /// UTF-8 plain text
    Text,
}

impl DocType {
    /// Canonical tag, as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::Pdf => "PDF",
            DocType::Text => "TEXT",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(DocType::Pdf),
            "text" | "txt" => Ok(DocType::Text),
            _ => Err(Error::UnsupportedDocType(s.to_string())),
        }
    }
}

/// Where a document's bytes come from.
pub enum DocumentSource<'a> {
    /// A file on disk.
    Path(PathBuf),
    /// An already opened stream, with the path it was opened from.
    Handle {
        /// Path of the underlying file; used for naming outputs and errors
        name: PathBuf,
        /// The open stream
        stream: Box<dyn Read + 'a>,
    },
}

impl<'a> DocumentSource<'a> {
    /// A source reading a file path.
    pub fn path(path: impl Into<PathBuf>) -> Self {
        DocumentSource::Path(path.into())
    }

    /// A source draining an open stream.
    pub fn handle(name: impl Into<PathBuf>, stream: impl Read + 'a) -> Self {
        DocumentSource::Handle {
            name: name.into(),
            stream: Box::new(stream),
        }
    }

    /// Path of the document (the file path, or the handle's name).
    pub fn name(&self) -> &Path {
        match self {
            DocumentSource::Path(path) => path,
            DocumentSource::Handle { name, .. } => name,
        }
    }

    /// Read the whole document.
    pub fn into_bytes(self) -> std::io::Result<Vec<u8>> {
        match self {
            DocumentSource::Path(path) => std::fs::read(path),
            DocumentSource::Handle { mut stream, .. } => {
                let mut data = Vec::new();
                stream.read_to_end(&mut data)?;
                Ok(data)
            }
        }
    }
}

impl fmt::Debug for DocumentSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentSource::Path(path) => f.debug_tuple("Path").field(path).finish(),
            DocumentSource::Handle { name, .. } => f
                .debug_struct("Handle")
                .field("name", name)
                .finish_non_exhaustive(),
        }
    }
}

impl From<PathBuf> for DocumentSource<'_> {
    fn from(path: PathBuf) -> Self {
        DocumentSource::Path(path)
    }
}

impl From<&Path> for DocumentSource<'_> {
    fn from(path: &Path) -> Self {
        DocumentSource::Path(path.to_path_buf())
    }
}

impl From<&str> for DocumentSource<'_> {
    fn from(path: &str) -> Self {
        DocumentSource::Path(PathBuf::from(path))
    }
}

/// Trait for document loaders.
///
/// Implement this trait to add support for a new document type.
pub trait DocumentLoader: Send + Sync {
    /// The document type this loader reads.
    fn doc_type(&self) -> DocType;

    /// Get the name of this loader.
    fn name(&self) -> &str;

    /// Extract the text of a document held in memory.
    fn load_bytes(&self, bytes: &[u8]) -> Result<String>;
}

/// Registry mapping document types to loaders.
pub struct LoaderRegistry {
    loaders: HashMap<DocType, Arc<dyn DocumentLoader>>,
}

impl LoaderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            loaders: HashMap::new(),
        }
    }

    /// Create a registry with the PDF and text loaders.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PdfLoader::new()));
        registry.register(Arc::new(TextLoader::new()));
        registry
    }

    /// Register a loader, replacing any loader for the same type.
    pub fn register(&mut self, loader: Arc<dyn DocumentLoader>) {
        self.loaders.insert(loader.doc_type(), loader);
    }

    /// Get the loader for a document type.
    pub fn get(&self, doc_type: DocType) -> Option<Arc<dyn DocumentLoader>> {
        self.loaders.get(&doc_type).cloned()
    }

    /// Check if a document type is supported.
    pub fn supports(&self, doc_type: DocType) -> bool {
        self.loaders.contains_key(&doc_type)
    }

    /// Read the raw text of a document.
    pub fn read(&self, doc_type: DocType, source: DocumentSource<'_>) -> Result<String> {
        let loader = self
            .get(doc_type)
            .ok_or_else(|| Error::UnsupportedDocType(doc_type.to_string()))?;

        let name = source.name().display().to_string();
        let bytes = source.into_bytes().map_err(|e| Error::load(&name, e))?;

        let text = loader.load_bytes(&bytes).map_err(|e| match e {
            Error::DocumentLoad { .. } => e,
            other => Error::load(&name, other),
        })?;

        log::debug!(
            "Loaded {} ({} bytes) with {} loader: {} chars",
            name,
            bytes.len(),
            loader.name(),
            text.chars().count()
        );
        Ok(text)
    }
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Read the raw text of a document.
pub fn read_document(
    registry: &LoaderRegistry,
    doc_type: DocType,
    source: DocumentSource<'_>,
) -> Result<String> {
    registry.read(doc_type, source)
}

/// Read and normalize two documents of the same type.
pub fn process_document(
    registry: &LoaderRegistry,
    doc_type: DocType,
    first: DocumentSource<'_>,
    second: DocumentSource<'_>,
    options: &NormalizeOptions,
) -> Result<(String, String)> {
    let normalizer = Normalizer::new(options.clone());
    let first = normalizer.process(&registry.read(doc_type, first)?);
    let second = normalizer.process(&registry.read(doc_type, second)?);
    Ok((first, second))
}
