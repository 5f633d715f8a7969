//! Integration tests for document loading.

mod common;

use std::fs::File;
use std::io::Cursor;

use docsim::{
    process_document, read_document, sniff_doc_type_from_path, DocType, DocumentSource, Error,
    LoaderRegistry, NormalizeOptions,
};
use tempfile::TempDir;

#[test]
fn test_read_pdf_text() {
    let dir = TempDir::new().unwrap();
    let pdf = common::write_pdf_pages(
        dir.path(),
        "doc.pdf",
        &[&["Invoice number 42", "Invoice total"], &["Second page"]],
    );

    let registry = LoaderRegistry::with_defaults();
    let text = read_document(&registry, DocType::Pdf, DocumentSource::path(&pdf)).unwrap();

    assert_eq!(text, "Invoice number 42\nInvoice total\n\nSecond page");
}

#[test]
fn test_read_from_open_handle() {
    let dir = TempDir::new().unwrap();
    let pdf = common::write_pdf(dir.path(), "doc.pdf", &["Hello world"]);

    let registry = LoaderRegistry::with_defaults();
    let source = DocumentSource::handle(&pdf, File::open(&pdf).unwrap());
    assert_eq!(source.name(), pdf.as_path());
    let text = registry.read(DocType::Pdf, source).unwrap();
    assert_eq!(text, "Hello world");
}

#[test]
fn test_unsupported_type() {
    assert!(matches!(
        "docx".parse::<DocType>(),
        Err(Error::UnsupportedDocType(t)) if t == "docx"
    ));
}

#[test]
fn test_missing_file() {
    let registry = LoaderRegistry::with_defaults();
    let result = registry.read(DocType::Pdf, DocumentSource::path("/nonexistent/doc.pdf"));
    match result {
        Err(Error::DocumentLoad { name, reason }) => {
            assert_eq!(name, "/nonexistent/doc.pdf");
            assert!(!reason.is_empty());
        }
        other => panic!("expected DocumentLoad, got {:?}", other),
    }
}

#[test]
fn test_invalid_utf8_text() {
    let registry = LoaderRegistry::with_defaults();
    let source = DocumentSource::handle("bad.txt", Cursor::new(vec![0x61, 0xC3, 0x28]));
    assert!(matches!(
        registry.read(DocType::Text, source),
        Err(Error::DocumentLoad { .. })
    ));
}

#[test]
fn test_text_file_as_pdf() {
    let dir = TempDir::new().unwrap();
    let path = common::write_text(dir.path(), "notes.pdf", "not really a pdf");

    let registry = LoaderRegistry::with_defaults();
    let result = registry.read(DocType::Pdf, DocumentSource::path(&path));
    assert!(matches!(result, Err(Error::DocumentLoad { .. })));
}

#[test]
fn test_process_document() {
    let dir = TempDir::new().unwrap();
    let a = common::write_text(dir.path(), "a.txt", "The Invoice is PAID.");
    let b = common::write_text(dir.path(), "b.txt", "An invoice, overdue!");

    let registry = LoaderRegistry::with_defaults();
    let (first, second) = process_document(
        &registry,
        DocType::Text,
        DocumentSource::path(&a),
        DocumentSource::path(&b),
        &NormalizeOptions::standard(),
    )
    .unwrap();

    assert_eq!(first, "invoice paid");
    assert_eq!(second, "invoice overdue");
}

#[test]
fn test_sniff_doc_type() {
    let dir = TempDir::new().unwrap();
    let pdf = common::write_pdf(dir.path(), "doc.pdf", &["x"]);
    let txt = common::write_text(dir.path(), "doc.txt", "x");

    assert_eq!(sniff_doc_type_from_path(&pdf).unwrap(), DocType::Pdf);
    assert_eq!(sniff_doc_type_from_path(&txt).unwrap(), DocType::Text);
}
