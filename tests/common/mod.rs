//! Shared fixtures: small PDFs and vector tables built in memory.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use docsim::WordVectors;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};

/// Write a one-page PDF with one Helvetica text line per entry.
pub fn write_pdf(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    write_pdf_pages(dir, name, &[lines])
}

/// Write a PDF with the given lines on each page.
pub fn write_pdf_pages(dir: &Path, name: &str, pages: &[&[&str]]) -> PathBuf {
    let font = dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    };
    build_pdf(dir, name, font, pages)
}

/// Write a one-page PDF in a standard font declared with neither
/// `/Widths` nor `/Encoding`.
pub fn write_pdf_in_font(dir: &Path, name: &str, base_font: &str, lines: &[&str]) -> PathBuf {
    let font = dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
    };
    build_pdf(dir, name, font, &[lines])
}

/// Text starts at (72, 700) in 12pt with 20pt leading.
fn build_pdf(dir: &Path, name: &str, font: Dictionary, pages: &[&[&str]]) -> PathBuf {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(font);
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for lines in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("TL", vec![20.into()]),
            Operation::new("Td", vec![72.into(), 700.into()]),
        ];
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                operations.push(Operation::new("T*", vec![]));
            }
            operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let path = dir.join(name);
    doc.save(&path).unwrap();
    path
}

/// Write a UTF-8 text file.
pub fn write_text(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    path
}

/// A small vector table with two clusters: billing words and animals.
pub fn sample_vectors() -> WordVectors {
    let text = "\
invoice 0.95 0.10 0.00 0.05
bill 0.90 0.20 0.05 0.00
payment 0.80 0.30 0.00 0.10
receipt 0.85 0.15 0.10 0.05
total 0.70 0.40 0.10 0.00
dog 0.05 0.00 0.95 0.20
puppy 0.10 0.05 0.90 0.25
cat 0.00 0.10 0.85 0.40
mat 0.20 0.60 0.20 0.10
";
    WordVectors::from_reader(std::io::Cursor::new(text)).unwrap()
}
