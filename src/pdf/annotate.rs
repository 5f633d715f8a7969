//! Highlight annotation writing.

use lopdf::{dictionary, Document as LopdfDocument, Object, ObjectId, Stream};

use super::backend::PageId;
use super::highlight::HighlightOptions;
use super::search::Quad;
use crate::error::{Error, Result};

/// Current time as a PDF date string.
fn pdf_date() -> String {
    chrono::Utc::now().format("D:%Y%m%d%H%M%SZ").to_string()
}

fn real(v: f32) -> Object {
    Object::Real(v)
}

/// Appearance stream painting the quad with the highlight colour.
fn appearance_stream(quad: &Quad, options: &HighlightOptions) -> Stream {
    let rect = quad.rect();
    let [r, g, b] = options.color;
    let content = format!(
        "/GS0 gs {r:.3} {g:.3} {b:.3} rg {ulx:.3} {uly:.3} m {urx:.3} {ury:.3} l {lrx:.3} {lry:.3} l {llx:.3} {lly:.3} l h f",
        ulx = quad.ul.x,
        uly = quad.ul.y,
        urx = quad.ur.x,
        ury = quad.ur.y,
        lrx = quad.lr.x,
        lry = quad.lr.y,
        llx = quad.ll.x,
        lly = quad.ll.y,
    );

    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Form",
        "BBox" => vec![real(rect.x0), real(rect.y0), real(rect.x1), real(rect.y1)],
        "Resources" => dictionary! {
            "ExtGState" => dictionary! {
                "GS0" => dictionary! {
                    "Type" => "ExtGState",
                    "BM" => "Multiply",
                    "CA" => real(options.opacity),
                    "ca" => real(options.opacity),
                },
            },
        },
    };
    Stream::new(dict, content.into_bytes())
}

/// Add a `/Highlight` annotation covering `quad` to a page.
///
/// The annotation carries an appearance stream so viewers that do not
/// synthesize one still show the highlight.
pub fn add_highlight(
    doc: &mut LopdfDocument,
    page_id: PageId,
    quad: &Quad,
    options: &HighlightOptions,
) -> Result<ObjectId> {
    let rect = quad.rect();
    let [r, g, b] = options.color;
    let now = pdf_date();

    let ap_id = doc.add_object(appearance_stream(quad, options));
    let annot = dictionary! {
        "Type" => "Annot",
        "Subtype" => "Highlight",
        "Rect" => vec![real(rect.x0), real(rect.y0), real(rect.x1), real(rect.y1)],
        "QuadPoints" => quad.points().iter().copied().map(real).collect::<Vec<_>>(),
        "C" => vec![real(r), real(g), real(b)],
        "CA" => real(options.opacity),
        "F" => 4,
        "P" => page_id,
        "M" => Object::string_literal(now.clone()),
        "CreationDate" => Object::string_literal(now),
        "AP" => dictionary! { "N" => ap_id },
    };
    let annot_id = doc.add_object(annot);

    attach_to_page(doc, page_id, annot_id)?;
    Ok(annot_id)
}

/// Append an annotation reference to the page's `/Annots` array.
fn attach_to_page(doc: &mut LopdfDocument, page_id: PageId, annot_id: ObjectId) -> Result<()> {
    let page = doc
        .get_dictionary_mut(page_id)
        .map_err(|e| Error::Annotation(format!("page {:?}: {}", page_id, e)))?;

    // /Annots may be inline or an indirect array
    let indirect = match page.get_mut(b"Annots") {
        Ok(Object::Array(annots)) => {
            annots.push(Object::Reference(annot_id));
            return Ok(());
        }
        Ok(Object::Reference(r)) => *r,
        Ok(_) => {
            return Err(Error::Annotation(format!(
                "page {:?}: /Annots is not an array",
                page_id
            )))
        }
        Err(_) => {
            page.set("Annots", vec![Object::Reference(annot_id)]);
            return Ok(());
        }
    };

    match doc.get_object_mut(indirect) {
        Ok(Object::Array(annots)) => {
            annots.push(Object::Reference(annot_id));
            Ok(())
        }
        _ => Err(Error::Annotation(format!(
            "page {:?}: /Annots reference {:?} is not an array",
            page_id, indirect
        ))),
    }
}

/// Count `/Highlight` annotations on a page.
pub fn count_highlights(doc: &LopdfDocument, page_id: PageId) -> usize {
    let annots = doc
        .get_dictionary(page_id)
        .ok()
        .and_then(|page| page.get(b"Annots").ok())
        .and_then(|obj| match obj {
            Object::Reference(r) => doc.get_object(*r).ok(),
            other => Some(other),
        })
        .and_then(|obj| obj.as_array().ok());

    let Some(annots) = annots else {
        return 0;
    };

    annots
        .iter()
        .filter_map(|a| match a {
            Object::Reference(r) => doc.get_dictionary(*r).ok(),
            Object::Dictionary(d) => Some(d),
            _ => None,
        })
        .filter(|d| {
            d.get(b"Subtype")
                .ok()
                .and_then(|s| s.as_name().ok())
                .is_some_and(|s| s == b"Highlight")
        })
        .count()
}
