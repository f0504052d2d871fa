// src/pdf_text.rs

use lopdf::{Dictionary, Document};
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::{info, warn};

/// Result of attempting to extract text from a PDF.
#[derive(Debug)]
pub enum PdfContent {
    /// The PDF contains extractable text (all pages, in order).
    Text(String),
    /// The PDF appears to be scanned / image-only, or its text could
    /// not be decoded.
    ScannedImage,
    /// Something went wrong during extraction.
    Error(String),
}

/// Main entry point: takes raw PDF bytes and returns `PdfContent`.
pub fn extract_text_from_pdf(pdf_bytes: &[u8]) -> PdfContent {
    // --- Phase 1: structural check with lopdf ---
    let doc = match Document::load_mem(pdf_bytes) {
        Ok(d) => d,
        Err(e) => return PdfContent::Error(format!("Failed to parse PDF: {e}")),
    };

    if looks_like_scanned(&doc) {
        info!("PDF structural check: likely scanned / image-only");
        return PdfContent::ScannedImage;
    }

    // --- Phase 2: full text extraction, pages concatenated ---
    // pdf-extract panics on some malformed font programs
    let extracted = catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(pdf_bytes)
    }));

    match extracted {
        Ok(Ok(text)) => {
            // short text is still scanned for markers; missing ones are just absent
            let meaningful = text.chars().filter(|c| !c.is_whitespace()).count();
            info!(
                chars = meaningful,
                pages = doc.get_pages().len(),
                "Text extracted"
            );
            PdfContent::Text(text)
        }
        Ok(Err(e)) => {
            warn!(error = %e, "pdf-extract failed — may be scanned or corrupted");
            PdfContent::ScannedImage
        }
        Err(_) => {
            warn!("pdf-extract panicked — treating document as unreadable");
            PdfContent::ScannedImage
        }
    }
}

/// Heuristic: inspect the PDF object tree for signs that every page
/// is just a single image with no text operators.
///
/// We look at each page's `Resources` dictionary. If a page has
/// XObject images but **no** Font resources, it's almost certainly
/// a scanned page.
fn looks_like_scanned(doc: &Document) -> bool {
    let pages = doc.get_pages();
    if pages.is_empty() {
        return false; // Can't tell — let text extraction try
    }

    let mut image_only_pages = 0;

    for object_id in pages.values() {
        let Ok(page_dict) = doc.get_dictionary(*object_id) else {
            continue;
        };

        let resources = page_dict
            .get(b"Resources")
            .ok()
            .and_then(|r| doc.dereference(r).ok())
            .and_then(|(_, resolved)| resolved.as_dict().ok());

        if has_entries(doc, resources, b"XObject") && !has_entries(doc, resources, b"Font") {
            image_only_pages += 1;
        }
    }

    let total = pages.len();
    let ratio = image_only_pages as f64 / total as f64;
    info!(
        total_pages = total,
        image_only = image_only_pages,
        ratio = format!("{ratio:.2}"),
        "Scanned-page analysis"
    );

    // If ≥80% of pages are image-only, treat the whole PDF as scanned
    ratio >= 0.8
}

/// Whether `resources[key]` resolves to a non-empty dictionary.
fn has_entries(doc: &Document, resources: Option<&Dictionary>, key: &[u8]) -> bool {
    resources
        .and_then(|res| res.get(key).ok())
        .and_then(|o| doc.dereference(o).ok())
        .and_then(|(_, resolved)| resolved.as_dict().ok())
        .is_some_and(|d| !d.is_empty())
}

/// In-memory PDFs for tests across the crate.
#[cfg(test)]
pub(crate) mod testing {
    use lopdf::content::{Content, Operation};
    use lopdf::{Document, Object, Stream, dictionary};

    /// One page, one Courier text line per entry, top to bottom.
    pub fn text_pdf(lines: &[&str]) -> Vec<u8> {
        multi_page_pdf(&[lines])
    }

    /// One page per entry of `pages`, each laid out like [`text_pdf`].
    pub fn multi_page_pdf(pages: &[&[&str]]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
        for lines in pages {
            let mut operations = Vec::new();
            for (i, line) in lines.iter().enumerate() {
                let y = 780 - (i as i64) * 24;
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
                operations.push(Operation::new("Td", vec![50.into(), y.into()]));
                operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
                operations.push(Operation::new("ET", vec![]));
            }
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().expect("content encodes"),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        finish(doc, pages_id)
    }

    /// One page that only paints an image XObject.
    pub fn image_only_pdf() -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 1,
                "Height" => 1,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            vec![0u8],
        ));
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new("Do", vec!["Im1".into()]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("content encodes"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im1" => image_id },
            },
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        finish(doc, pages_id)
    }

    fn finish(mut doc: Document, pages_id: lopdf::ObjectId) -> Vec<u8> {
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).expect("pdf saves");
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{image_only_pdf, multi_page_pdf, text_pdf};
    use super::*;
    use crate::fields::{default_fields, extract_bill};

    #[test]
    fn test_garbage_bytes() {
        let result = extract_text_from_pdf(b"this is not a pdf");
        assert!(matches!(result, PdfContent::Error(_)));
    }

    #[test]
    fn test_text_pdf() {
        let pdf = text_pdf(&[
            "Order ID: 402-778812-11",
            "Seller Name: Acme Retail LLP",
            "Thank you for shopping",
        ]);
        match extract_text_from_pdf(&pdf) {
            PdfContent::Text(text) => {
                assert!(text.contains("Order ID:"), "got {text:?}");
                assert!(text.contains("Acme Retail LLP"), "got {text:?}");
            }
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn test_short_bill_keeps_its_text() {
        let pdf = text_pdf(&["Order ID: 77", "SKU: AB-1", "end"]);
        let PdfContent::Text(text) = extract_text_from_pdf(&pdf) else {
            panic!("short text should still be returned");
        };
        let record = extract_bill("short.pdf", &text, &default_fields());
        assert_eq!(record.values[1].as_deref(), Some("77"));
        assert_eq!(record.values[4].as_deref(), Some("AB-1"));
    }

    #[test]
    fn test_pages_concatenated_in_order() {
        let pdf = multi_page_pdf(&[
            &["First page header", "Ship to:"],
            &["12 Market Street", "Phone : 555-0101", "Second page footer"],
        ]);
        let PdfContent::Text(text) = extract_text_from_pdf(&pdf) else {
            panic!("expected text");
        };
        let first = text.find("First page header").expect("page 1 text");
        let second = text.find("Second page footer").expect("page 2 text");
        assert!(first < second, "pages out of order: {text:?}");

        let record = extract_bill("two.pdf", &text, &default_fields());
        assert_eq!(record.values[0].as_deref(), Some("12 Market Street"));
        assert_eq!(record.values[2].as_deref(), Some("555-0101"));
    }

    #[test]
    fn test_image_only_pdf_is_scanned() {
        assert!(matches!(
            extract_text_from_pdf(&image_only_pdf()),
            PdfContent::ScannedImage
        ));
    }
}
