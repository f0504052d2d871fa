// src/report.rs

use crate::fields::{self, BillRecord, FieldSpec};
use crate::pdf_text::{PdfContent, extract_text_from_pdf};
use serde::Serialize;
use std::fmt::Write as _;
use tracing::{info, warn};

/// A document received from the upload form or read from disk.
#[derive(Debug, Clone)]
pub struct UploadedDoc {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// The extracted table: a header row plus one record per document.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Report {
    pub columns: Vec<String>,
    pub rows: Vec<BillRecord>,
}

impl Report {
    pub fn new(specs: &[FieldSpec]) -> Self {
        Self {
            columns: std::iter::once("File".to_string())
                .chain(specs.iter().map(|s| s.label.clone()))
                .collect(),
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render as an HTML `<table>`; absent values are blank cells.
    pub fn to_html(&self) -> String {
        let mut html = String::from("<table class=\"report\">\n<thead><tr>");
        for column in &self.columns {
            let _ = write!(html, "<th>{}</th>", escape_html(column));
        }
        html.push_str("</tr></thead>\n<tbody>\n");
        for row in &self.rows {
            let _ = write!(html, "<tr><td>{}</td>", escape_html(&row.source));
            for value in &row.values {
                let _ = write!(
                    html,
                    "<td>{}</td>",
                    escape_html(value.as_deref().unwrap_or(""))
                );
            }
            html.push_str("</tr>\n");
        }
        html.push_str("</tbody>\n</table>");
        html
    }
}

fn is_pdf_name(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".pdf")
}

/// Drop uploads that are not `.pdf` files, the way the upload form's
/// type filter would.
pub fn retain_pdfs(docs: &mut Vec<UploadedDoc>) {
    docs.retain(|doc| {
        let keep = is_pdf_name(&doc.name);
        if !keep {
            warn!(filename = %doc.name, "Not a .pdf file — skipping");
        }
        keep
    });
}

/// Extract every document in upload order into a single report.
pub fn process_batch(docs: &[UploadedDoc], specs: &[FieldSpec]) -> Report {
    let mut report = Report::new(specs);
    info!(documents = docs.len(), "Processing batch");

    for doc in docs {
        let span = tracing::info_span!("pdf", filename = %doc.name);
        let _guard = span.enter();

        if !is_pdf_name(&doc.name) {
            warn!("Not a .pdf file — skipping");
            continue;
        }

        let record = match extract_text_from_pdf(&doc.bytes) {
            PdfContent::Text(text) => fields::extract_bill(&doc.name, &text, specs),
            PdfContent::ScannedImage => {
                info!("PDF is scanned — no fields can be found");
                BillRecord::empty(&doc.name, specs.len())
            }
            PdfContent::Error(e) => {
                tracing::error!(error = %e, "Failed to process PDF");
                BillRecord::empty(&doc.name, specs.len())
            }
        };

        let (filled, total) = record.coverage();
        info!(filled, total, "Extraction result");
        report.rows.push(record);
    }

    report
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
