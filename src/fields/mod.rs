// src/fields/mod.rs

mod markers;

use serde::Deserialize;
use serde::Serialize;

use markers::extract_field_multiple;

/// One column of the report and the text markers that locate its value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldSpec {
    pub label: String,
    pub markers: Vec<String>,
    #[serde(default = "default_end_marker")]
    pub end_marker: String,
}

fn default_end_marker() -> String {
    "\n".to_string()
}

impl FieldSpec {
    pub fn new(label: &str, markers: &[&str], end_marker: &str) -> Self {
        Self {
            label: label.to_string(),
            markers: markers.iter().map(|m| m.to_string()).collect(),
            end_marker: end_marker.to_string(),
        }
    }
}

/// The field set used when the config file does not list its own.
pub fn default_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new(
            "Ship to / Shipping Address:",
            &["Ship to:", "Shipping address:"],
            "Phone",
        ),
        FieldSpec::new("Order ID:", &["Order ID:"], "\n"),
        FieldSpec::new("Phone:", &["Phone :"], "\n"),
        FieldSpec::new("Seller Name:", &["Seller Name:"], "\n"),
        FieldSpec::new("SKU:", &["SKU:"], "\n"),
    ]
}

/// Everything pulled out of a single uploaded bill.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillRecord {
    /// Name of the uploaded file the values came from.
    pub source: String,
    /// One entry per configured field, in column order.
    pub values: Vec<Option<String>>,
}

impl BillRecord {
    /// A record for a document that yielded no text at all.
    pub fn empty(source: &str, field_count: usize) -> Self {
        Self {
            source: source.to_string(),
            values: vec![None; field_count],
        }
    }

    /// How many fields were found (out of the configured ones).
    pub fn coverage(&self) -> (usize, usize) {
        let filled = self.values.iter().filter(|v| v.is_some()).count();
        (filled, self.values.len())
    }
}

/// Scan raw document text for every configured field.
pub fn extract_bill(source: &str, text: &str, specs: &[FieldSpec]) -> BillRecord {
    BillRecord {
        source: source.to_string(),
        values: specs
            .iter()
            .map(|spec| extract_field_multiple(text, &spec.markers, &spec.end_marker))
            .collect(),
    }
}
