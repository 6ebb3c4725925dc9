use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const MIME_ODT: &str = "application/vnd.oasis.opendocument.text";
pub const MIME_PDF: &str = "application/pdf";

/// One labeled data row: lower-cased column name -> cell value.
/// Within a batch every record carries the same key set (short rows are
/// padded with empty strings by the mapper).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RowRecord {
    pub data: HashMap<String, String>,
}

impl RowRecord {
    pub fn get(&self, key: &str) -> &str {
        self.data.get(key).map(String::as_str).unwrap_or("")
    }
}

/// Raw output of the extract stage: the relational row set and the
/// unlabeled spreadsheet grid.
#[derive(Debug, Clone, Default)]
pub struct SourceData {
    pub db_rows: Vec<RowRecord>,
    pub sheet_values: Vec<Vec<String>>,
}

/// The data object merged into the document template.
#[derive(Debug, Clone, Serialize)]
pub struct RenderContext {
    pub author: String,
    pub date: String,
    pub rows: Vec<RowRecord>,
}

/// Provider-assigned descriptor of an uploaded file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub id: String,
    pub name: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub receipt: UploadReceipt,
    pub db_rows: usize,
    pub report_rows: usize,
}
