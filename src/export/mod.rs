//! Document exporters. Both build a complete document model first; nothing is
//! written until every precondition has passed.

use crate::validation::ValidationError;
use std::io;
use thiserror::Error;

pub mod pdf;
pub mod spreadsheet;

pub use pdf::{PdfDocDefinition, PdfExport, build_personal_pdf, build_schedule_pdf};
pub use spreadsheet::{SpreadsheetDocument, build_spreadsheet};

/// Longest range the spreadsheet exporter accepts, in days.
pub const MAX_EXPORT_DAYS: i64 = 365;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Download name: whitespace runs become `_`.
pub fn export_file_name(name: &str, extension: &str) -> String {
    let mut out = String::with_capacity(name.len() + extension.len() + 1);
    let mut in_whitespace = false;
    for ch in name.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                out.push('_');
            }
            in_whitespace = true;
        } else {
            out.push(ch);
            in_whitespace = false;
        }
    }
    out.push('.');
    out.push_str(extension);
    out
}

#[cfg(test)]
mod tests {
    use super::export_file_name;

    #[test]
    fn file_name_collapses_whitespace() {
        assert_eq!(export_file_name("Ramazan  Hatmi 2025", "csv"), "Ramazan_Hatmi_2025.csv");
        assert_eq!(export_file_name(" Aile\tHatmi", "pdf"), "_Aile_Hatmi.pdf");
    }
}
