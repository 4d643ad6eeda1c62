use serde::Serialize;
use std::path::Path;

use crate::error::Result;
use crate::utils::csv::{
    parse_csv, split_header, validate_csv_data, CsvValidationError, CsvValidationResult, ValidRow,
};

/// What the upload preview shows before a CSV campaign is submitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CsvPreview {
    pub header: Option<Vec<String>>,
    pub total_rows: usize,
    pub variable_count: usize,
    pub result: CsvValidationResult,
}

impl CsvPreview {
    /// `rows` still includes the header line.
    pub fn from_rows(rows: Vec<Vec<String>>, variable_count: usize) -> Self {
        let (header, data) = split_header(rows);
        let result = validate_csv_data(&data, variable_count);
        Self {
            header,
            total_rows: data.len(),
            variable_count,
            result,
        }
    }

    pub async fn from_file(path: impl AsRef<Path>, variable_count: usize) -> Result<Self> {
        let rows = parse_csv(path).await?;
        let preview = Self::from_rows(rows, variable_count);
        tracing::info!(
            total = preview.total_rows,
            valid = preview.valid_count(),
            invalid = preview.invalid_count(),
            "CSV upload validated"
        );
        Ok(preview)
    }

    pub fn is_valid(&self) -> bool {
        self.result.is_valid
    }

    pub fn valid_count(&self) -> usize {
        self.result.valid_rows.len()
    }

    pub fn invalid_count(&self) -> usize {
        self.result.invalid_rows.len()
    }

    pub fn errors(&self) -> &[CsvValidationError] {
        &self.result.errors
    }

    pub fn sample(&self, n: usize) -> &[ValidRow] {
        let end = n.min(self.result.valid_rows.len());
        &self.result.valid_rows[..end]
    }

    pub fn into_recipients(self) -> Vec<ValidRow> {
        self.result.valid_rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::csv::parse_csv_str;

    #[test]
    fn header_is_excluded_from_counts() {
        let rows = parse_csv_str(
            "mobile_number,variable_1\n919876543210,Alice\n919876543211,Bob\n12345,Eve\n",
        );
        let preview = CsvPreview::from_rows(rows, 1);

        assert_eq!(preview.total_rows, 3);
        assert_eq!(preview.valid_count(), 2);
        assert_eq!(preview.invalid_count(), 1);
        assert_eq!(preview.errors()[0].row, 4);
        assert!(!preview.is_valid());
        assert_eq!(preview.sample(1).len(), 1);
        assert_eq!(preview.sample(10).len(), 2);
    }

    #[test]
    fn empty_upload_is_trivially_valid() {
        let preview = CsvPreview::from_rows(Vec::new(), 2);
        assert!(preview.header.is_none());
        assert_eq!(preview.total_rows, 0);
        assert!(preview.is_valid());
    }
}
