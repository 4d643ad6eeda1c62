//! Bulk recipient upload: a naive comma splitter and the per-row validator.
//!
//! The parser does not understand quoting; a comma inside quotes produces an
//! extra cell. Rows are reported with 1-based numbers that count the header
//! line, so the first data row is row 2.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::utils::phone::validate_phone_number;

pub const HEADER_OFFSET: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidRow {
    pub mobile_number: String,
    pub dynamic_variables: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvValidationError {
    pub row: usize,
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvValidationResult {
    pub valid_rows: Vec<ValidRow>,
    pub invalid_rows: Vec<usize>,
    pub errors: Vec<CsvValidationError>,
    pub is_valid: bool,
}

pub fn parse_csv_str(text: &str) -> Vec<Vec<String>> {
    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split(',').map(|cell| cell.trim().to_string()).collect())
        .collect()
}

pub async fn parse_csv(path: impl AsRef<Path>) -> Result<Vec<Vec<String>>> {
    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path).await?;
    let rows = parse_csv_str(&text);
    tracing::debug!(path = %path.display(), rows = rows.len(), "Parsed CSV upload");
    Ok(rows)
}

/// Drops the header line, if any.
pub fn split_header(mut rows: Vec<Vec<String>>) -> (Option<Vec<String>>, Vec<Vec<String>>) {
    if rows.is_empty() {
        return (None, rows);
    }
    let header = rows.remove(0);
    (Some(header), rows)
}

pub fn validate_csv_data(rows: &[Vec<String>], template_variable_count: usize) -> CsvValidationResult {
    let expected_columns = template_variable_count + 1;
    let mut result = CsvValidationResult::default();

    for (index, row) in rows.iter().enumerate() {
        let row_number = index + HEADER_OFFSET;

        if row.len() < expected_columns {
            result.invalid_rows.push(row_number);
            result.errors.push(CsvValidationError {
                row: row_number,
                field: "columns".to_string(),
                message: format!(
                    "Insufficient columns. Expected {}, got {}",
                    expected_columns,
                    row.len()
                ),
            });
            continue;
        }

        let mobile_number = &row[0];
        if !validate_phone_number(mobile_number) {
            result.invalid_rows.push(row_number);
            result.errors.push(CsvValidationError {
                row: row_number,
                field: "mobile_number".to_string(),
                message: format!(
                    "Invalid phone number format: {}. Must be 91XXXXXXXXXX",
                    mobile_number
                ),
            });
            continue;
        }

        let dynamic_variables: Vec<String> = row[1..expected_columns].to_vec();
        if dynamic_variables.iter().any(|v| v.trim().is_empty()) {
            result.invalid_rows.push(row_number);
            result.errors.push(CsvValidationError {
                row: row_number,
                field: "dynamic_variables".to_string(),
                message: "One or more dynamic variables are empty".to_string(),
            });
            continue;
        }

        result.valid_rows.push(ValidRow {
            mobile_number: mobile_number.clone(),
            dynamic_variables,
        });
    }

    result.is_valid = result.errors.is_empty();
    result
}

/// Downloadable upload template for a template with `variable_count` placeholders.
pub fn csv_template(variable_count: usize) -> String {
    let mut header = vec!["mobile_number".to_string()];
    let mut example = vec!["919876543210".to_string()];
    for n in 1..=variable_count {
        header.push(format!("variable_{}", n));
        example.push(format!("value_{}", n));
    }
    format!("{}\n{}\n", header.join(","), example.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn parser_trims_cells_and_skips_blank_lines() {
        let rows = parse_csv_str("mobile_number, variable_1\r\n\n 919876543210 , Alice \r\n   \n");
        assert_eq!(
            rows,
            vec![row(&["mobile_number", "variable_1"]), row(&["919876543210", "Alice"])]
        );
    }

    #[test]
    fn parser_does_not_understand_quotes() {
        let rows = parse_csv_str("919876543210,\"Sharma, Anil\"");
        assert_eq!(rows[0].len(), 3);
    }

    #[test]
    fn valid_row_is_accepted() {
        let result = validate_csv_data(&[row(&["919876543210", "Alice"])], 1);
        assert!(result.is_valid);
        assert_eq!(
            result.valid_rows,
            vec![ValidRow {
                mobile_number: "919876543210".to_string(),
                dynamic_variables: vec!["Alice".to_string()],
            }]
        );
        assert!(result.invalid_rows.is_empty());
    }

    #[test]
    fn bad_phone_is_reported_against_row_two() {
        let result = validate_csv_data(&[row(&["12345", "Alice"])], 1);
        assert!(!result.is_valid);
        assert_eq!(result.invalid_rows, vec![2]);
        assert_eq!(result.errors[0].field, "mobile_number");
        assert_eq!(
            result.errors[0].message,
            "Invalid phone number format: 12345. Must be 91XXXXXXXXXX"
        );
    }

    #[test]
    fn empty_variable_is_reported() {
        let result = validate_csv_data(&[row(&["919876543210", ""])], 1);
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].message, "One or more dynamic variables are empty");
        assert!(result.valid_rows.is_empty());
    }

    #[test]
    fn short_row_stops_at_column_check() {
        let result = validate_csv_data(&[row(&["bogus"])], 1);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].message, "Insufficient columns. Expected 2, got 1");
        assert_eq!(result.errors[0].field, "columns");
    }

    #[test]
    fn one_error_per_row_and_extra_cells_ignored() {
        let rows = vec![
            row(&["919876543210", "A", "B", "extra"]),
            row(&["12", ""]),
            row(&["919876543211", "C", ""]),
            row(&["919876543212"]),
        ];
        let result = validate_csv_data(&rows, 2);

        assert_eq!(result.valid_rows.len(), 1);
        assert_eq!(result.valid_rows[0].dynamic_variables, vec!["A", "B"]);
        assert_eq!(result.invalid_rows, vec![3, 4, 5]);
        assert_eq!(result.errors.len(), 3);
        assert_eq!(result.errors[0].message, "Insufficient columns. Expected 3, got 2");
        assert_eq!(result.errors[1].field, "dynamic_variables");
        assert_eq!(result.errors[2].field, "columns");
    }

    #[test]
    fn validation_is_repeatable() {
        let rows = vec![row(&["919876543210", "Alice"]), row(&["x", "y"])];
        assert_eq!(validate_csv_data(&rows, 1), validate_csv_data(&rows, 1));
    }

    #[test]
    fn zero_variable_template_only_needs_a_phone() {
        let result = validate_csv_data(&[row(&["919876543210"])], 0);
        assert!(result.is_valid);
        assert!(result.valid_rows[0].dynamic_variables.is_empty());
    }

    #[test]
    fn generated_template_round_trips_through_validator() {
        let text = csv_template(2);
        assert!(text.starts_with("mobile_number,variable_1,variable_2\n"));

        let (header, rows) = split_header(parse_csv_str(&text));
        assert_eq!(header.unwrap()[0], "mobile_number");
        assert!(validate_csv_data(&rows, 2).is_valid);
    }
}
