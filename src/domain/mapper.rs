use crate::domain::model::RowRecord;
use crate::utils::error::{ReportError, Result};
use std::collections::HashMap;

/// Converts a header row plus data rows into labeled records.
///
/// Keys are the lower-cased header cells; values keep their original case.
/// A data row shorter than the header is padded with empty strings so every
/// record in the batch exposes the same key set; cells past the end of the
/// header have no key to attach to and are dropped.
pub fn rows_to_records(values: &[Vec<String>]) -> Result<Vec<RowRecord>> {
    let Some(header) = values.first() else {
        return Ok(Vec::new());
    };

    if header.is_empty() {
        return Err(ReportError::validation("Header row is empty"));
    }

    let keys: Vec<String> = header.iter().map(|h| h.to_lowercase()).collect();

    let records = values[1..]
        .iter()
        .map(|row| {
            let mut data = HashMap::with_capacity(keys.len());
            for (i, key) in keys.iter().enumerate() {
                let value = row.get(i).cloned().unwrap_or_default();
                data.insert(key.clone(), value);
            }
            RowRecord { data }
        })
        .collect();

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_maps_header_to_lowercase_keys() {
        let values = grid(&[
            &["Warehouse", "Produce", "Date", "Quantity", "Unit"],
            &["A", "Apples", "2024-01-01", "10", "kg"],
        ]);

        let records = rows_to_records(&values).unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.get("warehouse"), "A");
        assert_eq!(record.get("produce"), "Apples");
        assert_eq!(record.get("date"), "2024-01-01");
        assert_eq!(record.get("quantity"), "10");
        assert_eq!(record.get("unit"), "kg");
    }

    #[test]
    fn test_values_keep_original_case() {
        let values = grid(&[&["Name"], &["MixedCase Value"]]);

        let records = rows_to_records(&values).unwrap();

        assert_eq!(records[0].get("name"), "MixedCase Value");
    }

    #[test]
    fn test_key_set_matches_header_for_equal_length_rows() {
        let values = grid(&[&["A", "B", "C"], &["1", "2", "3"], &["4", "5", "6"]]);

        let records = rows_to_records(&values).unwrap();

        for record in &records {
            let mut keys: Vec<&str> = record.data.keys().map(String::as_str).collect();
            keys.sort_unstable();
            assert_eq!(keys, vec!["a", "b", "c"]);
        }
        assert_eq!(records[1].get("c"), "6");
    }

    #[test]
    fn test_empty_data_rows_yield_empty_sequence() {
        let values = grid(&[&["Warehouse", "Produce"]]);
        assert!(rows_to_records(&values).unwrap().is_empty());

        let no_header: Vec<Vec<String>> = Vec::new();
        assert!(rows_to_records(&no_header).unwrap().is_empty());
    }

    #[test]
    fn test_short_row_is_padded_with_empty_values() {
        let values = grid(&[&["A", "B", "C"], &["1"]]);

        let records = rows_to_records(&values).unwrap();

        assert_eq!(records[0].get("a"), "1");
        assert_eq!(records[0].get("b"), "");
        assert_eq!(records[0].get("c"), "");
        // Padded keys are present, not omitted
        assert!(records[0].data.contains_key("b"));
        assert!(records[0].data.contains_key("c"));
    }

    #[test]
    fn test_long_row_drops_extra_cells() {
        let values = grid(&[&["A", "B"], &["1", "2", "surplus"]]);

        let records = rows_to_records(&values).unwrap();

        assert_eq!(records[0].data.len(), 2);
        assert_eq!(records[0].get("a"), "1");
        assert_eq!(records[0].get("b"), "2");
    }

    #[test]
    fn test_empty_header_row_is_rejected() {
        let values = vec![Vec::new(), vec!["1".to_string()]];

        let err = rows_to_records(&values).unwrap_err();
        assert!(matches!(err, ReportError::Validation { .. }));
    }
}
