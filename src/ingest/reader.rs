//! CSV reader for tabular sales data.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::debug;

use crate::core::SalesRecord;
use crate::error::{ForecastError, Result};

/// Columns every input table must carry.
pub const REQUIRED_COLUMNS: [&str; 3] = ["Year", "Month", "Sales Amt"];

/// Read sales records from CSV data with a header row.
///
/// Extra columns are ignored and an empty `Sales Amt` cell becomes a
/// missing amount.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<SalesRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| ForecastError::Ingest(format!("failed to read header: {e}")))?
        .clone();

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        return Err(ForecastError::Ingest(format!(
            "missing required column(s): {}",
            missing.join(", ")
        )));
    }

    let mut records = Vec::new();
    for (i, row) in reader.deserialize::<SalesRecord>().enumerate() {
        // Row numbers are 1-based and count the header line.
        let record = row.map_err(|e| ForecastError::Ingest(format!("row {}: {e}", i + 2)))?;
        records.push(record);
    }

    debug!(rows = records.len(), "read sales records");
    Ok(records)
}

/// Read sales records from a CSV file on disk.
pub fn read_records_from_path(path: impl AsRef<Path>) -> Result<Vec<SalesRecord>> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| ForecastError::Ingest(format!("cannot open {}: {e}", path.display())))?;
    read_records(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_rows_and_ignores_extra_columns() {
        let data = "PO Date,Year,Month,Sales Amt,Region\n\
                    2022-01-04,2022,1,120.5,North\n\
                    2022-02-11,2022,2,,South\n\
                    2022-02-19,2022,2,80,South\n";

        let records = read_records(data.as_bytes()).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0], SalesRecord::new(2022, 1, Some(120.5)));
        assert_eq!(records[1].amount, None);
        assert_eq!(records[2], SalesRecord::new(2022, 2, Some(80.0)));
    }

    #[test]
    fn reports_missing_columns() {
        let data = "Year,Amount\n2022,1\n";
        let err = read_records(data.as_bytes()).unwrap_err();
        match err {
            ForecastError::Ingest(msg) => {
                assert!(msg.contains("Month"));
                assert!(msg.contains("Sales Amt"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn reports_malformed_rows_with_their_line() {
        let data = "Year,Month,Sales Amt\n2022,1,10\n2022,March,10\n";
        let err = read_records(data.as_bytes()).unwrap_err();
        match err {
            ForecastError::Ingest(msg) => assert!(msg.starts_with("row 3")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn reads_from_a_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Year,Month,Sales Amt").unwrap();
        writeln!(file, "2020,12,5").unwrap();

        let records = read_records_from_path(file.path()).unwrap();
        assert_eq!(records, vec![SalesRecord::new(2020, 12, Some(5.0))]);

        assert!(matches!(
            read_records_from_path("/definitely/not/here.csv"),
            Err(ForecastError::Ingest(_))
        ));
    }
}
