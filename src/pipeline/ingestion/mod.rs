// Pipeline ingestion: reading raw listing records

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::error::{EtlError, Result};
use crate::types::RawRecord;

/// Anything that can hand the pipeline a full batch of raw records.
pub trait RecordSource {
    /// Human-readable name for logs and results.
    fn describe(&self) -> String;

    fn read_records(&mut self) -> Result<Vec<RawRecord>>;
}

/// JSON Lines file, one listing object per line.
#[derive(Debug, Clone)]
pub struct JsonlSource {
    path: PathBuf,
}

impl JsonlSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for JsonlSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn read_records(&mut self) -> Result<Vec<RawRecord>> {
        let file = File::open(&self.path)?;
        let records = read_jsonl(file)?;
        info!("Extracted {} raw records from {}", records.len(), self.path.display());
        Ok(records)
    }
}

/// Decode a JSON Lines stream. Whitespace-only lines are skipped; any other
/// malformed line fails the whole batch. Line numbers are 1-based.
pub fn read_jsonl<R: Read>(reader: R) -> Result<Vec<RawRecord>> {
    let mut records = Vec::new();
    for (idx, line) in BufReader::new(reader).lines().enumerate() {
        let line_no = idx + 1;
        let line = line?;
        if line.trim().is_empty() {
            debug!("Skipping blank line {}", line_no);
            continue;
        }
        let value: serde_json::Value = serde_json::from_str(&line)
            .map_err(|source| EtlError::Json { line: line_no, source })?;
        records.push(RawRecord::from_json(value, line_no)?);
    }
    Ok(records)
}

/// Records already in memory, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<RawRecord>,
}

impl MemorySource {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self { records }
    }
}

impl RecordSource for MemorySource {
    fn describe(&self) -> String {
        format!("memory ({} records)", self.records.len())
    }

    fn read_records(&mut self) -> Result<Vec<RawRecord>> {
        Ok(self.records.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{"id":"a1","raw_price":"1 200 CHF","living_area":60,"property_type":"apartment","municipality":"Zug","scraping_date":"2021-05-01"}

{"id":"b2","raw_price":"900'000.-","living_area":100,"property_type":"house","municipality":"Baar","scraping_date":"2022-01-01"}
"#;

    #[test]
    fn test_reads_lines_and_skips_blanks() {
        let records = read_jsonl(SAMPLE.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "a1");
        assert_eq!(records[1].municipality.as_deref(), Some("Baar"));
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let input = "{\"id\":\"a1\"\n";
        match read_jsonl(input.as_bytes()) {
            Err(EtlError::Json { line, .. }) => assert_eq!(line, 1),
            other => panic!("expected Json error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_column_on_later_line() {
        let input = format!(
            "{}\n{}\n",
            SAMPLE.lines().next().unwrap(),
            r#"{"id":"c3","raw_price":"1","living_area":1,"property_type":"house","scraping_date":"2022-01-01"}"#
        );
        match read_jsonl(input.as_bytes()) {
            Err(EtlError::MissingColumn { column, line }) => {
                assert_eq!(column, "municipality");
                assert_eq!(line, 2);
            }
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let mut source = JsonlSource::new("/no/such/scraping_data.jsonl");
        assert!(matches!(source.read_records(), Err(EtlError::Io(_))));
    }
}
