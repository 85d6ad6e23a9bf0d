use super::{LoadReport, RecordSink};
use crate::error::Result;
use crate::types::CleanRecord;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// In-memory table store for development/testing. Clones share the same
/// tables, so a test can keep a handle while the pipeline owns the sink.
#[derive(Debug, Clone, Default)]
pub struct InMemorySink {
    tables: Arc<Mutex<HashMap<String, Vec<CleanRecord>>>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, name: &str) -> Option<Vec<CleanRecord>> {
        let tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        tables.get(name).cloned()
    }

    pub fn table_names(&self) -> Vec<String> {
        let tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<String> = tables.keys().cloned().collect();
        names.sort();
        names
    }
}

impl RecordSink for InMemorySink {
    fn replace_table(&mut self, table: &str, records: &[CleanRecord]) -> Result<LoadReport> {
        let mut tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        tables.insert(table.to_string(), records.to_vec());

        debug!("Replaced in-memory table {} with {} rows", table, records.len());
        Ok(LoadReport {
            table: table.to_string(),
            rows_written: records.len(),
            location: "memory".to_string(),
        })
    }
}
