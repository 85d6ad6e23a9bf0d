// Pipeline storage: persisting the clean table

pub mod in_memory;
pub mod sqlite;

pub use in_memory::InMemorySink;
pub use sqlite::SqliteSink;

use serde::Serialize;

use crate::error::Result;
use crate::types::CleanRecord;

/// Outcome of one load.
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub table: String,
    pub rows_written: usize,
    /// Where the table lives, e.g. a database file path.
    pub location: String,
}

/// Destination for the clean table. Every write replaces the named table
/// entirely (drop-and-recreate); a failed write leaves the previous table
/// in place.
pub trait RecordSink {
    fn replace_table(&mut self, table: &str, records: &[CleanRecord]) -> Result<LoadReport>;
}
