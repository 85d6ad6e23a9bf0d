use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use super::{LoadReport, RecordSink};
use crate::config::validate_table_name;
use crate::constants::OUTPUT_COLUMNS;
use crate::error::Result;
use crate::types::CleanRecord;

/// SQLite database file holding the output table.
#[derive(Debug, Clone)]
pub struct SqliteSink {
    db_path: PathBuf,
}

impl SqliteSink {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn open(&self) -> Result<Connection> {
        if let Some(parent) = self.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Connection::open(&self.db_path)?)
    }
}

fn create_table_sql(table: &str) -> String {
    format!(
        r#"
        DROP TABLE IF EXISTS "{table}";
        CREATE TABLE "{table}" (
            id                     TEXT,
            scraping_date          DATE,
            property_type          TEXT,
            municipality           TEXT,
            price                  DOUBLE,
            living_area            DOUBLE,
            price_per_square_meter DOUBLE
        );
        "#
    )
}

impl RecordSink for SqliteSink {
    #[instrument(skip(self, records), fields(db = %self.db_path.display(), rows = records.len()))]
    fn replace_table(&mut self, table: &str, records: &[CleanRecord]) -> Result<LoadReport> {
        validate_table_name(table)?;
        let mut conn = self.open()?;

        // DDL is transactional in SQLite: readers see the old table or the new one.
        let tx = conn.transaction()?;
        tx.execute_batch(&create_table_sql(table))?;
        {
            let mut stmt = tx.prepare(&format!(
                r#"INSERT INTO "{table}" ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
                OUTPUT_COLUMNS.join(", ")
            ))?;
            for r in records {
                stmt.execute(params![
                    r.id,
                    r.scraping_date,
                    r.property_type,
                    r.municipality,
                    r.price,
                    r.living_area,
                    r.price_per_area,
                ])?;
            }
        }
        tx.commit()?;

        info!("Loaded {} rows into table '{}'", records.len(), table);
        Ok(LoadReport {
            table: table.to_string(),
            rows_written: records.len(),
            location: self.db_path.display().to_string(),
        })
    }
}

/// Read an output table back in insertion order.
pub fn read_table<P: AsRef<Path>>(db_path: P, table: &str) -> Result<Vec<CleanRecord>> {
    validate_table_name(table)?;
    let conn = Connection::open(db_path.as_ref())?;
    let mut stmt = conn.prepare(&format!(
        r#"SELECT {} FROM "{table}" ORDER BY rowid"#,
        OUTPUT_COLUMNS.join(", ")
    ))?;
    let rows = stmt.query_map([], |row| {
        Ok(CleanRecord {
            id: row.get(0)?,
            scraping_date: row.get(1)?,
            property_type: row.get(2)?,
            municipality: row.get(3)?,
            price: row.get(4)?,
            living_area: row.get(5)?,
            price_per_area: row.get(6)?,
        })
    })?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Whether `table` exists in the database at `db_path`.
pub fn table_exists<P: AsRef<Path>>(db_path: P, table: &str) -> Result<bool> {
    let conn = Connection::open(db_path.as_ref())?;
    let found: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![table],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}
