//! Inspect a loaded database: tables, schemas, sample rows, CSV export.

use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{EtlError, Result};

pub const SAMPLE_ROWS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub declared_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
    pub sample: Vec<Vec<String>>,
    /// Set when the table was exported: (path, distinct rows written).
    pub export: Option<(PathBuf, usize)>,
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn value_to_string(v: ValueRef<'_>) -> String {
    match v {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => format!("{f:?}"),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

pub fn open_existing<P: AsRef<Path>>(db_path: P) -> Result<Connection> {
    let db_path = db_path.as_ref();
    if !db_path.is_file() {
        return Err(EtlError::Config(format!(
            "Database not found at: {}",
            db_path.display()
        )));
    }
    Ok(Connection::open(db_path)?)
}

pub fn list_tables(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(names)
}

pub fn describe_table(conn: &Connection, table: &str) -> Result<Vec<ColumnInfo>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(table)))?;
    let columns = stmt
        .query_map([], |row| {
            Ok(ColumnInfo {
                name: row.get(1)?,
                declared_type: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(columns)
}

fn select_rows(conn: &Connection, sql: &str) -> Result<Vec<Vec<String>>> {
    let mut stmt = conn.prepare(sql)?;
    let width = stmt.column_count();
    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(width);
        for i in 0..width {
            cells.push(value_to_string(row.get_ref(i)?));
        }
        out.push(cells);
    }
    Ok(out)
}

pub fn sample_rows(conn: &Connection, table: &str, limit: usize) -> Result<Vec<Vec<String>>> {
    select_rows(
        conn,
        &format!("SELECT * FROM {} LIMIT {}", quote_ident(table), limit),
    )
}

/// Write the distinct rows of `table` to `path` with a header line.
pub fn export_distinct_csv<P: AsRef<Path>>(conn: &Connection, table: &str, path: P) -> Result<usize> {
    let header: Vec<String> = describe_table(conn, table)?.into_iter().map(|c| c.name).collect();
    let rows = select_rows(conn, &format!("SELECT DISTINCT * FROM {}", quote_ident(table)))?;

    let mut writer = csv::Writer::from_path(path.as_ref())?;
    writer.write_record(&header)?;
    for row in &rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(rows.len())
}

/// Summarize every table; with `export_dir`, also write `<table>.csv` there.
pub fn explore<P: AsRef<Path>>(db_path: P, export_dir: Option<&Path>) -> Result<Vec<TableSummary>> {
    let conn = open_existing(db_path)?;
    let mut summaries = Vec::new();
    for name in list_tables(&conn)? {
        let columns = describe_table(&conn, &name)?;
        let sample = sample_rows(&conn, &name, SAMPLE_ROWS)?;
        let export = match export_dir {
            Some(dir) => {
                let path = dir.join(format!("{name}.csv"));
                let written = export_distinct_csv(&conn, &name, &path)?;
                info!("Exported {} rows to: {}", written, path.display());
                Some((path, written))
            }
            None => None,
        };
        summaries.push(TableSummary {
            name,
            columns,
            sample,
            export,
        });
    }
    Ok(summaries)
}

/// Markdown rendering of a table summary for terminal output.
pub fn render_summary(summary: &TableSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Schema for table '{}':", summary.name);
    for col in &summary.columns {
        let _ = writeln!(out, "  - {} ({})", col.name, col.declared_type);
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Sample rows from '{}':", summary.name);

    let header: Vec<&str> = summary.columns.iter().map(|c| c.name.as_str()).collect();
    let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
    for row in &summary.sample {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }
    let line = |cells: &[&str]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = *w))
            .collect();
        format!("| {} |", padded.join(" | "))
    };
    let _ = writeln!(out, "{}", line(&header));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "|-{}-|", rule.join("-|-"));
    for row in &summary.sample {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        let _ = writeln!(out, "{}", line(&cells));
    }
    let _ = writeln!(out, "{}", "-".repeat(50));
    out
}
