// Batch pipeline: extract → transform → load, run sequentially

pub mod ingestion;
pub mod processing;
pub mod storage;

use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::{error, info, instrument};

use crate::config::Config;
use crate::error::{EtlError, Result};
use crate::metrics::PipelineMetrics;
use crate::types::{CleanRecord, RawRecord};
use ingestion::{JsonlSource, RecordSource};
use processing::{TransformOutput, TransformStats, Transformer};
use storage::{LoadReport, RecordSink, SqliteSink};

/// Result of a complete pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub source: String,
    pub table: String,
    pub location: String,
    pub total_records: usize,
    pub retained_records: usize,
    pub rejected_records: usize,
    pub duplicate_records: usize,
    pub unparseable_prices: usize,
    pub stats: TransformStats,
}

impl PipelineResult {
    fn new(source: String, report: LoadReport, stats: TransformStats) -> Self {
        Self {
            source,
            table: report.table,
            location: report.location,
            total_records: stats.input_records,
            retained_records: stats.retained,
            rejected_records: stats.rejections.total(),
            duplicate_records: stats.duplicates,
            unparseable_prices: stats.unparseable_prices,
            stats,
        }
    }
}

/// Sequential three-stage runner. Any stage error aborts the run before the
/// load stage touches the destination.
pub struct Pipeline {
    source: Box<dyn RecordSource>,
    sink: Box<dyn RecordSink>,
    transformer: Transformer,
    table_name: String,
}

impl Pipeline {
    pub fn new(
        source: Box<dyn RecordSource>,
        sink: Box<dyn RecordSink>,
        transformer: Transformer,
        table_name: impl Into<String>,
    ) -> Self {
        Self {
            source,
            sink,
            transformer,
            table_name: table_name.into(),
        }
    }

    /// JSON Lines file in, SQLite table out, as configured.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Box::new(JsonlSource::new(&config.pipeline.source_file)),
            Box::new(SqliteSink::new(&config.pipeline.database_file)),
            Transformer::new(config.transform.clone()),
            config.pipeline.table_name.clone(),
        )
    }

    /// Extract and transform without persisting anything.
    pub fn preview(&mut self) -> Result<TransformOutput> {
        let source_name = self.source.describe();
        let raw = self.extract(&source_name)?;
        self.transformer.run(&raw)
    }

    #[instrument(skip(self), fields(table = %self.table_name))]
    pub fn run(&mut self) -> Result<PipelineResult> {
        let result = self.run_stages();
        match &result {
            Ok(_) => PipelineMetrics::record_run_succeeded(),
            Err(e) => {
                error!("Pipeline failed: {}", e);
                PipelineMetrics::record_run_failed();
            }
        }
        result
    }

    fn run_stages(&mut self) -> Result<PipelineResult> {
        let source_name = self.source.describe();
        info!("🚀 Starting pipeline for {}", source_name);

        // Step 1: Extract
        let t_extract = Instant::now();
        let raw = self.extract(&source_name)?;
        PipelineMetrics::record_stage_duration("extract", t_extract.elapsed().as_secs_f64());
        info!("✅ Extracted {} raw records", raw.len());

        // Step 2: Transform
        let t_transform = Instant::now();
        let TransformOutput { records, stats } = self.transformer.run(&raw)?;
        PipelineMetrics::record_stage_duration("transform", t_transform.elapsed().as_secs_f64());

        // Step 3: Load
        let t_load = Instant::now();
        let report = self.load(&records)?;
        PipelineMetrics::record_stage_duration("load", t_load.elapsed().as_secs_f64());
        PipelineMetrics::record_rows_loaded(report.rows_written);

        Ok(PipelineResult::new(source_name, report, stats))
    }

    fn load(&mut self, records: &[CleanRecord]) -> Result<LoadReport> {
        let report = self.sink.replace_table(&self.table_name, records)?;
        info!("💾 {}", load_confirmation(&report));
        Ok(report)
    }

    /// An empty batch would replace the table with nothing.
    fn extract(&mut self, source_name: &str) -> Result<Vec<RawRecord>> {
        let raw = self.source.read_records()?;
        if raw.is_empty() {
            return Err(EtlError::EmptyBatch {
                input: source_name.to_string(),
            });
        }
        Ok(raw)
    }
}

fn load_confirmation(report: &LoadReport) -> String {
    match std::fs::metadata(Path::new(&report.location)) {
        Ok(meta) if meta.is_file() => format!(
            "Database saved as {} ({} bytes, {} records in '{}')",
            report.location,
            meta.len(),
            report.rows_written,
            report.table
        ),
        _ => format!(
            "Saved {} records to '{}' at {}",
            report.rows_written, report.table, report.location
        ),
    }
}
