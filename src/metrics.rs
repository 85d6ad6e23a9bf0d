//! Run metrics for the ETL pipeline.
//!
//! Counters are always emitted through the `metrics` facade; they only go
//! anywhere once [`init_metrics`] has installed the Prometheus recorder. A
//! batch job has nothing to scrape, so the rendered snapshot is written to a
//! text file for a node-exporter style collector instead.

use std::path::Path;
use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{info, warn};

use crate::error::Result;
use crate::pipeline::processing::TransformStats;

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Idempotent; returns whether a recorder
/// owned by this module is active.
pub fn init_metrics() -> bool {
    if HANDLE.get().is_some() {
        return true;
    }
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = HANDLE.set(handle);
            true
        }
        Err(e) => {
            warn!("Prometheus recorder install failed (possibly already installed): {}", e);
            false
        }
    }
}

/// Render the current snapshot to `path` in Prometheus text format.
pub fn write_textfile<P: AsRef<Path>>(path: P) -> Result<()> {
    let Some(handle) = HANDLE.get() else {
        warn!("Metrics recorder not installed, skipping text file export");
        return Ok(());
    };
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, handle.render())?;
    info!("Wrote run metrics to {}", path.display());
    Ok(())
}

pub struct TransformMetrics;

impl TransformMetrics {
    pub fn record_run(stats: &TransformStats) {
        ::metrics::counter!("property_etl_records_in_total").increment(stats.input_records as u64);
        ::metrics::counter!("property_etl_records_retained_total").increment(stats.retained as u64);
        ::metrics::counter!("property_etl_duplicates_total").increment(stats.duplicates as u64);
        ::metrics::counter!("property_etl_unparseable_prices_total")
            .increment(stats.unparseable_prices as u64);
        let r = &stats.rejections;
        ::metrics::counter!("property_etl_records_rejected_total", "rule" => "price_per_area")
            .increment(r.price_per_area_out_of_range as u64);
        ::metrics::counter!("property_etl_records_rejected_total", "rule" => "property_type")
            .increment(r.property_type_not_allowed as u64);
        ::metrics::counter!("property_etl_records_rejected_total", "rule" => "scraping_date")
            .increment(r.scraped_before_cutoff as u64);
    }
}

pub struct PipelineMetrics;

impl PipelineMetrics {
    pub fn record_stage_duration(stage: &'static str, duration_secs: f64) {
        ::metrics::histogram!("property_etl_stage_duration_seconds", "stage" => stage)
            .record(duration_secs);
    }

    pub fn record_rows_loaded(rows: usize) {
        ::metrics::gauge!("property_etl_rows_loaded").set(rows as f64);
    }

    pub fn record_run_failed() {
        ::metrics::counter!("property_etl_runs_failed_total").increment(1);
    }

    pub fn record_run_succeeded() {
        ::metrics::counter!("property_etl_runs_succeeded_total").increment(1);
        ::metrics::gauge!("property_etl_last_success_timestamp_seconds")
            .set(chrono::Utc::now().timestamp() as f64);
    }
}
