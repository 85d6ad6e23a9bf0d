// Pipeline processing: price parsing, metric derivation, validation, deduplication

pub mod dedup;
pub mod metric;
pub mod price;
pub mod quality_gate;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::config::TransformConfig;
use crate::constants::DATE_FORMAT;
use crate::error::{EtlError, Result};
use crate::metrics::TransformMetrics;
use crate::types::{CleanRecord, RawRecord};
use dedup::dedup_records;
use metric::price_per_area;
use price::parse_price;
use quality_gate::{
    Candidate, DefaultQualityGate, QualityDecision, QualityGate, RejectReason, RejectionCounts,
};

/// Aggregate counts for one transform run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TransformStats {
    pub input_records: usize,
    /// Prices that were null or left no parseable number.
    pub unparseable_prices: usize,
    pub rejections: RejectionCounts,
    pub duplicates: usize,
    pub retained: usize,
}

#[derive(Debug, Clone)]
pub struct TransformOutput {
    pub records: Vec<CleanRecord>,
    pub stats: TransformStats,
}

/// Runs parse → derive → validate → project → dedup over a batch.
pub struct Transformer<G: QualityGate = DefaultQualityGate> {
    gate: G,
}

impl Transformer {
    pub fn new(config: TransformConfig) -> Self {
        Self {
            gate: DefaultQualityGate::with_config(config),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(TransformConfig::default())
    }
}

impl<G: QualityGate> Transformer<G> {
    pub fn with_gate(gate: G) -> Self {
        Self { gate }
    }

    /// Transform a whole batch. Bad prices and arithmetic anomalies only drop
    /// the record; an unparseable scraping date fails the batch.
    #[instrument(skip_all, fields(records = raw_records.len()))]
    pub fn run(&self, raw_records: &[RawRecord]) -> Result<TransformOutput> {
        let mut stats = TransformStats {
            input_records: raw_records.len(),
            ..TransformStats::default()
        };

        // Dates are resolved for the whole batch before any filtering.
        let dates = raw_records
            .iter()
            .map(scraping_date_of)
            .collect::<Result<Vec<_>>>()?;

        let mut retained = Vec::new();
        for (raw, date) in raw_records.iter().zip(dates) {
            let price = raw.raw_price.as_deref().and_then(parse_price);
            if price.is_none() {
                stats.unparseable_prices += 1;
            }
            let ppa = price_per_area(price, raw.living_area);
            let candidate = Candidate {
                price_per_area: ppa,
                property_type: raw.property_type.as_deref(),
                scraping_date: date,
            };

            match self.gate.assess(&candidate) {
                QualityDecision::Accept => match (price, raw.living_area, ppa, date) {
                    (Some(price), Some(living_area), Some(ppa), Some(date)) => {
                        retained.push((raw, date, price, living_area, ppa));
                    }
                    // An accepted record without a metric cannot be projected.
                    _ => stats.rejections.record(RejectReason::PricePerAreaOutOfRange),
                },
                QualityDecision::Reject(reason) => stats.rejections.record(reason),
            }
        }

        let projected: Vec<CleanRecord> = retained
            .into_iter()
            .map(|(raw, date, price, living_area, ppa)| CleanRecord {
                id: raw.id.clone(),
                scraping_date: date.format(DATE_FORMAT).to_string(),
                property_type: raw.property_type.clone().unwrap_or_default(),
                municipality: raw.municipality.clone(),
                price,
                living_area,
                price_per_area: ppa,
            })
            .collect();

        let before_dedup = projected.len();
        let records = dedup_records(projected);
        stats.duplicates = before_dedup - records.len();
        stats.retained = records.len();

        debug!(?stats, "Transform statistics");
        info!("Records processed: {}", stats.retained);
        TransformMetrics::record_run(&stats);

        Ok(TransformOutput { records, stats })
    }
}

fn scraping_date_of(raw: &RawRecord) -> Result<Option<NaiveDate>> {
    match &raw.scraping_date {
        None => Ok(None),
        Some(value) => value.to_date().map(Some).ok_or_else(|| EtlError::InvalidDate {
            id: raw.id.clone(),
            value: value.to_string(),
        }),
    }
}

/// Transform with the default listing rules, independent of any storage.
pub fn transform(raw_records: &[RawRecord]) -> Result<Vec<CleanRecord>> {
    Ok(Transformer::with_defaults().run(raw_records)?.records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawDate;

    fn raw(id: &str, price: &str, area: f64, kind: &str, date: &str) -> RawRecord {
        RawRecord {
            id: id.to_string(),
            raw_price: Some(price.to_string()),
            living_area: Some(area),
            property_type: Some(kind.to_string()),
            municipality: Some("Zug".to_string()),
            scraping_date: Some(RawDate::Text(date.to_string())),
        }
    }

    #[test]
    fn test_stats_account_for_every_record() {
        let input = vec![
            raw("keep", "900'000.-", 100.0, "house", "2022-01-01"),
            raw("dup", "900'000.-", 100.0, "house", "2022-01-01"),
            raw("dup", "900'000.-", 100.0, "house", "2022-01-01"),
            raw("cheap", "1 200 CHF", 60.0, "apartment", "2021-05-01"),
            raw("noprice", "on request", 60.0, "apartment", "2021-05-01"),
            raw("villa", "900'000", 100.0, "villa", "2022-01-01"),
            raw("old", "900'000", 100.0, "house", "2020-03-05"),
        ];
        let out = Transformer::with_defaults().run(&input).unwrap();
        let ids: Vec<_> = out.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["keep", "dup"]);

        let stats = out.stats;
        assert_eq!(stats.input_records, 7);
        assert_eq!(stats.unparseable_prices, 1);
        assert_eq!(stats.rejections.price_per_area_out_of_range, 2);
        assert_eq!(stats.rejections.property_type_not_allowed, 1);
        assert_eq!(stats.rejections.scraped_before_cutoff, 1);
        assert_eq!(stats.duplicates, 1);
        assert_eq!(stats.retained, 2);
        assert_eq!(
            stats.input_records,
            stats.retained + stats.duplicates + stats.rejections.total()
        );
    }

    #[test]
    fn test_invalid_date_fails_batch() {
        // Even a record that would be rejected anyway.
        let input = vec![
            raw("ok", "900'000", 100.0, "house", "2022-01-01"),
            raw("bad", "1", 100.0, "villa", "not a date"),
        ];
        match Transformer::with_defaults().run(&input) {
            Err(EtlError::InvalidDate { id, .. }) => assert_eq!(id, "bad"),
            other => panic!("expected InvalidDate, got {other:?}"),
        }
    }

    #[test]
    fn test_date_normalized_to_iso() {
        let input = vec![raw("a", "900000", 100.0, "house", "2022-01-01T08:15:00")];
        let out = transform(&input).unwrap();
        assert_eq!(out[0].scraping_date, "2022-01-01");
    }

    #[test]
    fn test_zero_and_missing_area_rejected() {
        let mut missing = raw("m", "900000", 100.0, "house", "2022-01-01");
        missing.living_area = None;
        let input = vec![raw("z", "900000", 0.0, "house", "2022-01-01"), missing];
        let out = Transformer::with_defaults().run(&input).unwrap();
        assert!(out.records.is_empty());
        assert_eq!(out.stats.rejections.price_per_area_out_of_range, 2);
    }
}
