use chrono::NaiveDate;
use serde::Serialize;

use crate::config::TransformConfig;

/// The fields of a listing the quality gate looks at, after price parsing
/// and metric derivation.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub price_per_area: Option<f64>,
    pub property_type: Option<&'a str>,
    pub scraping_date: Option<NaiveDate>,
}

/// Quality Gate decision for a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityDecision {
    /// Record is retained
    Accept,
    /// Record is dropped; the first failing rule is reported
    Reject(RejectReason),
}

/// Which rule rejected a record. Only aggregated, never logged per record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Missing, non-finite, or outside the configured bounds
    PricePerAreaOutOfRange,
    PropertyTypeNotAllowed,
    /// Scraped on or before the cutoff date, or no date at all
    ScrapedBeforeCutoff,
}

/// Trait for implementing Quality Gate assessment logic
pub trait QualityGate {
    fn assess(&self, candidate: &Candidate<'_>) -> QualityDecision;

    fn accepts(&self, candidate: &Candidate<'_>) -> bool {
        self.assess(candidate) == QualityDecision::Accept
    }
}

/// Range, membership and cutoff rules driven by [`TransformConfig`].
#[derive(Debug, Clone)]
pub struct DefaultQualityGate {
    pub config: TransformConfig,
}

impl Default for DefaultQualityGate {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultQualityGate {
    /// Create a new Quality Gate with default configuration
    pub fn new() -> Self {
        Self {
            config: TransformConfig::default(),
        }
    }

    /// Create a Quality Gate with custom configuration
    pub fn with_config(config: TransformConfig) -> Self {
        Self { config }
    }

    /// Inclusive on both ends. NaN and infinities fail.
    fn price_per_area_in_range(&self, value: Option<f64>) -> bool {
        match value {
            Some(v) if v.is_finite() => {
                self.config.min_price_per_area <= v && v <= self.config.max_price_per_area
            }
            _ => false,
        }
    }

    /// Exact, case-sensitive match.
    fn property_type_allowed(&self, property_type: Option<&str>) -> bool {
        property_type.is_some_and(|t| self.config.allowed_property_types.iter().any(|a| a == t))
    }
}

impl QualityGate for DefaultQualityGate {
    fn assess(&self, candidate: &Candidate<'_>) -> QualityDecision {
        if !self.price_per_area_in_range(candidate.price_per_area) {
            return QualityDecision::Reject(RejectReason::PricePerAreaOutOfRange);
        }
        if !self.property_type_allowed(candidate.property_type) {
            return QualityDecision::Reject(RejectReason::PropertyTypeNotAllowed);
        }
        let after_cutoff = candidate
            .scraping_date
            .is_some_and(|d| d > self.config.scraping_date_cutoff);
        if !after_cutoff {
            return QualityDecision::Reject(RejectReason::ScrapedBeforeCutoff);
        }
        QualityDecision::Accept
    }
}

/// Aggregate rejection counts for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RejectionCounts {
    pub price_per_area_out_of_range: usize,
    pub property_type_not_allowed: usize,
    pub scraped_before_cutoff: usize,
}

impl RejectionCounts {
    pub fn record(&mut self, reason: RejectReason) {
        match reason {
            RejectReason::PricePerAreaOutOfRange => self.price_per_area_out_of_range += 1,
            RejectReason::PropertyTypeNotAllowed => self.property_type_not_allowed += 1,
            RejectReason::ScrapedBeforeCutoff => self.scraped_before_cutoff += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.price_per_area_out_of_range + self.property_type_not_allowed + self.scraped_before_cutoff
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn candidate(ppa: Option<f64>, kind: &str, scraped: NaiveDate) -> Candidate<'_> {
        Candidate {
            price_per_area: ppa,
            property_type: Some(kind),
            scraping_date: Some(scraped),
        }
    }

    #[test]
    fn test_accepts_valid_listing() {
        let gate = DefaultQualityGate::new();
        assert_eq!(
            gate.assess(&candidate(Some(9000.0), "house", date(2022, 1, 1))),
            QualityDecision::Accept
        );
        assert!(gate.accepts(&candidate(Some(4200.5), "apartment", date(2020, 3, 6))));
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let gate = DefaultQualityGate::new();
        let d = date(2021, 5, 1);
        assert!(gate.accepts(&candidate(Some(500.0), "house", d)));
        assert!(gate.accepts(&candidate(Some(15000.0), "house", d)));
        assert!(!gate.accepts(&candidate(Some(499.99), "house", d)));
        assert!(!gate.accepts(&candidate(Some(15000.01), "house", d)));
    }

    #[test]
    fn test_undefined_metric_rejected() {
        let gate = DefaultQualityGate::new();
        let d = date(2021, 5, 1);
        for ppa in [None, Some(f64::INFINITY), Some(f64::NAN), Some(f64::NEG_INFINITY)] {
            assert_eq!(
                gate.assess(&candidate(ppa, "house", d)),
                QualityDecision::Reject(RejectReason::PricePerAreaOutOfRange)
            );
        }
    }

    #[test]
    fn test_property_type_is_case_sensitive() {
        let gate = DefaultQualityGate::new();
        let d = date(2021, 5, 1);
        for kind in ["Apartment", "HOUSE", "villa", " house", ""] {
            assert_eq!(
                gate.assess(&candidate(Some(5000.0), kind, d)),
                QualityDecision::Reject(RejectReason::PropertyTypeNotAllowed),
                "{kind}"
            );
        }
        let missing = Candidate {
            price_per_area: Some(5000.0),
            property_type: None,
            scraping_date: Some(d),
        };
        assert!(!gate.accepts(&missing));
    }

    #[test]
    fn test_cutoff_is_strict() {
        let gate = DefaultQualityGate::new();
        assert_eq!(
            gate.assess(&candidate(Some(5000.0), "house", date(2020, 3, 5))),
            QualityDecision::Reject(RejectReason::ScrapedBeforeCutoff)
        );
        assert!(!gate.accepts(&candidate(Some(5000.0), "house", date(2019, 12, 31))));
        assert!(gate.accepts(&candidate(Some(5000.0), "house", date(2020, 3, 6))));
        let undated = Candidate {
            price_per_area: Some(5000.0),
            property_type: Some("house"),
            scraping_date: None,
        };
        assert_eq!(
            gate.assess(&undated),
            QualityDecision::Reject(RejectReason::ScrapedBeforeCutoff)
        );
    }

    #[test]
    fn test_injected_thresholds() {
        let gate = DefaultQualityGate::with_config(TransformConfig {
            min_price_per_area: 10.0,
            max_price_per_area: 100.0,
            allowed_property_types: vec!["parking".to_string()],
            scraping_date_cutoff: date(2010, 1, 1),
        });
        assert!(gate.accepts(&candidate(Some(20.0), "parking", date(2015, 6, 1))));
        assert!(!gate.accepts(&candidate(Some(5000.0), "parking", date(2015, 6, 1))));
        assert!(!gate.accepts(&candidate(Some(20.0), "house", date(2015, 6, 1))));
    }

    #[test]
    fn test_rejection_counts() {
        let mut counts = RejectionCounts::default();
        counts.record(RejectReason::PricePerAreaOutOfRange);
        counts.record(RejectReason::PricePerAreaOutOfRange);
        counts.record(RejectReason::ScrapedBeforeCutoff);
        assert_eq!(counts.price_per_area_out_of_range, 2);
        assert_eq!(counts.property_type_not_allowed, 0);
        assert_eq!(counts.total(), 3);
    }
}
