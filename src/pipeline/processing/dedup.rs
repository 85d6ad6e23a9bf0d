use std::collections::HashSet;

use crate::types::CleanRecord;

/// Hashable view of all seven output columns. Floats compare by bit
/// pattern with `-0.0` folded into `0.0`.
#[derive(Debug, PartialEq, Eq, Hash)]
struct RowKey<'a> {
    id: &'a str,
    scraping_date: &'a str,
    property_type: &'a str,
    municipality: Option<&'a str>,
    price: u64,
    living_area: u64,
    price_per_area: u64,
}

fn float_key(v: f64) -> u64 {
    (v + 0.0).to_bits()
}

impl<'a> From<&'a CleanRecord> for RowKey<'a> {
    fn from(r: &'a CleanRecord) -> Self {
        Self {
            id: &r.id,
            scraping_date: &r.scraping_date,
            property_type: &r.property_type,
            municipality: r.municipality.as_deref(),
            price: float_key(r.price),
            living_area: float_key(r.living_area),
            price_per_area: float_key(r.price_per_area),
        }
    }
}

/// Drop rows identical on every column, keeping the first occurrence and
/// the input order of survivors. Applying it twice changes nothing.
pub fn dedup_records(records: Vec<CleanRecord>) -> Vec<CleanRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    let keep: Vec<bool> = records.iter().map(|r| seen.insert(RowKey::from(r))).collect();
    drop(seen);
    records
        .into_iter()
        .zip(keep)
        .filter_map(|(record, first)| first.then_some(record))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, municipality: Option<&str>, price: f64) -> CleanRecord {
        CleanRecord {
            id: id.to_string(),
            scraping_date: "2021-05-01".to_string(),
            property_type: "house".to_string(),
            municipality: municipality.map(str::to_string),
            price,
            living_area: 100.0,
            price_per_area: price / 100.0,
        }
    }

    #[test]
    fn test_exact_duplicates_collapse() {
        let rows = vec![
            row("a", Some("Zug"), 900_000.0),
            row("a", Some("Zug"), 900_000.0),
            row("a", Some("Zug"), 900_000.0),
        ];
        assert_eq!(dedup_records(rows).len(), 1);
    }

    #[test]
    fn test_any_differing_column_survives() {
        let rows = vec![
            row("a", Some("Zug"), 900_000.0),
            row("b", Some("Zug"), 900_000.0),
            row("a", Some("Baar"), 900_000.0),
            row("a", None, 900_000.0),
            row("a", Some("Zug"), 900_100.0),
        ];
        assert_eq!(dedup_records(rows).len(), 5);
    }

    #[test]
    fn test_keeps_first_occurrence_order() {
        let rows = vec![
            row("c", Some("Zug"), 700_000.0),
            row("a", Some("Zug"), 900_000.0),
            row("c", Some("Zug"), 700_000.0),
            row("b", Some("Zug"), 800_000.0),
            row("a", Some("Zug"), 900_000.0),
        ];
        let ids: Vec<_> = dedup_records(rows).into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_idempotent() {
        let rows = vec![
            row("a", Some("Zug"), 900_000.0),
            row("b", Some("Zug"), 800_000.0),
            row("a", Some("Zug"), 900_000.0),
        ];
        let once = dedup_records(rows);
        let twice = dedup_records(once.clone());
        assert_eq!(once, twice);
    }
}
