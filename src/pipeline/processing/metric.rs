/// Round to 2 decimal places, ties to even on the scaled value.
///
/// `1000.125` becomes `1000.12` and `1000.375` becomes `1000.38`.
/// Non-finite input passes through unchanged.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Price per unit of living area, rounded with [`round2`].
///
/// Division by zero is not guarded: a zero area yields infinity (or NaN for
/// a zero price), which the quality gate rejects. A missing input yields
/// `None`.
pub fn price_per_area(price: Option<f64>, living_area: Option<f64>) -> Option<f64> {
    match (price, living_area) {
        (Some(price), Some(area)) => Some(round2(price / area)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_division() {
        assert_eq!(price_per_area(Some(1200.0), Some(60.0)), Some(20.0));
        assert_eq!(price_per_area(Some(900_000.0), Some(100.0)), Some(9000.0));
    }

    #[test]
    fn test_rounds_to_two_decimals() {
        assert_eq!(price_per_area(Some(1_000_000.0), Some(333.0)), Some(3003.0));
        assert_eq!(price_per_area(Some(500_000.0), Some(77.0)), Some(6493.51));
    }

    #[test]
    fn test_ties_round_to_even() {
        // 100012.5 / 100 is exactly 1000.125
        assert_eq!(price_per_area(Some(100_012.5), Some(100.0)), Some(1000.12));
        assert_eq!(round2(1000.375), 1000.38);
        assert_eq!(round2(0.125), 0.12);
    }

    #[test]
    fn test_zero_area_is_not_finite() {
        let v = price_per_area(Some(500_000.0), Some(0.0)).unwrap();
        assert!(v.is_infinite());
        let v = price_per_area(Some(0.0), Some(0.0)).unwrap();
        assert!(v.is_nan());
    }

    #[test]
    fn test_missing_inputs() {
        assert_eq!(price_per_area(None, Some(80.0)), None);
        assert_eq!(price_per_area(Some(400_000.0), None), None);
    }
}
