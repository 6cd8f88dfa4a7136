/// Concentration breakpoints, scanned in order; the first range with
/// `low <= concentration <= high` wins. The table is shared by all eight
/// pollutants. Note the open gap between 12.0 and 12.1: concentrations
/// falling strictly inside it match no range, as do negative values and
/// anything above 500.4. Downstream consumers rely on that behavior, so
/// the bounds must stay exactly as listed.
pub const AQI_BREAKPOINTS: [(f64, f64, u16); 7] = [
    (0.0, 12.0, 50),
    (12.1, 35.4, 100),
    (35.5, 55.4, 150),
    (55.5, 150.4, 200),
    (150.5, 250.4, 300),
    (250.5, 350.4, 400),
    (350.5, 500.4, 500),
];

/// AQI severity categories, scanned in order with the same
/// first-match-wins rule.
pub const AQI_CATEGORIES: [(u16, u16, &str); 6] = [
    (0, 50, "Good"),
    (51, 100, "Moderate"),
    (101, 150, "Unhealthy for Sensitive Groups"),
    (151, 200, "Unhealthy"),
    (201, 300, "Very Unhealthy"),
    (301, 500, "Hazardous"),
];

/// Sub-index for a single pollutant concentration, or `None` when the
/// concentration matches no breakpoint range.
pub fn lookup_subindex(concentration: f64) -> Option<u16> {
    for (low, high, index) in AQI_BREAKPOINTS {
        if low <= concentration && concentration <= high {
            return Some(index);
        }
    }
    None
}

/// Severity label for an overall AQI value, or `None` for values outside
/// the category table.
pub fn categorize(aqi: u16) -> Option<&'static str> {
    for (low, high, label) in AQI_CATEGORIES {
        if low <= aqi && aqi <= high {
            return Some(label);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subindex_in_range() {
        assert_eq!(lookup_subindex(0.0), Some(50));
        assert_eq!(lookup_subindex(5.0), Some(50));
        assert_eq!(lookup_subindex(12.0), Some(50));
        assert_eq!(lookup_subindex(12.1), Some(100));
        assert_eq!(lookup_subindex(35.4), Some(100));
        assert_eq!(lookup_subindex(35.5), Some(150));
        assert_eq!(lookup_subindex(55.5), Some(200));
        assert_eq!(lookup_subindex(150.4), Some(200));
        assert_eq!(lookup_subindex(150.5), Some(300));
        assert_eq!(lookup_subindex(250.5), Some(400));
        assert_eq!(lookup_subindex(350.5), Some(500));
        assert_eq!(lookup_subindex(500.4), Some(500));
    }

    #[test]
    fn test_subindex_gap_is_unmatched() {
        assert_eq!(lookup_subindex(12.05), None);
        assert_eq!(lookup_subindex(12.099), None);
    }

    #[test]
    fn test_subindex_out_of_range() {
        assert_eq!(lookup_subindex(-0.1), None);
        assert_eq!(lookup_subindex(500.5), None);
        assert_eq!(lookup_subindex(1000.0), None);
        assert_eq!(lookup_subindex(f64::NAN), None);
        assert_eq!(lookup_subindex(f64::INFINITY), None);
    }

    #[test]
    fn test_every_breakpoint_yields_its_own_index() {
        for (low, high, index) in AQI_BREAKPOINTS {
            assert_eq!(lookup_subindex(low), Some(index));
            assert_eq!(lookup_subindex(high), Some(index));
        }
    }

    #[test]
    fn test_categorize_boundaries() {
        let cases = [
            (0, "Good"),
            (50, "Good"),
            (51, "Moderate"),
            (100, "Moderate"),
            (101, "Unhealthy for Sensitive Groups"),
            (150, "Unhealthy for Sensitive Groups"),
            (151, "Unhealthy"),
            (200, "Unhealthy"),
            (201, "Very Unhealthy"),
            (300, "Very Unhealthy"),
            (301, "Hazardous"),
            (500, "Hazardous"),
        ];
        for (aqi, expected) in cases {
            assert_eq!(categorize(aqi), Some(expected));
        }
    }

    #[test]
    fn test_categorize_out_of_range() {
        assert_eq!(categorize(501), None);
        assert_eq!(categorize(u16::MAX), None);
    }
}
