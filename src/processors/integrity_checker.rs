use chrono::NaiveDateTime;

use crate::error::Result;
use crate::index::{lookup_subindex, AQI_CATEGORIES};
use crate::models::{Observation, Pollutant};

#[derive(Debug, Clone)]
pub struct IntegrityReport {
    pub total_observations: usize,
    pub indexed_observations: usize,
    pub unindexed_observations: usize,
    pub unindexed_rows: Vec<UnindexedRow>,
    pub pollutant_coverage: Vec<PollutantCoverage>,
    pub category_counts: Vec<(&'static str, usize)>,
}

/// A row the index engine could not derive an AQI for
#[derive(Debug, Clone)]
pub struct UnindexedRow {
    pub date: NaiveDateTime,
    pub reason: UnindexedReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnindexedReason {
    AllFieldsAbsent,
    NoConcentrationInRange,
}

#[derive(Debug, Clone)]
pub struct PollutantCoverage {
    pub pollutant: Pollutant,
    /// Rows where the field is present and matches a breakpoint range
    pub indexed: usize,
    /// Rows where the field is present but matches no range
    pub out_of_range: usize,
    /// Rows where the field is absent
    pub absent: usize,
}

pub struct IntegrityChecker {
    max_reported_rows: usize,
}

impl IntegrityChecker {
    pub fn new() -> Self {
        Self {
            max_reported_rows: 100,
        }
    }

    pub fn with_max_reported_rows(mut self, max_reported_rows: usize) -> Self {
        self.max_reported_rows = max_reported_rows;
        self
    }

    /// Check enriched observations: how many carry a derived AQI, which
    /// rows have none and why, and how well each pollutant column is
    /// populated.
    pub fn check_integrity(&self, observations: &[Observation]) -> Result<IntegrityReport> {
        let mut indexed = 0;
        let mut unindexed_rows = Vec::new();

        let mut coverage: Vec<PollutantCoverage> = Pollutant::ALL
            .iter()
            .map(|pollutant| PollutantCoverage {
                pollutant: *pollutant,
                indexed: 0,
                out_of_range: 0,
                absent: 0,
            })
            .collect();

        for observation in observations {
            for entry in coverage.iter_mut() {
                match observation.concentration(entry.pollutant) {
                    Some(value) if lookup_subindex(value).is_some() => entry.indexed += 1,
                    Some(_) => entry.out_of_range += 1,
                    None => entry.absent += 1,
                }
            }

            if observation.is_indexed() {
                indexed += 1;
            } else if unindexed_rows.len() < self.max_reported_rows {
                let reason = if observation.has_any_concentration() {
                    UnindexedReason::NoConcentrationInRange
                } else {
                    UnindexedReason::AllFieldsAbsent
                };
                unindexed_rows.push(UnindexedRow {
                    date: observation.date,
                    reason,
                });
            }
        }

        let category_counts = AQI_CATEGORIES
            .iter()
            .map(|(_, _, label)| {
                let count = observations
                    .iter()
                    .filter(|o| o.aqi_category.as_deref() == Some(*label))
                    .count();
                (*label, count)
            })
            .collect();

        Ok(IntegrityReport {
            total_observations: observations.len(),
            indexed_observations: indexed,
            unindexed_observations: observations.len() - indexed,
            unindexed_rows,
            pollutant_coverage: coverage,
            category_counts,
        })
    }

    pub fn generate_summary(&self, report: &IntegrityReport) -> String {
        let indexed_pct = if report.total_observations > 0 {
            (report.indexed_observations as f64 / report.total_observations as f64) * 100.0
        } else {
            0.0
        };

        let mut lines = vec![
            "Integrity Report".to_string(),
            format!(
                "Observations: {} total, {} with AQI ({:.1}%), {} without",
                report.total_observations,
                report.indexed_observations,
                indexed_pct,
                report.unindexed_observations
            ),
        ];

        lines.push("Pollutant coverage:".to_string());
        for entry in &report.pollutant_coverage {
            lines.push(format!(
                "- {:>5}: {} indexed, {} out of range, {} absent",
                entry.pollutant.display_name(),
                entry.indexed,
                entry.out_of_range,
                entry.absent
            ));
        }

        lines.push("AQI categories:".to_string());
        for (label, count) in &report.category_counts {
            lines.push(format!("- {}: {}", label, count));
        }

        if !report.unindexed_rows.is_empty() {
            lines.push(format!(
                "First {} rows without an AQI:",
                report.unindexed_rows.len()
            ));
            for row in &report.unindexed_rows {
                let reason = match row.reason {
                    UnindexedReason::AllFieldsAbsent => "all pollutant fields absent",
                    UnindexedReason::NoConcentrationInRange => "no concentration in range",
                };
                lines.push(format!("- {}: {}", row.date, reason));
            }
        }

        lines.join("\n")
    }
}

impl Default for IntegrityChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::AqiEngine;
    use chrono::NaiveDate;

    fn observation(hour: u32) -> Observation {
        Observation::new(
            NaiveDate::from_ymd_opt(2024, 6, 10)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
        )
    }

    #[test]
    fn test_counts_indexed_and_unindexed() {
        let engine = AqiEngine::new();
        let mut good = observation(0);
        good.co = Some(5.0);
        let empty = observation(1);
        let mut out_of_range = observation(2);
        out_of_range.no2 = Some(800.0);

        let mut observations = vec![good, empty, out_of_range];
        engine.enrich_all(&mut observations);

        let checker = IntegrityChecker::new();
        let report = checker.check_integrity(&observations).unwrap();

        assert_eq!(report.total_observations, 3);
        assert_eq!(report.indexed_observations, 1);
        assert_eq!(report.unindexed_observations, 2);
        assert_eq!(report.unindexed_rows.len(), 2);
        assert_eq!(
            report.unindexed_rows[0].reason,
            UnindexedReason::AllFieldsAbsent
        );
        assert_eq!(
            report.unindexed_rows[1].reason,
            UnindexedReason::NoConcentrationInRange
        );
    }

    #[test]
    fn test_pollutant_coverage() {
        let engine = AqiEngine::new();
        let mut a = observation(0);
        a.co = Some(5.0);
        a.no = Some(700.0);
        let mut b = observation(1);
        b.co = Some(40.0);

        let mut observations = vec![a, b];
        engine.enrich_all(&mut observations);

        let checker = IntegrityChecker::new();
        let report = checker.check_integrity(&observations).unwrap();

        let co = &report.pollutant_coverage[0];
        assert_eq!(co.indexed, 2);
        assert_eq!(co.out_of_range, 0);
        assert_eq!(co.absent, 0);

        let no = &report.pollutant_coverage[1];
        assert_eq!(no.indexed, 0);
        assert_eq!(no.out_of_range, 1);
        assert_eq!(no.absent, 1);
    }

    #[test]
    fn test_reported_rows_are_capped() {
        let engine = AqiEngine::new();
        let mut observations: Vec<Observation> = (0..10).map(observation).collect();
        engine.enrich_all(&mut observations);

        let checker = IntegrityChecker::new().with_max_reported_rows(3);
        let report = checker.check_integrity(&observations).unwrap();

        assert_eq!(report.unindexed_observations, 10);
        assert_eq!(report.unindexed_rows.len(), 3);
    }
}
