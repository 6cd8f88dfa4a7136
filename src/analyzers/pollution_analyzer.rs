use chrono::NaiveDateTime;

use crate::error::{ProcessingError, Result};
use crate::index::AQI_CATEGORIES;
use crate::models::{Observation, Pollutant};

/// Descriptive statistics for one pollutant column, computed over the
/// rows where the concentration is present.
#[derive(Debug, Clone)]
pub struct PollutantStats {
    pub pollutant: Pollutant,
    pub count: usize,
    pub mean: Option<f64>,
    pub std_dev: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct CategoryCount {
    pub label: &'static str,
    pub count: usize,
}

#[derive(Debug)]
pub struct PollutionStatistics {
    pub total_observations: usize,
    pub indexed_observations: usize,
    pub date_range: (NaiveDateTime, NaiveDateTime),
    pub pollutant_stats: Vec<PollutantStats>,
    pub category_counts: Vec<CategoryCount>,
    /// Share of the summed concentration mass contributed by each
    /// pollutant, in scan order
    pub concentration_shares: Vec<(Pollutant, f64)>,
}

pub struct PollutionAnalyzer;

impl PollutionAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, observations: &[Observation]) -> Result<PollutionStatistics> {
        if observations.is_empty() {
            return Err(ProcessingError::Config(
                "No observations to analyze".to_string(),
            ));
        }

        let mut min_date = observations[0].date;
        let mut max_date = observations[0].date;
        for observation in observations {
            if observation.date < min_date {
                min_date = observation.date;
            }
            if observation.date > max_date {
                max_date = observation.date;
            }
        }

        let pollutant_stats: Vec<PollutantStats> = Pollutant::ALL
            .iter()
            .map(|pollutant| self.pollutant_stats(*pollutant, observations))
            .collect();

        let category_counts = AQI_CATEGORIES
            .iter()
            .map(|&(_, _, label)| CategoryCount {
                label,
                count: observations
                    .iter()
                    .filter(|o| o.aqi_category.as_deref() == Some(label))
                    .count(),
            })
            .collect();

        let totals: Vec<(Pollutant, f64)> = Pollutant::ALL
            .iter()
            .map(|pollutant| {
                let total: f64 = observations
                    .iter()
                    .filter_map(|o| o.concentration(*pollutant))
                    .sum();
                (*pollutant, total)
            })
            .collect();
        let grand_total: f64 = totals.iter().map(|(_, total)| total).sum();
        let concentration_shares = totals
            .into_iter()
            .map(|(pollutant, total)| {
                let share = if grand_total > 0.0 {
                    total / grand_total
                } else {
                    0.0
                };
                (pollutant, share)
            })
            .collect();

        Ok(PollutionStatistics {
            total_observations: observations.len(),
            indexed_observations: observations.iter().filter(|o| o.is_indexed()).count(),
            date_range: (min_date, max_date),
            pollutant_stats,
            category_counts,
            concentration_shares,
        })
    }

    fn pollutant_stats(&self, pollutant: Pollutant, observations: &[Observation]) -> PollutantStats {
        let values: Vec<f64> = observations
            .iter()
            .filter_map(|o| o.concentration(pollutant))
            .collect();

        if values.is_empty() {
            return PollutantStats {
                pollutant,
                count: 0,
                mean: None,
                std_dev: None,
                min: None,
                max: None,
            };
        }

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        // Sample standard deviation, undefined for a single value
        let std_dev = if count > 1 {
            let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            Some((sum_sq / (count - 1) as f64).sqrt())
        } else {
            None
        };

        PollutantStats {
            pollutant,
            count,
            mean: Some(mean),
            std_dev,
            min: Some(min),
            max: Some(max),
        }
    }

    /// Pearson correlation between every pair of pollutant columns,
    /// computed over the rows where both concentrations are present.
    /// Pairs with no overlapping rows or zero variance yield NaN.
    pub fn correlation_matrix(&self, observations: &[Observation]) -> [[f64; 8]; 8] {
        let mut matrix = [[f64::NAN; 8]; 8];

        for (i, a) in Pollutant::ALL.iter().enumerate() {
            for (j, b) in Pollutant::ALL.iter().enumerate() {
                if j < i {
                    matrix[i][j] = matrix[j][i];
                    continue;
                }
                matrix[i][j] = pearson(observations, *a, *b);
            }
        }

        matrix
    }
}

fn pearson(observations: &[Observation], a: Pollutant, b: Pollutant) -> f64 {
    let pairs: Vec<(f64, f64)> = observations
        .iter()
        .filter_map(|o| Some((o.concentration(a)?, o.concentration(b)?)))
        .collect();

    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_a = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_b = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in &pairs {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    let denom = (var_a * var_b).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    cov / denom
}

impl PollutionStatistics {
    pub fn summary(&self) -> String {
        let indexed_pct =
            (self.indexed_observations as f64 / self.total_observations as f64) * 100.0;

        format!(
            "Observations: {} total ({:.1}% with a derived AQI)\n\
            Date Range: {} to {}\n\
            Dominant Pollutant (by concentration mass): {}",
            self.total_observations,
            indexed_pct,
            self.date_range.0,
            self.date_range.1,
            self.dominant_pollutant()
                .map(|p| p.display_name())
                .unwrap_or("none"),
        )
    }

    pub fn detailed_summary(&self) -> String {
        let mut lines = vec![self.summary(), String::new()];

        lines.push("Pollutant Concentrations (ug/m^3):".to_string());
        for stats in &self.pollutant_stats {
            match (stats.mean, stats.min, stats.max) {
                (Some(mean), Some(min), Some(max)) => {
                    let std_dev = stats
                        .std_dev
                        .map(|s| format!("{:.2}", s))
                        .unwrap_or_else(|| "n/a".to_string());
                    lines.push(format!(
                        "- {:>5}: n={}, mean={:.2}, std={}, min={:.2}, max={:.2}",
                        stats.pollutant.display_name(),
                        stats.count,
                        mean,
                        std_dev,
                        min,
                        max
                    ));
                }
                _ => {
                    lines.push(format!(
                        "- {:>5}: no measurements",
                        stats.pollutant.display_name()
                    ));
                }
            }
        }

        lines.push(String::new());
        lines.push("AQI Category Distribution:".to_string());
        for category in &self.category_counts {
            lines.push(format!("- {}: {}", category.label, category.count));
        }
        let uncategorized = self.total_observations - self.indexed_observations;
        if uncategorized > 0 {
            lines.push(format!("- (no AQI): {}", uncategorized));
        }

        lines.join("\n")
    }

    fn dominant_pollutant(&self) -> Option<Pollutant> {
        self.concentration_shares
            .iter()
            .filter(|(_, share)| *share > 0.0)
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(pollutant, _)| *pollutant)
    }
}

impl Default for PollutionAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::AqiEngine;
    use chrono::NaiveDate;

    fn observation(day: u32, co: Option<f64>, pm2_5: Option<f64>) -> Observation {
        let mut obs = Observation::new(
            NaiveDate::from_ymd_opt(2024, 3, day)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        );
        obs.co = co;
        obs.pm2_5 = pm2_5;
        obs
    }

    #[test]
    fn test_analyze_rejects_empty_input() {
        let analyzer = PollutionAnalyzer::new();
        assert!(analyzer.analyze(&[]).is_err());
    }

    #[test]
    fn test_pollutant_stats() {
        let analyzer = PollutionAnalyzer::new();
        let observations = vec![
            observation(1, Some(2.0), None),
            observation(2, Some(4.0), None),
            observation(3, Some(6.0), Some(30.0)),
        ];

        let stats = analyzer.analyze(&observations).unwrap();
        let co = &stats.pollutant_stats[0];
        assert_eq!(co.count, 3);
        assert_eq!(co.mean, Some(4.0));
        assert_eq!(co.min, Some(2.0));
        assert_eq!(co.max, Some(6.0));
        assert!((co.std_dev.unwrap() - 2.0).abs() < 1e-9);

        // nh3 has no measurements at all
        let nh3 = &stats.pollutant_stats[7];
        assert_eq!(nh3.count, 0);
        assert_eq!(nh3.mean, None);
    }

    #[test]
    fn test_category_distribution() {
        let engine = AqiEngine::new();
        let mut observations = vec![
            observation(1, Some(5.0), None),   // Good
            observation(2, Some(20.0), None),  // Moderate
            observation(3, Some(400.0), None), // Hazardous
            observation(4, None, None),        // no AQI
        ];
        engine.enrich_all(&mut observations);

        let analyzer = PollutionAnalyzer::new();
        let stats = analyzer.analyze(&observations).unwrap();

        assert_eq!(stats.indexed_observations, 3);
        assert_eq!(stats.category_counts[0].label, "Good");
        assert_eq!(stats.category_counts[0].count, 1);
        assert_eq!(stats.category_counts[1].count, 1);
        assert_eq!(stats.category_counts[5].count, 1);
        assert_eq!(stats.category_counts[3].count, 0);
    }

    #[test]
    fn test_concentration_shares_sum_to_one() {
        let analyzer = PollutionAnalyzer::new();
        let observations = vec![observation(1, Some(30.0), Some(10.0))];

        let stats = analyzer.analyze(&observations).unwrap();
        let total: f64 = stats
            .concentration_shares
            .iter()
            .map(|(_, share)| share)
            .sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert_eq!(stats.concentration_shares[0].1, 0.75);
    }

    #[test]
    fn test_correlation_matrix() {
        let analyzer = PollutionAnalyzer::new();
        // co and pm2_5 move in exact proportion, so their correlation is 1
        let observations = vec![
            observation(1, Some(1.0), Some(2.0)),
            observation(2, Some(2.0), Some(4.0)),
            observation(3, Some(3.0), Some(6.0)),
        ];

        let matrix = analyzer.correlation_matrix(&observations);
        let co = 0;
        let pm2_5 = 5;

        assert!((matrix[co][co] - 1.0).abs() < 1e-9);
        assert!((matrix[co][pm2_5] - 1.0).abs() < 1e-9);
        assert_eq!(matrix[co][pm2_5], matrix[pm2_5][co]);

        // no overlapping rows for pollutants never observed
        assert!(matrix[1][2].is_nan());
    }
}
