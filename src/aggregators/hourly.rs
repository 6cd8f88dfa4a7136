use std::collections::BTreeMap;

use crate::models::Observation;

/// Mean AQI for one hour-of-day bucket
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyAverage {
    pub hour: u32,
    pub mean_aqi: f64,
}

/// Mean AQI per hour-of-day over observations with a derived AQI.
/// Observations without an AQI are excluded from both numerator and
/// denominator. Output rows cover only hours that actually contribute,
/// in ascending hour order; hours with no contributing observations are
/// omitted entirely.
pub fn hourly_average(observations: &[Observation]) -> Vec<HourlyAverage> {
    let mut buckets: BTreeMap<u32, (f64, usize)> = BTreeMap::new();

    for observation in observations {
        if let Some(aqi) = observation.aqi {
            let bucket = buckets.entry(observation.hour()).or_insert((0.0, 0));
            bucket.0 += aqi as f64;
            bucket.1 += 1;
        }
    }

    buckets
        .into_iter()
        .map(|(hour, (sum, count))| HourlyAverage {
            hour,
            mean_aqi: sum / count as f64,
        })
        .collect()
}
