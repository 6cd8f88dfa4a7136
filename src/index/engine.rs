use crate::index::breakpoints::{categorize, lookup_subindex};
use crate::models::{Observation, Pollutant};

/// Derives AQI values and severity categories for observations. Stateless
/// and purely functional: the same pollutant fields always produce the
/// same derived fields, so enrichment may run on any number of rows in
/// any order.
pub struct AqiEngine;

impl AqiEngine {
    pub fn new() -> Self {
        Self
    }

    /// Overall AQI for one observation: the maximum of the defined
    /// sub-indices across the eight pollutant fields in scan order.
    /// Absent concentrations and concentrations outside the breakpoint
    /// table contribute nothing. When no pollutant yields a sub-index
    /// the observation has no AQI; callers see an explicit `None` rather
    /// than a fabricated value.
    pub fn overall_index(&self, observation: &Observation) -> Option<u16> {
        Pollutant::ALL
            .iter()
            .filter_map(|pollutant| observation.concentration(*pollutant))
            .filter_map(lookup_subindex)
            .max()
    }

    /// Derive `aqi` and `aqi_category` from the pollutant fields,
    /// overwriting any previously derived values. Re-running on an
    /// already enriched observation reproduces identical output.
    pub fn enrich(&self, observation: &mut Observation) {
        observation.aqi = self.overall_index(observation);
        observation.aqi_category = observation
            .aqi
            .and_then(categorize)
            .map(str::to_string);
    }

    /// Sequentially enrich a batch of observations in place
    pub fn enrich_all(&self, observations: &mut [Observation]) {
        for observation in observations {
            self.enrich(observation);
        }
    }
}

impl Default for AqiEngine {
    fn default() -> Self {
        Self::new()
    }
}
