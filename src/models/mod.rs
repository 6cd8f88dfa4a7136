pub mod observation;
pub mod pollutant;

pub use observation::{parse_timestamp, Observation, ObservationBuilder};
pub use pollutant::Pollutant;
