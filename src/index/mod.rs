pub mod breakpoints;
pub mod engine;

pub use breakpoints::{categorize, lookup_subindex, AQI_BREAKPOINTS, AQI_CATEGORIES};
pub use engine::AqiEngine;
