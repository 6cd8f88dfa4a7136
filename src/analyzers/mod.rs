pub mod pollution_analyzer;

pub use pollution_analyzer::{
    CategoryCount, PollutantStats, PollutionAnalyzer, PollutionStatistics,
};
