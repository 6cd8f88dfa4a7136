pub mod integrity_checker;
pub mod parallel_processor;

pub use integrity_checker::{
    IntegrityChecker, IntegrityReport, PollutantCoverage, UnindexedReason, UnindexedRow,
};
pub use parallel_processor::ParallelProcessor;
