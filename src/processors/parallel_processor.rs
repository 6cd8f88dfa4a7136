use rayon::prelude::*;
use std::path::Path;
use tracing::{debug, info};

use crate::error::Result;
use crate::index::AqiEngine;
use crate::models::Observation;
use crate::processors::{IntegrityChecker, IntegrityReport};
use crate::readers::ObservationReader;
use crate::utils::constants::DEFAULT_CHUNK_SIZE;
use crate::utils::progress::ProgressReporter;

/// Reads an observation CSV, derives AQI values for every row, and
/// produces an integrity report. Enrichment is a per-row pure function,
/// so chunks run on a rayon pool without changing result ordering or
/// values relative to a sequential pass.
pub struct ParallelProcessor {
    max_workers: usize,
    chunk_size: usize,
    use_mmap: bool,
}

impl ParallelProcessor {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers,
            chunk_size: DEFAULT_CHUNK_SIZE,
            use_mmap: false,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    /// Read, enrich, and report on a full observation file
    pub async fn process_file(
        &self,
        path: &Path,
        progress: Option<&ProgressReporter>,
    ) -> Result<(Vec<Observation>, IntegrityReport)> {
        if let Some(p) = progress {
            p.set_message("Reading observations...");
        }

        let input = path.to_path_buf();
        let use_mmap = self.use_mmap;
        let mut observations = tokio::task::spawn_blocking(move || {
            ObservationReader::with_mmap(use_mmap).read_observations(&input)
        })
        .await??;
        info!(rows = observations.len(), "observations loaded");

        if let Some(p) = progress {
            p.set_message("Deriving AQI values...");
        }
        self.enrich_observations(&mut observations)?;

        if let Some(p) = progress {
            p.set_message("Checking data integrity...");
        }
        let checker = IntegrityChecker::new();
        let report = checker.check_integrity(&observations)?;
        debug!(
            indexed = report.indexed_observations,
            unindexed = report.unindexed_observations,
            "integrity check complete"
        );

        if let Some(p) = progress {
            p.finish_with_message("Processing complete");
        }

        Ok((observations, report))
    }

    /// Derive AQI values for a batch of observations in place
    pub fn enrich_observations(&self, observations: &mut [Observation]) -> Result<()> {
        let engine = AqiEngine::new();

        if self.max_workers <= 1 || observations.len() <= self.chunk_size {
            engine.enrich_all(observations);
            return Ok(());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| crate::error::ProcessingError::Config(e.to_string()))?;

        pool.install(|| {
            observations
                .par_chunks_mut(self.chunk_size)
                .for_each(|chunk| engine.enrich_all(chunk));
        });

        Ok(())
    }
}
