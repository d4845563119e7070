//! Batch analysis
//!
//! Runs many requests on a dedicated thread pool. The pool size is the
//! admission bound on concurrent backend calls.

use crate::application::dto::{AnalysisRequest, AnalysisResult};
use crate::application::AnalyzeImageUseCase;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use std::sync::Arc;

pub struct BatchAnalyzer {
    analyzer: Arc<AnalyzeImageUseCase>,
    pool: ThreadPool,
    max_batch_size: usize,
}

impl BatchAnalyzer {
    pub fn new(
        analyzer: Arc<AnalyzeImageUseCase>,
        max_batch_size: usize,
        concurrency: usize,
    ) -> Result<Self, ThreadPoolBuildError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(concurrency.max(1))
            .thread_name(|i| format!("pictriage-batch-{}", i))
            .build()?;

        Ok(Self {
            analyzer,
            pool,
            max_batch_size: max_batch_size.max(1),
        })
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    /// Analyzes up to `max_batch_size` requests; results keep input order
    pub fn run(&self, requests: &[AnalysisRequest]) -> Vec<AnalysisResult> {
        self.run_with_progress(requests, |_| {})
    }

    /// Like `run`, calling `on_done` as each result completes
    pub fn run_with_progress<F>(&self, requests: &[AnalysisRequest], on_done: F) -> Vec<AnalysisResult>
    where
        F: Fn(&AnalysisResult) + Sync,
    {
        let accepted = if requests.len() > self.max_batch_size {
            tracing::warn!(
                "Batch of {} exceeds limit of {}; analyzing the first {}",
                requests.len(),
                self.max_batch_size,
                self.max_batch_size
            );
            &requests[..self.max_batch_size]
        } else {
            requests
        };

        tracing::info!(
            "Starting batch of {} on {} threads",
            accepted.len(),
            self.pool.current_num_threads()
        );

        let results: Vec<AnalysisResult> = self.pool.install(|| {
            accepted
                .par_iter()
                .map(|request| {
                    let result = self.analyzer.execute(request);
                    on_done(&result);
                    result
                })
                .collect()
        });

        let succeeded = results.iter().filter(|r| r.is_success()).count();
        tracing::info!(
            "Batch complete: {}/{} succeeded",
            succeeded,
            results.len()
        );
        results
    }
}
