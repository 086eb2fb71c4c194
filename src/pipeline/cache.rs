//! Memoization of analysis runs.
//!
//! A run is a pure function of the dataset, the selected variables and the configuration, so a
//! finished report can be handed out again for the same inputs. Reports are shared behind an
//! [`Arc`]; the cache never mutates them.

use crate::config::{AnalysisConfig, ConfigKey};
use crate::data::Dataset;
use crate::pipeline::AnalysisPipeline;
use crate::pipeline::report::AnalysisReport;
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    dataset: u64,
    group_variable: String,
    measure_variable: String,
    config: ConfigKey,
}

/// Thread-safe store of finished reports keyed by their inputs.
#[derive(Debug, Default)]
pub struct AnalysisCache {
    entries: Mutex<HashMap<CacheKey, Arc<AnalysisReport>>>,
}

impl AnalysisCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached report for these inputs, running the pipeline on a miss.
    ///
    /// The pipeline runs outside the lock; two threads missing on the same key may both compute
    /// it and the first insert wins.
    pub fn get_or_run(
        &self,
        dataset: &Dataset,
        config: &AnalysisConfig,
        group_variable: &str,
        measure_variable: &str,
    ) -> Arc<AnalysisReport> {
        let key = CacheKey {
            dataset: dataset.fingerprint(),
            group_variable: group_variable.to_string(),
            measure_variable: measure_variable.to_string(),
            config: config.key(),
        };

        if let Some(hit) = self.lock().get(&key) {
            debug!("Cache hit for '{measure_variable}' by '{group_variable}'");
            return Arc::clone(hit);
        }

        let report = Arc::new(
            AnalysisPipeline::new(dataset, config).run(group_variable, measure_variable),
        );
        Arc::clone(self.lock().entry(key).or_insert(report))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    // Entries are only ever inserted whole, so a poisoned map is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, Arc<AnalysisReport>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}
