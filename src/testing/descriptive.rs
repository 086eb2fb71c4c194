//! Per-group summary statistics.

use crate::testing::utils::{SampleMoments, median_sorted, sorted};
use serde::Serialize;

/// Summary of one group's measurements.
///
/// `std_dev` uses the sample (n - 1) convention and is `None` when the group has fewer than two
/// observations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptiveStats {
    pub label: String,
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: Option<f64>,
}

/// Summarize a non-empty sample. Returns `None` for an empty slice.
pub fn describe(label: &str, values: &[f64]) -> Option<DescriptiveStats> {
    if values.is_empty() {
        return None;
    }

    let sorted = sorted(values);
    let moments = SampleMoments::from_slice(values);

    Some(DescriptiveStats {
        label: label.to_string(),
        count: values.len(),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        mean: moments.mean,
        median: median_sorted(&sorted),
        std_dev: (moments.n >= 2).then(|| moments.variance.sqrt()),
    })
}
