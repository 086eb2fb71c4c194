//! Levene test for equality of variances across groups.

use crate::config::Center;
use crate::errors::{AnalysisError, AnalysisResult, TestKind};
use crate::testing::AnovaResult;
use crate::testing::inference::parametric::one_way_anova;
use crate::testing::utils::{mean, median_sorted, sorted, trim_count};

/// Levene's test that all groups share one variance.
///
/// Each observation is replaced by its absolute deviation from the group's center and a
/// one-way ANOVA is run on those deviations; its F statistic is Levene's W. With
/// [`Center::Trimmed`] every sample is first trimmed by `floor(trim_proportion * n)`
/// observations at each end, and the trimmed sample supplies both the center and the
/// deviations.
///
/// Every group needs at least two observations.
pub fn levene(
    groups: &[&[f64]],
    center: Center,
    trim_proportion: f64,
) -> AnalysisResult<AnovaResult> {
    if let Some(small) = groups.iter().find(|g| g.len() < 2) {
        return Err(AnalysisError::insufficient(TestKind::Levene, small.len(), 2));
    }

    let deviations = groups
        .iter()
        .map(|g| absolute_deviations(g, center, trim_proportion))
        .collect::<AnalysisResult<Vec<_>>>()?;
    let views: Vec<&[f64]> = deviations.iter().map(Vec::as_slice).collect();

    one_way_anova(&views)
}

fn absolute_deviations(
    values: &[f64],
    center: Center,
    trim_proportion: f64,
) -> AnalysisResult<Vec<f64>> {
    let (sample, location) = match center {
        Center::Mean => (values.to_vec(), mean(values)),
        Center::Median => (values.to_vec(), median_sorted(&sorted(values))),
        Center::Trimmed => {
            let trimmed = trim_both(values, trim_proportion)?;
            let location = mean(&trimmed);
            (trimmed, location)
        }
    };
    Ok(sample.iter().map(|&v| (v - location).abs()).collect())
}

/// Sort the sample and drop `floor(proportion * n)` observations from each end.
pub fn trim_both(values: &[f64], proportion: f64) -> AnalysisResult<Vec<f64>> {
    let n = values.len();
    let cut = trim_count(n, proportion);
    if cut * 2 >= n {
        return Err(AnalysisError::TrimTooLarge {
            proportion,
            observed: n,
        });
    }
    let sorted = sorted(values);
    Ok(sorted[cut..n - cut].to_vec())
}
