use crate::config::Center;
use crate::data::GroupedData;
use crate::errors::{AnalysisError, AnalysisResult, TestKind};
use crate::testing::{AnovaResult, TTestType, TestResult};
use rayon::prelude::*;

pub mod normality;

pub mod parametric;

pub mod variance;

/// Outcome of one two-sample test between the groups at `first` and `second` (`first < second`).
#[derive(Debug, Clone, PartialEq)]
pub struct PairTest {
    pub first: usize,
    pub second: usize,
    pub result: TestResult,
}

/// Test routines over a set of groups.
pub trait GroupStatTests {
    /// Shapiro-Wilk per group, in group order. A failing group does not affect the others.
    fn shapiro_wilk_tests(&self) -> Vec<AnalysisResult<TestResult>>;

    fn levene_test(&self, center: Center, trim_proportion: f64) -> AnalysisResult<AnovaResult>;

    fn one_way_anova(&self) -> AnalysisResult<AnovaResult>;

    /// t-test for every unordered pair of groups, ordered by `(first, second)`.
    fn pairwise_t_tests(&self, test_type: TTestType) -> AnalysisResult<Vec<PairTest>>;
}

impl GroupStatTests for GroupedData {
    fn shapiro_wilk_tests(&self) -> Vec<AnalysisResult<TestResult>> {
        self.groups()
            .par_iter()
            .map(|g| normality::shapiro_wilk(&g.values).map_err(|e| e.for_group(&g.label)))
            .collect()
    }

    fn levene_test(&self, center: Center, trim_proportion: f64) -> AnalysisResult<AnovaResult> {
        let groups = self.groups();
        if let Some(small) = groups.iter().find(|g| g.len() < 2) {
            return Err(
                AnalysisError::insufficient(TestKind::Levene, small.len(), 2).for_group(&small.label),
            );
        }
        variance::levene(&self.samples(), center, trim_proportion)
    }

    fn one_way_anova(&self) -> AnalysisResult<AnovaResult> {
        self.validate()?;
        parametric::one_way_anova(&self.samples())
    }

    fn pairwise_t_tests(&self, test_type: TTestType) -> AnalysisResult<Vec<PairTest>> {
        let groups = self.groups();
        let pairs: Vec<(usize, usize)> = (0..groups.len())
            .flat_map(|i| (i + 1..groups.len()).map(move |j| (i, j)))
            .collect();

        pairs
            .into_par_iter()
            .map(|(first, second)| {
                let (a, b) = (&groups[first], &groups[second]);
                let result = parametric::t_test(&a.values, &b.values, test_type).map_err(|e| {
                    let culprit = if a.len() < 2 { &a.label } else { &b.label };
                    e.for_group(culprit)
                })?;
                Ok(PairTest {
                    first,
                    second,
                    result,
                })
            })
            .collect()
    }
}
