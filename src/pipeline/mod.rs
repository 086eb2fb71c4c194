//! Orchestration of a full group comparison.
//!
//! A run moves through `Validated → Described → AssumptionsChecked → OmnibusRun` and then either
//! finishes or runs the pairwise post-hoc tests first:
//!
//! 1. the selection is validated and the dataset grouped,
//! 2. descriptive statistics are computed per group,
//! 3. normality (per group) and equal variance (across groups) are checked,
//! 4. the one-way ANOVA decides whether post-hoc comparisons are needed,
//! 5. every ordered pair of groups is compared with a t-test whose variance treatment follows
//!    the equal-variance check.
//!
//! Every step is a deterministic computation over data already in memory; nothing is retried.
//! [`AnalysisPipeline::run`] turns failures into warnings on the report, while
//! [`AnalysisPipeline::try_run`] returns the first failure as an error.

use crate::config::AnalysisConfig;
use crate::data::{Dataset, GroupedData, group_by, validate_selection};
use crate::errors::{AnalysisError, AnalysisResult};
use crate::testing::TTestType;
use crate::testing::descriptive::describe;
use crate::testing::inference::{GroupStatTests, PairTest};
use log::{debug, warn};

pub mod cache;
pub mod report;

pub use cache::AnalysisCache;
pub use report::{
    AnalysisReport, DescriptiveStatsTable, HomoskedasticityReport, NormalityOutcome,
    NormalityReport, NormalityRow, OmnibusReport, PairwiseComparison, PairwiseReport, Section,
    Stage, Warning,
};

/// Runs the analysis of one dataset under one configuration.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisPipeline<'a> {
    dataset: &'a Dataset,
    config: &'a AnalysisConfig,
}

type StepResult<T> = Result<T, (Section, AnalysisError)>;

fn at<T>(section: Section, result: AnalysisResult<T>) -> StepResult<T> {
    result.map_err(|e| (section, e))
}

impl<'a> AnalysisPipeline<'a> {
    pub fn new(dataset: &'a Dataset, config: &'a AnalysisConfig) -> Self {
        AnalysisPipeline { dataset, config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        self.config
    }

    /// Run the analysis, recording any failure on the report instead of returning it.
    ///
    /// The report always carries the sections computed before the failure.
    pub fn run(&self, group_variable: &str, measure_variable: &str) -> AnalysisReport {
        let mut report = AnalysisReport::new(group_variable, measure_variable);
        if let Err((section, error)) = self.execute(&mut report) {
            warn!(
                "Analysis of '{}' by '{}' stopped at {:?}: {}",
                measure_variable, group_variable, report.stage, error
            );
            report.warnings.push(Warning::new(section, error.clone()));
            report.error = Some(error);
        }
        report
    }

    /// Run the analysis and return the first aborting error.
    ///
    /// Non-aborting conditions (a group too small for the normality check) are still reported
    /// as warnings on an `Ok` report.
    pub fn try_run(
        &self,
        group_variable: &str,
        measure_variable: &str,
    ) -> AnalysisResult<AnalysisReport> {
        let mut report = AnalysisReport::new(group_variable, measure_variable);
        self.execute(&mut report).map_err(|(_, e)| e)?;
        Ok(report)
    }

    fn execute(&self, report: &mut AnalysisReport) -> StepResult<()> {
        let alpha = self.config.alpha();

        at(
            Section::Selection,
            validate_selection(&report.group_variable, &report.measure_variable),
        )?;
        let grouped = at(
            Section::Selection,
            group_by(self.dataset, &report.group_variable, &report.measure_variable),
        )?;
        report.stage = Stage::Validated;
        debug!(
            "Comparing '{}' across {} group(s) of '{}'",
            report.measure_variable,
            grouped.len(),
            report.group_variable
        );

        let descriptive = describe_groups(&grouped);
        report.descriptive = Some(descriptive.clone());
        report.stage = Stage::Described;

        at(Section::Selection, grouped.validate())?;

        let normality = self.check_normality(&grouped, &mut report.warnings);
        report.normality = Some(normality);

        let levene = at(
            Section::Homoskedasticity,
            grouped.levene_test(self.config.center(), self.config.trim_proportion()),
        )?;
        let equal_variance = levene.p_value > alpha;
        report.homoskedasticity = Some(HomoskedasticityReport {
            statistic: levene.f_statistic,
            p_value: levene.p_value,
            equal_variance,
            center: self.config.center(),
            df_between: levene.df_between,
            df_within: levene.df_within,
        });
        report.stage = Stage::AssumptionsChecked;

        let anova = at(Section::Omnibus, grouped.one_way_anova())?;
        let all_means_equal = anova.p_value > alpha;
        report.omnibus = Some(OmnibusReport {
            statistic: anova.f_statistic,
            p_value: anova.p_value,
            all_means_equal,
            df_between: anova.df_between,
            df_within: anova.df_within,
            ss_between: anova.ss_between,
            ss_within: anova.ss_within,
        });
        report.stage = Stage::OmnibusRun;
        debug!(
            "Omnibus F = {:.4}, p = {:.4e}; post-hoc {}",
            anova.f_statistic,
            anova.p_value,
            if all_means_equal { "skipped" } else { "required" }
        );

        if !all_means_equal {
            let test_type = TTestType::for_equal_variance(equal_variance);
            let pairs = at(Section::Pairwise, grouped.pairwise_t_tests(test_type))?;
            let rows = at(
                Section::Pairwise,
                self.pairwise_rows(&grouped, &descriptive, &pairs),
            )?;
            report.pairwise = Some(PairwiseReport {
                test_type,
                correction: self.config.correction(),
                rows,
            });
            report.stage = Stage::PostHocRun;
        }

        report.stage = Stage::Done;
        Ok(())
    }

    fn check_normality(&self, grouped: &GroupedData, warnings: &mut Vec<Warning>) -> NormalityReport {
        let alpha = self.config.alpha();
        let rows = grouped
            .groups()
            .iter()
            .zip(grouped.shapiro_wilk_tests())
            .map(|(group, result)| {
                let outcome = match result {
                    Ok(r) => NormalityOutcome::Tested {
                        statistic: r.statistic,
                        p_value: r.p_value,
                        is_normal: r.p_value > alpha,
                    },
                    Err(error) => {
                        let outcome = match &error {
                            AnalysisError::InsufficientSampleSize {
                                observed, required, ..
                            } => NormalityOutcome::InsufficientSampleSize {
                                observed: *observed,
                                required: *required,
                            },
                            other => NormalityOutcome::Failed {
                                message: other.to_string(),
                            },
                        };
                        warn!("Normality check skipped: {error}");
                        warnings.push(Warning::new(Section::Normality, error));
                        outcome
                    }
                };
                NormalityRow {
                    label: group.label.clone(),
                    outcome,
                }
            })
            .collect();
        NormalityReport { rows }
    }

    fn pairwise_rows(
        &self,
        grouped: &GroupedData,
        descriptive: &DescriptiveStatsTable,
        pairs: &[PairTest],
    ) -> AnalysisResult<Vec<PairwiseComparison>> {
        let alpha = self.config.alpha();
        let p_values: Vec<f64> = pairs.iter().map(|p| p.result.p_value).collect();
        let adjusted = if pairs.is_empty() {
            None
        } else {
            self.config.correction().apply(&p_values)?
        };

        let groups = grouped.groups();
        let k = groups.len();
        debug_assert_eq!(pairs.len(), k * k.saturating_sub(1) / 2);
        let mut rows = Vec::with_capacity(k * k.saturating_sub(1));

        for i in 0..k {
            for j in (0..k).filter(|&j| j != i) {
                let idx = pair_index(k, i.min(j), i.max(j));
                let pair = &pairs[idx];
                // Statistic and effect size are antisymmetric in the pair order
                let sign = if i == pair.first { 1.0 } else { -1.0 };

                let group_a = &groups[i].label;
                let group_b = &groups[j].label;
                let adjusted_p_value = adjusted.as_ref().map(|a| a[idx]);
                let significantly_different = match adjusted_p_value {
                    Some(p) => p < alpha,
                    None => pair.result.is_significant(alpha),
                };

                rows.push(PairwiseComparison {
                    group_a: group_a.clone(),
                    group_b: group_b.clone(),
                    statistic: sign * pair.result.statistic,
                    p_value: pair.result.p_value,
                    adjusted_p_value,
                    degrees_of_freedom: pair.result.degrees_of_freedom,
                    effect_size: pair.result.effect_size.map(|d| sign * d),
                    significantly_different,
                    higher_group: higher_group(descriptive, group_a, group_b),
                });
            }
        }
        Ok(rows)
    }
}

/// Position of the unordered pair `(lo, hi)`, `lo < hi`, in the row-major list of all pairs
/// of `k` groups.
fn pair_index(k: usize, lo: usize, hi: usize) -> usize {
    lo * k - lo * (lo + 1) / 2 + (hi - lo - 1)
}

/// The group of the pair with the larger mean; equal means go to `group_b`.
fn higher_group(descriptive: &DescriptiveStatsTable, group_a: &str, group_b: &str) -> String {
    let mean_of = |label: &str| descriptive.get(label).map_or(f64::NAN, |s| s.mean);
    if mean_of(group_a) > mean_of(group_b) {
        group_a.to_string()
    } else {
        group_b.to_string()
    }
}

fn describe_groups(grouped: &GroupedData) -> DescriptiveStatsTable {
    DescriptiveStatsTable {
        rows: grouped
            .groups()
            .iter()
            .filter_map(|g| describe(&g.label, &g.values))
            .collect(),
    }
}
