//! Result tables produced by an analysis run.
//!
//! All tables keep the groups in order of first appearance in the dataset. They are plain data
//! meant to be rendered by the caller.

use crate::config::Center;
use crate::errors::AnalysisError;
use crate::testing::TTestType;
use crate::testing::correction::Correction;
use crate::testing::descriptive::DescriptiveStats;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptiveStatsTable {
    pub rows: Vec<DescriptiveStats>,
}

impl DescriptiveStatsTable {
    pub fn get(&self, label: &str) -> Option<&DescriptiveStats> {
        self.rows.iter().find(|r| r.label == label)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Shapiro-Wilk outcome for one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NormalityOutcome {
    Tested {
        statistic: f64,
        p_value: f64,
        is_normal: bool,
    },
    /// The group was too small for the test
    InsufficientSampleSize { observed: usize, required: usize },
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalityRow {
    pub label: String,
    #[serde(flatten)]
    pub outcome: NormalityOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalityReport {
    pub rows: Vec<NormalityRow>,
}

impl NormalityReport {
    pub fn get(&self, label: &str) -> Option<&NormalityOutcome> {
        self.rows
            .iter()
            .find(|r| r.label == label)
            .map(|r| &r.outcome)
    }

    /// `Some(true)` when every group looks normal; `None` if some group could not be tested.
    pub fn all_normal(&self) -> Option<bool> {
        self.rows.iter().try_fold(true, |acc, row| match row.outcome {
            NormalityOutcome::Tested { is_normal, .. } => Some(acc && is_normal),
            NormalityOutcome::InsufficientSampleSize { .. } | NormalityOutcome::Failed { .. } => {
                None
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomoskedasticityReport {
    pub statistic: f64,
    pub p_value: f64,
    pub equal_variance: bool,
    pub center: Center,
    pub df_between: usize,
    pub df_within: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OmnibusReport {
    pub statistic: f64,
    pub p_value: f64,
    pub all_means_equal: bool,
    pub df_between: usize,
    pub df_within: usize,
    pub ss_between: f64,
    pub ss_within: f64,
}

/// One ordered pair of the post-hoc table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairwiseComparison {
    pub group_a: String,
    pub group_b: String,
    pub statistic: f64,
    pub p_value: f64,
    /// Present when a multiple-comparison correction was requested
    pub adjusted_p_value: Option<f64>,
    pub degrees_of_freedom: Option<f64>,
    /// Cohen's d of A against B
    pub effect_size: Option<f64>,
    pub significantly_different: bool,
    pub higher_group: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairwiseReport {
    pub test_type: TTestType,
    pub correction: Correction,
    pub rows: Vec<PairwiseComparison>,
}

impl PairwiseReport {
    pub fn get(&self, group_a: &str, group_b: &str) -> Option<&PairwiseComparison> {
        self.rows
            .iter()
            .find(|r| r.group_a == group_a && r.group_b == group_b)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Report section a warning is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Selection,
    Descriptive,
    Normality,
    Homoskedasticity,
    Omnibus,
    Pairwise,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warning {
    pub section: Section,
    pub message: String,
    pub error: AnalysisError,
}

impl Warning {
    pub fn new(section: Section, error: AnalysisError) -> Self {
        Warning {
            section,
            message: error.to_string(),
            error,
        }
    }
}

/// Progress of a run; the last stage reached is recorded on the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Started,
    Validated,
    Described,
    AssumptionsChecked,
    OmnibusRun,
    PostHocRun,
    Done,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub group_variable: String,
    pub measure_variable: String,
    pub stage: Stage,
    pub descriptive: Option<DescriptiveStatsTable>,
    pub normality: Option<NormalityReport>,
    pub homoskedasticity: Option<HomoskedasticityReport>,
    pub omnibus: Option<OmnibusReport>,
    /// Only present when the omnibus test found a difference
    pub pairwise: Option<PairwiseReport>,
    /// The error that stopped the run, if any
    pub error: Option<AnalysisError>,
    pub warnings: Vec<Warning>,
}

impl AnalysisReport {
    pub(crate) fn new(group_variable: &str, measure_variable: &str) -> Self {
        AnalysisReport {
            group_variable: group_variable.to_string(),
            measure_variable: measure_variable.to_string(),
            stage: Stage::Started,
            descriptive: None,
            normality: None,
            homoskedasticity: None,
            omnibus: None,
            pairwise: None,
            error: None,
            warnings: Vec::new(),
        }
    }

    /// Whether the run reached the end without an aborting error.
    pub fn is_complete(&self) -> bool {
        self.stage == Stage::Done && self.error.is_none()
    }

    pub fn warnings_for(&self, section: Section) -> impl Iterator<Item = &Warning> {
        self.warnings.iter().filter(move |w| w.section == section)
    }
}
