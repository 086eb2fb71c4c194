//! # group-statistics
//!
//! Comparison of a numeric measurement across the groups of a categorical variable.
//!
//! Given a tabular dataset, a grouping column and a measurement column, the crate decides whether
//! the groups differ in mean and, if they do, which pairs differ and which group of each pair is
//! higher. The analysis follows the classic parametric route: descriptive statistics, a
//! Shapiro-Wilk normality check per group, a Levene check for equal variances, a one-way ANOVA and
//! pairwise t-tests whose variance treatment follows the Levene outcome.
//!
//! ## Core Features
//!
//! - **Grouping**: Records are partitioned by label in order of first appearance
//! - **Assumption Checks**: Shapiro-Wilk (Royston) and Levene with mean, median or trimmed center
//! - **Hypothesis Tests**: One-way ANOVA, Student and Welch t-tests with Cohen's d
//! - **Multiple Testing Correction**: Optional Bonferroni, Holm or Benjamini-Hochberg over the
//!   pairwise family
//!
//! ## Quick Start
//!
//! Build a [`Dataset`], choose an [`AnalysisConfig`] and run an [`AnalysisPipeline`]. The
//! resulting [`AnalysisReport`] is plain data and serializes with serde.
//!
//! ## Module Organization
//!
//! - **[`data`]**: Dataset representation and grouping
//! - **[`testing`]**: Descriptive statistics, statistical tests and multiple testing correction
//! - **[`pipeline`]**: The orchestrated analysis, its report tables and a result cache
//! - **[`config`]**: Significance level and test options
//! - **[`errors`]**: Error taxonomy shared by all modules

pub mod config;
pub mod data;
pub mod errors;
pub mod pipeline;
pub mod testing;

pub use config::{AnalysisConfig, AnalysisConfigBuilder, Center};
pub use data::{Dataset, GroupedData, Value, group_by};
pub use errors::{AnalysisError, AnalysisResult};
pub use pipeline::{AnalysisCache, AnalysisPipeline, AnalysisReport};
