//! Parametric tests on group means.
//!
//! This module implements the two-sample t-test (pooled or Welch) used for pairwise post-hoc
//! comparisons and the one-way ANOVA F-test used as the omnibus comparison.

use crate::errors::{AnalysisError, AnalysisResult, TestKind};
use crate::testing::effect::cohens_d;
use crate::testing::utils::{SampleMoments, mean, sum_of_squares};
use crate::testing::{AnovaResult, TTestType, TestResult};
use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};

/// Perform a t-test comparing two samples.
///
/// This function performs either Student's t-test (assuming equal variances) or
/// Welch's t-test (allowing unequal variances) on two samples.
///
/// # Arguments
///
/// * `x` - First sample
/// * `y` - Second sample
/// * `test_type` - Type of t-test to perform
///
/// # Returns
///
/// `TestResult` containing the t-statistic, two-sided p-value, degrees of freedom and
/// Cohen's d of `x` against `y`.
pub fn t_test(x: &[f64], y: &[f64], test_type: TTestType) -> AnalysisResult<TestResult> {
    for sample in [x, y] {
        if sample.len() < 2 {
            return Err(AnalysisError::insufficient(TestKind::TTest, sample.len(), 2));
        }
    }

    let result = t_test_from_moments(
        &SampleMoments::from_slice(x),
        &SampleMoments::from_slice(y),
        test_type,
    )?;
    Ok(result.with_effect_size(cohens_d(x, y)))
}

/// Perform a t-test using precomputed summary statistics.
///
/// # Arguments
///
/// * `m1`, `m2` - Count, mean and sample variance of each group
/// * `test_type` - Type of t-test to perform (Student's or Welch's)
pub fn t_test_from_moments(
    m1: &SampleMoments,
    m2: &SampleMoments,
    test_type: TTestType,
) -> AnalysisResult<TestResult> {
    let n1 = m1.n as f64;
    let n2 = m2.n as f64;
    let mean_diff = m1.mean - m2.mean;

    let (std_err, df) = match test_type {
        TTestType::Student => {
            // Student's t-test (pooled variance)
            let pooled_var =
                ((n1 - 1.0) * m1.variance + (n2 - 1.0) * m2.variance) / (n1 + n2 - 2.0);
            ((pooled_var * (1.0 / n1 + 1.0 / n2)).sqrt(), n1 + n2 - 2.0)
        }
        TTestType::Welch => {
            let term1 = m1.variance / n1;
            let term2 = m2.variance / n2;
            let combined_var = term1 + term2;

            // Welch-Satterthwaite equation for degrees of freedom
            let df = combined_var * combined_var
                / (term1 * term1 / (n1 - 1.0) + term2 * term2 / (n2 - 1.0));
            (combined_var.sqrt(), df)
        }
    };

    let t_stat = mean_diff / std_err;
    let p_value = t_test_p_value(t_stat, df)?;

    Ok(TestResult::new(t_stat, p_value)
        .with_degrees_of_freedom(df)
        .with_standard_error(std_err))
}

/// Two-sided p-value of a t statistic.
fn t_test_p_value(t_stat: f64, df: f64) -> AnalysisResult<f64> {
    // Zero spread on both sides: a difference is certain, no difference is no evidence
    if !t_stat.is_finite() {
        return Ok(if t_stat.is_infinite() { 0.0 } else { 1.0 });
    }

    if df <= 0.0 || !df.is_finite() {
        return Ok(1.0);
    }

    let t_dist = StudentsT::new(0.0, 1.0, df).map_err(AnalysisError::distribution)?;
    Ok((2.0 * t_dist.sf(t_stat.abs())).min(1.0))
}

/// One-way ANOVA testing that all group means are equal.
///
/// Requires at least two groups, no empty group and more observations than groups. When every
/// group is constant the F statistic is +inf (p = 0), or NaN if the group means also coincide.
pub fn one_way_anova(groups: &[&[f64]]) -> AnalysisResult<AnovaResult> {
    let k = groups.len();
    if k < 2 {
        return Err(AnalysisError::SingleGroup {
            variable: String::new(),
            found: k,
        });
    }
    if let Some(empty) = groups.iter().find(|g| g.is_empty()) {
        return Err(AnalysisError::insufficient(TestKind::Anova, empty.len(), 1));
    }

    let n_total: usize = groups.iter().map(|g| g.len()).sum();
    if n_total <= k {
        return Err(AnalysisError::insufficient(TestKind::Anova, n_total, k + 1));
    }

    let grand_mean = groups.iter().flat_map(|g| g.iter()).sum::<f64>() / n_total as f64;

    let ss_between: f64 = groups
        .iter()
        .map(|g| {
            let d = mean(g) - grand_mean;
            g.len() as f64 * d * d
        })
        .sum();
    let ss_within: f64 = groups.iter().map(|g| sum_of_squares(g)).sum();

    let df_between = k - 1;
    let df_within = n_total - k;

    let f_statistic =
        (ss_between / df_between as f64) / (ss_within / df_within as f64);
    let p_value = f_test_p_value(f_statistic, df_between, df_within)?;

    Ok(AnovaResult {
        f_statistic,
        p_value,
        df_between,
        df_within,
        ss_between,
        ss_within,
    })
}

/// Upper-tail probability of an F statistic.
pub(crate) fn f_test_p_value(f: f64, df1: usize, df2: usize) -> AnalysisResult<f64> {
    if f.is_nan() {
        return Ok(f64::NAN);
    }
    if f.is_infinite() {
        return Ok(0.0);
    }
    let dist =
        FisherSnedecor::new(df1 as f64, df2 as f64).map_err(AnalysisError::distribution)?;
    Ok(dist.sf(f.max(0.0)).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_student_t_known_values() {
        // Group 1: [1, 2, 3], group 2: [7, 8, 9]; pooled variance 1, t = -6 / sqrt(2/3)
        let r = t_test(&[1.0, 2.0, 3.0], &[7.0, 8.0, 9.0], TTestType::Student).unwrap();
        assert_relative_eq!(r.statistic, -7.348469228349534, epsilon = 1e-10);
        assert_relative_eq!(r.degrees_of_freedom.unwrap(), 4.0);
        assert!(r.p_value < 0.01);
        assert!(r.p_value > 0.001);
    }

    #[test]
    fn test_welch_df() {
        let x = [19.8, 20.4, 19.6, 17.8, 18.5, 18.9, 18.3, 18.9, 19.5, 22.0];
        let y = [28.2, 26.6, 20.1, 23.3, 25.2, 22.1, 17.7, 27.6, 20.6, 13.7];
        let r = t_test(&x, &y, TTestType::Welch).unwrap();
        let student = t_test(&x, &y, TTestType::Student).unwrap();

        // Equal sizes: same statistic, fewer degrees of freedom
        assert_relative_eq!(r.statistic, student.statistic, epsilon = 1e-12);
        assert!(r.degrees_of_freedom.unwrap() < 18.0);
        assert!(r.p_value > student.p_value);
    }

    #[test]
    fn test_identical_groups() {
        let r = t_test(&[5.0, 6.0, 7.0], &[5.0, 6.0, 7.0], TTestType::Student).unwrap();
        assert_relative_eq!(r.statistic, 0.0);
        assert_relative_eq!(r.p_value, 1.0);
    }

    #[test]
    fn test_constant_groups() {
        let same = t_test(&[5.0, 5.0, 5.0], &[5.0, 5.0], TTestType::Welch).unwrap();
        assert!(same.statistic.is_nan());
        assert_relative_eq!(same.p_value, 1.0);

        let apart = t_test(&[5.0, 5.0, 5.0], &[8.0, 8.0], TTestType::Student).unwrap();
        assert!(apart.statistic.is_infinite());
        assert_relative_eq!(apart.p_value, 0.0);
    }

    #[test]
    fn test_t_test_needs_two_observations() {
        let err = t_test(&[1.0], &[2.0, 3.0], TTestType::Student).unwrap_err();
        assert_eq!(err, AnalysisError::insufficient(TestKind::TTest, 1, 2));
    }

    #[test]
    fn test_anova_known_values() {
        let a = [6.0, 8.0, 4.0, 5.0, 3.0, 4.0];
        let b = [8.0, 12.0, 9.0, 11.0, 6.0, 8.0];
        let c = [13.0, 9.0, 11.0, 8.0, 7.0, 12.0];
        let r = one_way_anova(&[&a, &b, &c]).unwrap();

        assert_eq!(r.df_between, 2);
        assert_eq!(r.df_within, 15);
        assert_relative_eq!(r.ss_between, 84.0, epsilon = 1e-9);
        assert_relative_eq!(r.ss_within, 68.0, epsilon = 1e-9);
        assert_relative_eq!(r.f_statistic, 9.264705882352942, epsilon = 1e-9);
        assert!(r.p_value < 0.01 && r.p_value > 0.001);
    }

    #[test]
    fn test_anova_two_groups_matches_student() {
        let x = [10.0, 12.0, 11.0, 13.0, 9.0];
        let y = [12.0, 14.0, 12.5, 15.0, 13.0];
        let anova = one_way_anova(&[&x, &y]).unwrap();
        let t = t_test(&x, &y, TTestType::Student).unwrap();

        assert_relative_eq!(anova.f_statistic, t.statistic * t.statistic, epsilon = 1e-9);
        assert_relative_eq!(anova.p_value, t.p_value, epsilon = 1e-9);
    }

    #[test]
    fn test_anova_errors() {
        assert!(matches!(
            one_way_anova(&[&[1.0, 2.0]]),
            Err(AnalysisError::SingleGroup { found: 1, .. })
        ));
        assert!(matches!(
            one_way_anova(&[&[1.0], &[2.0]]),
            Err(AnalysisError::InsufficientSampleSize { .. })
        ));
        assert!(one_way_anova(&[&[1.0, 2.0], &[]]).is_err());
    }

    #[test]
    fn test_anova_constant_groups() {
        let r = one_way_anova(&[&[1.0, 1.0], &[2.0, 2.0]]).unwrap();
        assert!(r.f_statistic.is_infinite());
        assert_relative_eq!(r.p_value, 0.0);

        let r = one_way_anova(&[&[1.0, 1.0], &[1.0, 1.0]]).unwrap();
        assert!(r.f_statistic.is_nan());
        assert!(r.p_value.is_nan());
    }
}
