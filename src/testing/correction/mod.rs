use crate::errors::{AnalysisError, AnalysisResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Multiple testing correction methods to control for false positives
/// when performing many statistical tests simultaneously.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Correction {
    /// Raw p-values, no family-wise adjustment
    #[default]
    None,
    Bonferroni,
    Holm,
    BenjaminiHochberg,
}

impl Correction {
    /// Adjust a family of p-values. `Ok(None)` when no correction is configured.
    pub fn apply(&self, p_values: &[f64]) -> AnalysisResult<Option<Vec<f64>>> {
        match self {
            Correction::None => Ok(None),
            Correction::Bonferroni => bonferroni_correction(p_values).map(Some),
            Correction::Holm => holm_bonferroni_correction(p_values).map(Some),
            Correction::BenjaminiHochberg => benjamini_hochberg_correction(p_values).map(Some),
        }
    }
}

fn validate_p_values(p_values: &[f64]) -> AnalysisResult<()> {
    if p_values.is_empty() {
        return Err(AnalysisError::EmptyPValues);
    }
    for (index, &value) in p_values.iter().enumerate() {
        if !(0.0..=1.0).contains(&value) {
            return Err(AnalysisError::InvalidPValue { index, value });
        }
    }
    Ok(())
}

fn sorted_by_p_value(p_values: &[f64]) -> Vec<(usize, f64)> {
    let mut indexed: Vec<(usize, f64)> = p_values.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
    indexed
}

/// Apply Bonferroni correction to p-values
///
/// Bonferroni correction is a simple but conservative method that multiplies
/// each p-value by the number of tests.
pub fn bonferroni_correction(p_values: &[f64]) -> AnalysisResult<Vec<f64>> {
    validate_p_values(p_values)?;
    let n = p_values.len() as f64;

    // Multiply each p-value by n, capping at 1.0
    Ok(p_values.iter().map(|&p| (p * n).min(1.0)).collect())
}

/// Apply Holm-Bonferroni (step-down) method for controlling family-wise error rate
///
/// The Holm procedure multiplies the i-th smallest p-value by `n - i` and enforces
/// monotonicity with a running maximum. It is uniformly more powerful than Bonferroni.
pub fn holm_bonferroni_correction(p_values: &[f64]) -> AnalysisResult<Vec<f64>> {
    validate_p_values(p_values)?;
    let n = p_values.len();

    let mut adjusted_p_values = vec![0.0; n];
    let mut running_max: f64 = 0.0;
    for (rank, (orig_idx, p_val)) in sorted_by_p_value(p_values).into_iter().enumerate() {
        let adjustment = (p_val * (n - rank) as f64).min(1.0);
        running_max = running_max.max(adjustment);
        adjusted_p_values[orig_idx] = running_max;
    }

    Ok(adjusted_p_values)
}

/// Apply Benjamini-Hochberg (BH) procedure for controlling false discovery rate
///
/// The BH procedure controls the false discovery rate (FDR), which is the expected
/// proportion of false positives among all rejected null hypotheses.
pub fn benjamini_hochberg_correction(p_values: &[f64]) -> AnalysisResult<Vec<f64>> {
    validate_p_values(p_values)?;
    let n = p_values.len();
    let indexed_p_values = sorted_by_p_value(p_values);

    let mut adjusted_p_values = vec![0.0; n];
    let mut current_min = 1.0;

    // Process from largest to smallest p-value
    for i in (0..n).rev() {
        let (orig_idx, p_val) = indexed_p_values[i];
        let rank = i + 1;

        let adjustment = (p_val * n as f64 / rank as f64).min(1.0);
        current_min = adjustment.min(current_min);
        adjusted_p_values[orig_idx] = current_min;
    }

    Ok(adjusted_p_values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_vec_relative_eq(a: &[f64], b: &[f64], epsilon: f64) {
        assert_eq!(a.len(), b.len(), "Vectors have different lengths");
        for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
            if (x - y).abs() > epsilon {
                panic!("Vectors differ at index {}: {} != {}", i, x, y);
            }
        }
    }

    #[test]
    fn test_bonferroni() {
        let p_values = vec![0.01, 0.02, 0.03, 0.1, 0.2];
        let expected = vec![0.05, 0.1, 0.15, 0.5, 1.0];
        let adjusted = bonferroni_correction(&p_values).unwrap();
        assert_vec_relative_eq(&adjusted, &expected, 1e-10);
    }

    #[test]
    fn test_holm_bonferroni() {
        let p_values = vec![0.01, 0.02, 0.03];
        let expected = vec![0.03, 0.04, 0.04];
        let adjusted = holm_bonferroni_correction(&p_values).unwrap();
        assert_vec_relative_eq(&adjusted, &expected, 1e-10);
    }

    #[test]
    fn test_holm_unordered_input() {
        let p_values = vec![0.04, 0.001, 0.5, 0.02];
        let expected = vec![0.08, 0.004, 0.5, 0.06];
        let adjusted = holm_bonferroni_correction(&p_values).unwrap();
        assert_vec_relative_eq(&adjusted, &expected, 1e-10);
    }

    #[test]
    fn test_benjamini_hochberg_unordered_pvalues() {
        let p_values = vec![0.05, 0.01, 0.1, 0.04, 0.02];
        let expected = vec![0.0625, 0.05, 0.1, 0.0625, 0.05];
        let adjusted = benjamini_hochberg_correction(&p_values).unwrap();
        assert_vec_relative_eq(&adjusted, &expected, 1e-10);
    }

    #[test]
    fn test_benjamini_hochberg_real_example() {
        let pvalues = vec![0.1, 0.2, 0.3, 0.4, 0.1];
        let expected = [0.25, 0.3333333333333333, 0.375, 0.4, 0.25];
        let adjusted = benjamini_hochberg_correction(&pvalues).unwrap();

        for (a, e) in adjusted.iter().zip(expected.iter()) {
            assert_relative_eq!(*a, *e, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_correction_enum() {
        assert_eq!(Correction::None.apply(&[0.01, 0.2]).unwrap(), None);
        assert_eq!(
            Correction::Bonferroni.apply(&[0.01, 0.2]).unwrap(),
            Some(vec![0.02, 0.4])
        );
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(bonferroni_correction(&[]), Err(AnalysisError::EmptyPValues));
        assert!(benjamini_hochberg_correction(&[]).is_err());
        assert!(holm_bonferroni_correction(&[]).is_err());

        let invalid_p = vec![0.1, -0.5, 1.1];
        assert_eq!(
            bonferroni_correction(&invalid_p),
            Err(AnalysisError::InvalidPValue {
                index: 1,
                value: -0.5
            })
        );
        assert!(benjamini_hochberg_correction(&[0.01, 1.5]).is_err());
    }
}
