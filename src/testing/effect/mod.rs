use crate::testing::utils::SampleMoments;

/// Calculate Cohen's d of `x` against `y` using the pooled standard deviation.
///
/// Positive when `x` has the larger mean. `None` if either sample has fewer than 2 observations
/// or the pooled standard deviation is zero.
pub fn cohens_d(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() < 2 || y.len() < 2 {
        return None;
    }

    let m1 = SampleMoments::from_slice(x);
    let m2 = SampleMoments::from_slice(y);
    let n1 = m1.n as f64;
    let n2 = m2.n as f64;

    let pooled_sd =
        (((n1 - 1.0) * m1.variance + (n2 - 1.0) * m2.variance) / (n1 + n2 - 2.0)).sqrt();
    if pooled_sd <= 0.0 || !pooled_sd.is_finite() {
        return None;
    }

    Some((m1.mean - m2.mean) / pooled_sd)
}
