use std::cmp::Ordering;

/// Count, mean and sample variance of one sample, computed in two passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleMoments {
    pub n: usize,
    pub mean: f64,
    /// Sample variance (n - 1 denominator), NaN for n < 2
    pub variance: f64,
}

impl SampleMoments {
    pub fn from_slice(x: &[f64]) -> Self {
        let n = x.len();
        let mean = mean(x);
        let variance = if n < 2 {
            f64::NAN
        } else {
            x.iter().map(|&v| (v - mean) * (v - mean)).sum::<f64>() / (n - 1) as f64
        };
        SampleMoments { n, mean, variance }
    }
}

/// Arithmetic mean, NaN for an empty slice.
///
/// The result is kept inside `[min, max]` of the sample: rounding in `sum / n` can otherwise
/// land just outside, so a constant sample would not have its own value as mean.
pub fn mean(x: &[f64]) -> f64 {
    if x.is_empty() {
        return f64::NAN;
    }
    let (lo, hi) = x
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    (x.iter().sum::<f64>() / x.len() as f64).max(lo).min(hi)
}

/// Sum of squared deviations from the mean.
pub fn sum_of_squares(x: &[f64]) -> f64 {
    let m = mean(x);
    x.iter().map(|&v| (v - m) * (v - m)).sum()
}

/// Sorted copy of the sample; NaN-free input assumed.
pub fn sorted(x: &[f64]) -> Vec<f64> {
    let mut sorted = x.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}

/// Median of an already sorted sample; the two middle values are averaged for even n.
pub fn median_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Number of observations cut from each end when trimming `proportion` of a sample of `n`.
pub fn trim_count(n: usize, proportion: f64) -> usize {
    (proportion * n as f64).floor() as usize
}
