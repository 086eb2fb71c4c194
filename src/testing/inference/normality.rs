//! Shapiro-Wilk test of normality.
//!
//! Coefficients and p-values follow Royston's approximation (Applied Statistics algorithm
//! AS R94): expected normal order statistics from Blom's scores, a polynomial correction of the
//! outermost one or two coefficients, and a normalizing transform of `ln(1 - W)` whose form
//! depends on whether n is at most 11.

use crate::errors::{AnalysisError, AnalysisResult, TestKind};
use crate::testing::TestResult;
use crate::testing::utils::{mean, sorted};
use log::warn;
use statrs::distribution::{ContinuousCDF, Normal};
use std::f64::consts::{FRAC_1_SQRT_2, PI};

/// Smallest sample the test is defined for.
pub const SHAPIRO_WILK_MIN_N: usize = 3;
/// Largest sample the approximation was validated for.
pub const SHAPIRO_WILK_MAX_N: usize = 5000;

const C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.07119, 4.434685, -2.706056];
const C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const C3: [f64; 4] = [0.544, -0.39978, 0.025054, -6.714e-4];
const C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const G: [f64; 2] = [-2.273, 0.459];

/// Run the Shapiro-Wilk test on one sample.
///
/// Returns the W statistic and its p-value. Fewer than three observations is an
/// [`AnalysisError::InsufficientSampleSize`]. A constant sample gives W = 1, p = 1.
pub fn shapiro_wilk(data: &[f64]) -> AnalysisResult<TestResult> {
    let n = data.len();
    if n < SHAPIRO_WILK_MIN_N {
        return Err(AnalysisError::insufficient(
            TestKind::ShapiroWilk,
            n,
            SHAPIRO_WILK_MIN_N,
        ));
    }
    if n > SHAPIRO_WILK_MAX_N {
        warn!("Shapiro-Wilk p-value may be inaccurate for n = {n} > {SHAPIRO_WILK_MAX_N}");
    }

    let x = sorted(data);
    let range = x[n - 1] - x[0];
    if range <= f64::EPSILON * x[n - 1].abs().max(1.0) {
        warn!("Shapiro-Wilk input has zero range; reporting W = 1");
        return Ok(TestResult::new(1.0, 1.0));
    }

    if n == 3 {
        return Ok(shapiro_wilk_n3(&x));
    }

    let normal = Normal::new(0.0, 1.0).map_err(AnalysisError::distribution)?;
    let a = coefficients(n, &normal);
    let w = w_statistic(&x, &a);
    let p_value = p_value(w, n, &normal);

    Ok(TestResult::new(w, p_value))
}

// n = 3 has a single coefficient sqrt(1/2) and an exact p-value
fn shapiro_wilk_n3(x: &[f64]) -> TestResult {
    let ss: f64 = {
        let m = mean(x);
        x.iter().map(|&v| (v - m) * (v - m)).sum()
    };
    let numerator = FRAC_1_SQRT_2 * (x[2] - x[0]);
    let w = (numerator * numerator / ss).clamp(0.75, 1.0);
    let p = 1.0 - (6.0 / PI) * w.sqrt().acos();
    TestResult::new(w, p.clamp(0.0, 1.0))
}

// Horner evaluation of c[0] + c[1]x + c[2]x^2 + ...
fn poly(c: &[f64], x: f64) -> f64 {
    c.iter().rev().fold(0.0, |acc, &ci| acc * x + ci)
}

/// Upper half of the antisymmetric coefficient vector, largest order statistic first.
fn coefficients(n: usize, normal: &Normal) -> Vec<f64> {
    let half = n / 2;
    let nf = n as f64;

    // Blom scores for the upper half, positive and decreasing
    let m: Vec<f64> = (1..=half)
        .map(|i| -normal.inverse_cdf((i as f64 - 0.375) / (nf + 0.25)))
        .collect();
    let summ2 = 2.0 * m.iter().map(|v| v * v).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let u = 1.0 / nf.sqrt();

    let mut a = vec![0.0; half];
    a[0] = m[0] / ssumm2 + poly(&C1, u);

    let corrected = if n > 5 {
        a[1] = m[1] / ssumm2 + poly(&C2, u);
        2
    } else {
        1
    };

    let phi_num = summ2 - 2.0 * m[..corrected].iter().map(|v| v * v).sum::<f64>();
    let phi_den = 1.0 - 2.0 * a[..corrected].iter().map(|v| v * v).sum::<f64>();
    let fac = (phi_num / phi_den).sqrt();
    for i in corrected..half {
        a[i] = m[i] / fac;
    }
    a
}

fn w_statistic(x: &[f64], a: &[f64]) -> f64 {
    let n = x.len();
    let numerator: f64 = a
        .iter()
        .enumerate()
        .map(|(i, ai)| ai * (x[n - 1 - i] - x[i]))
        .sum();
    let m = mean(x);
    let ss: f64 = x.iter().map(|&v| (v - m) * (v - m)).sum();
    (numerator * numerator / ss).min(1.0)
}

fn p_value(w: f64, n: usize, normal: &Normal) -> f64 {
    let nf = n as f64;
    let w1 = 1.0 - w;
    if w1 <= 0.0 {
        return 1.0;
    }
    let y = w1.ln();

    let (z_input, m, s) = if n <= 11 {
        let gamma = poly(&G, nf);
        if y >= gamma {
            return 0.0;
        }
        (-(gamma - y).ln(), poly(&C3, nf), poly(&C4, nf).exp())
    } else {
        let ln_n = nf.ln();
        (y, poly(&C5, ln_n), poly(&C6, ln_n).exp())
    };

    normal.sf((z_input - m) / s).clamp(0.0, 1.0)
}
