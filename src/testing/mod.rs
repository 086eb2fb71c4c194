use serde::Serialize;

pub mod correction;
pub mod descriptive;
pub mod effect;
pub mod inference;

pub mod utils;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TTestType {
    Student, // Equal variance
    Welch,   // Unequal variance
}

impl TTestType {
    /// Pooled variance when the groups share a variance, Welch otherwise.
    pub fn for_equal_variance(equal_variance: bool) -> Self {
        if equal_variance {
            TTestType::Student
        } else {
            TTestType::Welch
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResult {
    /// The test statistic value (e.g., t-statistic, W statistic)
    pub statistic: f64,
    /// The p-value of the test
    pub p_value: f64,
    /// Degrees of freedom (for parametric inference)
    pub degrees_of_freedom: Option<f64>,
    /// Effect size measurement
    pub effect_size: Option<f64>,
    /// Standard error of the test statistic's denominator
    pub standard_error: Option<f64>,
}

impl TestResult {
    /// Create a new test result with minimal information
    pub fn new(statistic: f64, p_value: f64) -> Self {
        TestResult {
            statistic,
            p_value,
            degrees_of_freedom: None,
            effect_size: None,
            standard_error: None,
        }
    }

    /// Add degrees of freedom to the result
    pub fn with_degrees_of_freedom(mut self, df: f64) -> Self {
        self.degrees_of_freedom = Some(df);
        self
    }

    /// Add effect size to the result
    pub fn with_effect_size(mut self, effect_size: Option<f64>) -> Self {
        self.effect_size = effect_size;
        self
    }

    /// Add standard error to the result
    pub fn with_standard_error(mut self, se: f64) -> Self {
        self.standard_error = Some(se);
        self
    }

    /// Check if the result is statistically significant at the given threshold
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Variance decomposition of a one-way F-test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnovaResult {
    pub f_statistic: f64,
    pub p_value: f64,
    /// k - 1
    pub df_between: usize,
    /// N - k
    pub df_within: usize,
    pub ss_between: f64,
    pub ss_within: f64,
}
