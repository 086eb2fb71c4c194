use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Statistical procedure that raised a sample-size error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    ShapiroWilk,
    Levene,
    Anova,
    TTest,
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TestKind::ShapiroWilk => "the Shapiro-Wilk test",
            TestKind::Levene => "the Levene test",
            TestKind::Anova => "one-way ANOVA",
            TestKind::TTest => "the t-test",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while preparing or running a group comparison
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisError {
    // Selection and dataset errors
    #[error("The measurement variable cannot be the same as the grouping variable ('{variable}')")]
    InvalidSelection { variable: String },

    #[error(
        "'{variable}' splits the records into {found} group(s); choose a grouping variable that forms at least 2 groups"
    )]
    SingleGroup { variable: String, found: usize },

    #[error("{} has {observed} observation(s) but {test} requires at least {required}", subject(.group))]
    InsufficientSampleSize {
        group: Option<String>,
        test: TestKind,
        observed: usize,
        required: usize,
    },

    #[error("Column '{variable}' holds non-numeric value {value:?} at record {record}")]
    NonNumericMeasurement {
        variable: String,
        record: usize,
        value: String,
    },

    #[error("Unknown column '{column}'")]
    UnknownColumn { column: String },

    #[error("Record {record} does not match the dataset columns")]
    InconsistentRecord { record: usize },

    // Configuration errors
    #[error("Invalid {field}: {value} ({reason})")]
    InvalidConfig {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Trim proportion {proportion} leaves no observations in a sample of {observed}")]
    TrimTooLarge { proportion: f64, observed: usize },

    // Numerical errors
    #[error("Invalid p-value at index {index}: {value}")]
    InvalidPValue { index: usize, value: f64 },

    #[error("Empty p-value array")]
    EmptyPValues,

    #[error("Distribution error: {message}")]
    Distribution { message: String },
}

impl AnalysisError {
    pub(crate) fn insufficient(test: TestKind, observed: usize, required: usize) -> Self {
        AnalysisError::InsufficientSampleSize {
            group: None,
            test,
            observed,
            required,
        }
    }

    pub(crate) fn distribution(err: impl fmt::Display) -> Self {
        AnalysisError::Distribution {
            message: err.to_string(),
        }
    }

    /// Attach a group label to a sample-size error raised by a slice-level routine.
    pub fn for_group(self, label: &str) -> Self {
        match self {
            AnalysisError::InsufficientSampleSize {
                test,
                observed,
                required,
                ..
            } => AnalysisError::InsufficientSampleSize {
                group: Some(label.to_string()),
                test,
                observed,
                required,
            },
            other => other,
        }
    }
}

fn subject(group: &Option<String>) -> String {
    match group {
        Some(label) => format!("Group '{label}'"),
        None => "Sample".to_string(),
    }
}

/// Result type for analysis operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_message_names_group() {
        let err = AnalysisError::insufficient(TestKind::ShapiroWilk, 2, 3);
        assert_eq!(
            err.to_string(),
            "Sample has 2 observation(s) but the Shapiro-Wilk test requires at least 3"
        );

        let err = err.for_group("Asian");
        assert_eq!(
            err.to_string(),
            "Group 'Asian' has 2 observation(s) but the Shapiro-Wilk test requires at least 3"
        );
    }

    #[test]
    fn test_for_group_leaves_other_errors_alone() {
        let err = AnalysisError::EmptyPValues.for_group("x");
        assert_eq!(err, AnalysisError::EmptyPValues);
    }
}
