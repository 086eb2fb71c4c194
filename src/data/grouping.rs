use crate::data::{Dataset, Value};
use crate::errors::{AnalysisError, AnalysisResult};
use log::debug;
use serde::Serialize;
use std::collections::HashMap;

/// Records sharing one value of the grouping variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub label: String,
    pub values: Vec<f64>,
}

impl Group {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Which omnibus procedure the number of groups calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedTest {
    /// Fewer than two groups, nothing to compare
    None,
    TTest,
    Anova,
}

/// A dataset partitioned by a categorical column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedData {
    pub group_variable: String,
    pub measure_variable: String,
    groups: Vec<Group>,
    dropped_records: usize,
}

impl GroupedData {
    /// Groups in order of first appearance.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.label.as_str()).collect()
    }

    pub fn get(&self, label: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.label == label)
    }

    /// Measurement slices, one per group, in group order.
    pub fn samples(&self) -> Vec<&[f64]> {
        self.groups.iter().map(|g| g.values.as_slice()).collect()
    }

    /// Records skipped because the group label or the measurement was missing.
    pub fn dropped_records(&self) -> usize {
        self.dropped_records
    }

    /// A comparison needs at least two groups.
    pub fn validate(&self) -> AnalysisResult<()> {
        if self.groups.len() < 2 {
            return Err(AnalysisError::SingleGroup {
                variable: self.group_variable.clone(),
                found: self.groups.len(),
            });
        }
        Ok(())
    }

    pub fn suggested_test(&self) -> SuggestedTest {
        match self.groups.len() {
            0 | 1 => SuggestedTest::None,
            2 => SuggestedTest::TTest,
            _ => SuggestedTest::Anova,
        }
    }
}

/// Reject a selection that compares a column against itself.
pub fn validate_selection(group_variable: &str, measure_variable: &str) -> AnalysisResult<()> {
    if group_variable == measure_variable {
        return Err(AnalysisError::InvalidSelection {
            variable: group_variable.to_string(),
        });
    }
    Ok(())
}

/// Partition `dataset` by `group_variable` and collect the numeric `measure_variable` of each
/// record.
///
/// Records with a missing label or measurement (an empty cell or NaN) are dropped. A measurement
/// that is present but not numeric fails the whole grouping with
/// [`AnalysisError::NonNumericMeasurement`].
pub fn group_by(
    dataset: &Dataset,
    group_variable: &str,
    measure_variable: &str,
) -> AnalysisResult<GroupedData> {
    let labels = dataset.column(group_variable)?;
    let measures = dataset.column(measure_variable)?;

    let mut groups: Vec<Group> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut dropped_records = 0;

    for (record, (label, measure)) in labels.zip(measures).enumerate() {
        let (Some(label), false) = (label.as_label(), measure.is_missing()) else {
            dropped_records += 1;
            continue;
        };
        let value = coerce_measure(measure, measure_variable, record)?;

        let slot = *index.entry(label).or_insert_with_key(|label| {
            groups.push(Group {
                label: label.clone(),
                values: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].values.push(value);
    }

    if dropped_records > 0 {
        debug!(
            "Dropped {} record(s) with a missing '{}' or '{}'",
            dropped_records, group_variable, measure_variable
        );
    }
    debug!(
        "Grouped {} record(s) by '{}' into {} group(s)",
        dataset.len() - dropped_records,
        group_variable,
        groups.len()
    );

    Ok(GroupedData {
        group_variable: group_variable.to_string(),
        measure_variable: measure_variable.to_string(),
        groups,
        dropped_records,
    })
}

fn coerce_measure(value: &Value, variable: &str, record: usize) -> AnalysisResult<f64> {
    value
        .as_number()
        .filter(|x| x.is_finite())
        .ok_or_else(|| AnalysisError::NonNumericMeasurement {
            variable: variable.to_string(),
            record,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        Dataset::from_columns(vec![
            (
                "Neighborhood",
                vec![
                    Value::from("Logan"),
                    Value::from("Riverside"),
                    Value::from("Logan"),
                    Value::Missing,
                    Value::from("West Central"),
                    Value::from("Riverside"),
                ],
            ),
            (
                "Total",
                vec![
                    Value::from(71.0),
                    Value::from(64.5),
                    Value::from("80"),
                    Value::from(55.0),
                    Value::from(90.0),
                    Value::Missing,
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_groups_in_first_appearance_order() {
        let grouped = group_by(&dataset(), "Neighborhood", "Total").unwrap();
        assert_eq!(grouped.labels(), vec!["Logan", "Riverside", "West Central"]);
        assert_eq!(grouped.get("Logan").unwrap().values, vec![71.0, 80.0]);
        assert_eq!(grouped.get("Riverside").unwrap().values, vec![64.5]);
        assert_eq!(grouped.dropped_records(), 2);
        assert_eq!(grouped.suggested_test(), SuggestedTest::Anova);
        assert!(grouped.validate().is_ok());
    }

    #[test]
    fn test_nan_cells_drop_the_record() {
        let ds = Dataset::from_columns(vec![
            (
                "g",
                vec![
                    Value::from("a"),
                    Value::Number(f64::NAN),
                    Value::from("a"),
                    Value::from("b"),
                    Value::from("b"),
                ],
            ),
            (
                "x",
                vec![
                    Value::from(1.0),
                    Value::from(2.0),
                    Value::Number(f64::NAN),
                    Value::from(4.0),
                    Value::from(5.0),
                ],
            ),
        ])
        .unwrap();
        let grouped = group_by(&ds, "g", "x").unwrap();
        assert_eq!(grouped.labels(), vec!["a", "b"]);
        assert_eq!(grouped.get("a").unwrap().values, vec![1.0]);
        assert_eq!(grouped.dropped_records(), 2);
    }

    #[test]
    fn test_infinite_measurement_is_rejected() {
        let ds = Dataset::from_columns(vec![
            ("g", vec![Value::from("a"), Value::from("b")]),
            ("x", vec![Value::from(1.0), Value::Number(f64::INFINITY)]),
        ])
        .unwrap();
        assert!(matches!(
            group_by(&ds, "g", "x"),
            Err(AnalysisError::NonNumericMeasurement { record: 1, .. })
        ));
    }

    #[test]
    fn test_single_group_is_flagged() {
        let ds = Dataset::from_columns(vec![
            ("g", vec![Value::from("a"), Value::from("a")]),
            ("x", vec![Value::from(1.0), Value::from(2.0)]),
        ])
        .unwrap();
        let grouped = group_by(&ds, "g", "x").unwrap();
        assert_eq!(grouped.suggested_test(), SuggestedTest::None);
        assert_eq!(
            grouped.validate(),
            Err(AnalysisError::SingleGroup {
                variable: "g".into(),
                found: 1
            })
        );
    }

    #[test]
    fn test_non_numeric_measurement() {
        let ds = Dataset::from_columns(vec![
            ("g", vec![Value::from("a"), Value::from("b")]),
            ("x", vec![Value::from(1.0), Value::from("n/a")]),
        ])
        .unwrap();
        assert_eq!(
            group_by(&ds, "g", "x"),
            Err(AnalysisError::NonNumericMeasurement {
                variable: "x".into(),
                record: 1,
                value: "n/a".into()
            })
        );
    }

    #[test]
    fn test_selection_validation() {
        assert!(validate_selection("Race", "Total").is_ok());
        assert!(matches!(
            validate_selection("Total", "Total"),
            Err(AnalysisError::InvalidSelection { .. })
        ));
    }
}
