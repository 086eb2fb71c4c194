//! In-memory tabular data handed over by the I/O layer.
//!
//! A [`Dataset`] is an ordered sequence of records sharing one set of column labels. Each cell
//! holds a [`Value`]: a number, a piece of text, or nothing. The core never parses files; it
//! only reads a dataset that has already been materialized.

use crate::errors::{AnalysisError, AnalysisResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

pub mod grouping;

pub use grouping::{Group, GroupedData, SuggestedTest, group_by, validate_selection};

/// A single dataset cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
    Missing,
}

impl Value {
    /// Numeric reading of the cell. Text is accepted when it parses as a float.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(x) => Some(*x),
            Value::Text(s) => s.trim().parse::<f64>().ok(),
            Value::Missing => None,
        }
    }

    /// Categorical reading of the cell, used for group labels. Missing cells have no label.
    pub fn as_label(&self) -> Option<String> {
        match self {
            Value::Number(x) if !x.is_nan() => Some(x.to_string()),
            Value::Text(s) => Some(s.clone()),
            Value::Number(_) | Value::Missing => None,
        }
    }

    /// An empty cell or a NaN number.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Missing => true,
            Value::Number(x) => x.is_nan(),
            Value::Text(_) => false,
        }
    }

    fn hash_into<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Number(x) => {
                0u8.hash(state);
                x.to_bits().hash(state);
            }
            Value::Text(s) => {
                1u8.hash(state);
                s.hash(state);
            }
            Value::Missing => 2u8.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(x) => write!(f, "{x}"),
            Value::Text(s) => f.write_str(s),
            Value::Missing => f.write_str(""),
        }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Number(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Missing, Into::into)
    }
}

/// One record: column label to cell.
pub type Record = BTreeMap<String, Value>;

/// Read-only table of records sharing the same columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    fingerprint: u64,
}

impl Dataset {
    /// Build a dataset from named columns. All columns must have the same length.
    pub fn from_columns<I, S>(columns: I) -> AnalysisResult<Self>
    where
        I: IntoIterator<Item = (S, Vec<Value>)>,
        S: Into<String>,
    {
        let (labels, data): (Vec<String>, Vec<Vec<Value>>) = columns
            .into_iter()
            .map(|(label, values)| (label.into(), values))
            .unzip();

        let n_rows = data.first().map_or(0, Vec::len);
        if let Some(short) = data.iter().map(Vec::len).find(|&len| len != n_rows) {
            return Err(AnalysisError::InconsistentRecord {
                record: short.min(n_rows),
            });
        }

        let mut columns_iter: Vec<_> = data.into_iter().map(Vec::into_iter).collect();
        let rows = (0..n_rows)
            .map(|_| {
                columns_iter
                    .iter_mut()
                    .map(|col| col.next().unwrap_or(Value::Missing))
                    .collect()
            })
            .collect();

        Ok(Self::assemble(labels, rows))
    }

    /// Build a dataset from records. The first record fixes the column set; every other
    /// record must carry exactly the same labels.
    pub fn from_records(records: Vec<Record>) -> AnalysisResult<Self> {
        let columns: Vec<String> = records
            .first()
            .map(|r| r.keys().cloned().collect())
            .unwrap_or_default();

        let mut rows = Vec::with_capacity(records.len());
        for (idx, mut record) in records.into_iter().enumerate() {
            if record.len() != columns.len() {
                return Err(AnalysisError::InconsistentRecord { record: idx });
            }
            let mut row = Vec::with_capacity(columns.len());
            for label in &columns {
                match record.remove(label) {
                    Some(value) => row.push(value),
                    None => return Err(AnalysisError::InconsistentRecord { record: idx }),
                }
            }
            rows.push(row);
        }

        Ok(Self::assemble(columns, rows))
    }

    fn assemble(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let mut hasher = DefaultHasher::new();
        columns.hash(&mut hasher);
        rows.len().hash(&mut hasher);
        for value in rows.iter().flatten() {
            value.hash_into(&mut hasher);
        }
        Dataset {
            columns,
            rows,
            fingerprint: hasher.finish(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Content hash of labels and cells, stable for identical datasets.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    pub fn column_index(&self, label: &str) -> AnalysisResult<usize> {
        self.columns
            .iter()
            .position(|c| c == label)
            .ok_or_else(|| AnalysisError::UnknownColumn {
                column: label.to_string(),
            })
    }

    /// Iterate the cells of one column in record order.
    pub fn column(&self, label: &str) -> AnalysisResult<impl Iterator<Item = &Value> + '_> {
        let idx = self.column_index(label)?;
        Ok(self.rows.iter().map(move |row| &row[idx]))
    }

    pub fn record(&self, idx: usize) -> Option<Record> {
        self.rows.get(idx).map(|row| {
            self.columns
                .iter()
                .cloned()
                .zip(row.iter().cloned())
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, Value)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_value_coercion() {
        assert_eq!(Value::Number(3.5).as_number(), Some(3.5));
        assert_eq!(Value::from(" 42 ").as_number(), Some(42.0));
        assert_eq!(Value::from("absent").as_number(), None);
        assert_eq!(Value::Missing.as_number(), None);

        assert_eq!(Value::Number(2.0).as_label().as_deref(), Some("2"));
        assert_eq!(Value::from("Logan").as_label().as_deref(), Some("Logan"));
        assert_eq!(Value::Missing.as_label(), None);
        assert_eq!(Value::Number(f64::NAN).as_label(), None);
        assert!(Value::Number(f64::NAN).is_missing());
        assert!(!Value::Number(f64::INFINITY).is_missing());
        assert!(!Value::from("").is_missing());
    }

    #[test]
    fn test_value_deserializes_untagged() {
        let values: Vec<Value> = serde_json::from_str(r#"[1.5, "Riverside", null]"#).unwrap();
        assert_eq!(
            values,
            vec![Value::Number(1.5), Value::from("Riverside"), Value::Missing]
        );
    }

    #[test]
    fn test_from_columns() {
        let ds = Dataset::from_columns(vec![
            ("Total", vec![Value::from(10.0), Value::from(20.0)]),
            ("Race", vec![Value::from("Asian"), Value::from("White")]),
        ])
        .unwrap();

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.columns(), &["Total".to_string(), "Race".to_string()]);
        let race: Vec<_> = ds.column("Race").unwrap().cloned().collect();
        assert_eq!(race, vec![Value::from("Asian"), Value::from("White")]);
        assert!(matches!(
            ds.column("Final"),
            Err(AnalysisError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn test_from_columns_rejects_ragged() {
        let result = Dataset::from_columns(vec![
            ("a", vec![Value::from(1.0), Value::from(2.0)]),
            ("b", vec![Value::from(1.0)]),
        ]);
        assert!(matches!(
            result,
            Err(AnalysisError::InconsistentRecord { .. })
        ));
    }

    #[test]
    fn test_from_records_requires_same_labels() {
        let ok = Dataset::from_records(vec![
            record(&[("g", "a".into()), ("x", 1.0.into())]),
            record(&[("g", "b".into()), ("x", 2.0.into())]),
        ])
        .unwrap();
        assert_eq!(ok.len(), 2);
        assert_eq!(ok.record(1).unwrap()["x"], Value::Number(2.0));

        let bad = Dataset::from_records(vec![
            record(&[("g", "a".into()), ("x", 1.0.into())]),
            record(&[("g", "b".into()), ("y", 2.0.into())]),
        ]);
        assert_eq!(bad, Err(AnalysisError::InconsistentRecord { record: 1 }));
    }

    #[test]
    fn test_fingerprint_tracks_content() {
        let make = |x: f64| {
            Dataset::from_columns(vec![("x", vec![Value::from(x), Value::from("a")])]).unwrap()
        };
        assert_eq!(make(1.0).fingerprint(), make(1.0).fingerprint());
        assert_ne!(make(1.0).fingerprint(), make(1.5).fingerprint());
    }
}
