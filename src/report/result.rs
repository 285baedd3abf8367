//! Tabular query results with named columns

use rusqlite::types::ValueRef;
use serde::{Deserialize, Serialize};

/// A single cell of a result set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    /// Numeric view of the cell. NULL counts as zero so charts never see gaps.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Null => Some(0.0),
            Value::Integer(i) => Some(*i as f64),
            Value::Real(r) => Some(*r),
            Value::Text(t) => t.trim().parse().ok(),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Null => Some(0),
            Value::Integer(i) => Some(*i),
            Value::Real(r) => Some(r.round() as i64),
            Value::Text(t) => t.trim().parse().ok(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(t) => Some(t),
            _ => None,
        }
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(r) => Value::Real(r),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Text(format!("<{} bytes>", b.len())),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => {
                let fixed = format!("{:.2}", r);
                let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
                write!(f, "{}", if trimmed == "-0" { "0" } else { trimmed })
            }
            Value::Text(t) => write!(f, "{}", t),
        }
    }
}

/// Ordered rows sharing one list of column names
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Execute a prepared statement and collect every row
    pub(crate) fn collect<P: rusqlite::Params>(
        stmt: &mut rusqlite::Statement<'_>,
        params: P,
    ) -> rusqlite::Result<Self> {
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();
        let mut set = Self::new(columns);

        let mut rows = stmt.query(params)?;
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(width);
            for i in 0..width {
                values.push(Value::from(row.get_ref(i)?));
            }
            set.rows.push(values);
        }
        Ok(set)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All cells of one column, top to bottom
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Cell at `row` in the named column
    pub fn get(&self, row: usize, name: &str) -> Option<&Value> {
        let idx = self.column_index(name)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Copy of the first `n` rows
    pub fn head(&self, n: usize) -> ResultSet {
        ResultSet {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Rows as column-name keyed JSON objects
    pub fn records(&self) -> Vec<serde_json::Map<String, serde_json::Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(col, value)| {
                        let json = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
                        (col.clone(), json)
                    })
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResultSet {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let mut stmt = conn
            .prepare("SELECT 'Austin' AS City, 3 AS Total, 2.5 AS Average, NULL AS Missing UNION ALL SELECT 'Boston', 1, 1.0, NULL")
            .unwrap();
        ResultSet::collect(&mut stmt, []).unwrap()
    }

    #[test]
    fn test_collect_keeps_column_names() {
        let set = sample();
        assert_eq!(set.columns, vec!["City", "Total", "Average", "Missing"]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(0, "City"), Some(&Value::Text("Austin".into())));
        assert_eq!(set.get(1, "Total").and_then(Value::as_i64), Some(1));
        assert_eq!(set.get(0, "Missing"), Some(&Value::Null));
        assert!(set.column("Nope").is_none());
    }

    #[test]
    fn test_display_trims_reals() {
        assert_eq!(Value::Real(3.0).to_string(), "3");
        assert_eq!(Value::Real(12.5).to_string(), "12.5");
        assert_eq!(Value::Real(33.3333).to_string(), "33.33");
        assert_eq!(Value::Null.to_string(), "");
    }

    #[test]
    fn test_records_are_keyed_by_column() {
        let records = sample().records();
        assert_eq!(records[1]["City"], "Boston");
        assert_eq!(records[0]["Total"], 3);
        assert!(records[0]["Missing"].is_null());
    }

    #[test]
    fn test_head() {
        let set = sample();
        assert_eq!(set.head(1).len(), 1);
        assert_eq!(set.head(10).len(), 2);
    }
}
