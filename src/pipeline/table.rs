//! Column access helpers shared by the dashboard and predictor pipelines

use std::collections::HashSet;

use anyhow::{Context, Result};
use polars::prelude::*;

/// Label used for null cells wherever a category has to be displayed or selected
pub const MISSING_LABEL: &str = "(missing)";

/// Set of column names present in a table, queried once per render
#[derive(Debug, Clone, Default)]
pub struct Schema {
    columns: HashSet<String>,
}

impl Schema {
    pub fn from_frame(df: &DataFrame) -> Self {
        Self {
            columns: column_names(df).into_iter().collect(),
        }
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains(column)
    }

    /// True when every listed column is present
    pub fn supports(&self, required: &[&str]) -> bool {
        required.iter().all(|c| self.contains(c))
    }
}

/// Column names in table order
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names().iter().map(|s| s.to_string()).collect()
}

pub fn has_column(df: &DataFrame, column: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == column)
}

/// Read a column as optional floats. Non-numeric cells become `None`.
pub fn numeric_values(df: &DataFrame, column: &str) -> Result<Vec<Option<f64>>> {
    let col = df
        .column(column)
        .with_context(|| format!("Column '{}' not found", column))?;
    let cast = col.cast(&DataType::Float64)?;
    let values = cast
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    Ok(values)
}

/// Read a column as optional category labels
pub fn category_values(df: &DataFrame, column: &str) -> Result<Vec<Option<String>>> {
    let col = df
        .column(column)
        .with_context(|| format!("Column '{}' not found", column))?;

    let values: Vec<Option<String>> = match col.dtype() {
        DataType::String => col
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect(),
        DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 => {
            let cast = col.cast(&DataType::Int64)?;
            cast.i64()?
                .into_iter()
                .map(|v| v.map(|n| n.to_string()))
                .collect()
        }
        DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64 => {
            let cast = col.cast(&DataType::UInt64)?;
            cast.u64()?
                .into_iter()
                .map(|v| v.map(|n| n.to_string()))
                .collect()
        }
        DataType::Float32 | DataType::Float64 => {
            let cast = col.cast(&DataType::Float64)?;
            cast.f64()?
                .into_iter()
                .map(|v| v.filter(|n| !n.is_nan()).map(|n| format!("{}", n)))
                .collect()
        }
        DataType::Boolean => col
            .bool()?
            .into_iter()
            .map(|v| v.map(|b| b.to_string()))
            .collect(),
        _ => {
            let cast = col.cast(&DataType::String)?;
            cast.str()?
                .into_iter()
                .map(|v| v.map(|s| s.to_string()))
                .collect()
        }
    };

    Ok(values)
}

/// Category labels with nulls replaced by [`MISSING_LABEL`]
pub fn category_labels(df: &DataFrame, column: &str) -> Result<Vec<String>> {
    Ok(category_values(df, column)?
        .into_iter()
        .map(|v| v.unwrap_or_else(|| MISSING_LABEL.to_string()))
        .collect())
}

/// Arithmetic mean of a numeric column, ignoring nulls.
///
/// `None` when the column has no values at all.
pub fn column_mean(df: &DataFrame, column: &str) -> Result<Option<f64>> {
    let values = numeric_values(df, column)?;
    Ok(mean(values.into_iter().flatten()))
}

pub(crate) fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0f64, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_values_formats_numbers() {
        let df = df! {
            "ints" => [Some(1i64), None, Some(3)],
            "floats" => [1.0f64, 2.5, f64::NAN],
        }
        .unwrap();

        assert_eq!(
            category_values(&df, "ints").unwrap(),
            vec![Some("1".to_string()), None, Some("3".to_string())]
        );
        assert_eq!(
            category_values(&df, "floats").unwrap(),
            vec![Some("1".to_string()), Some("2.5".to_string()), None]
        );
    }

    #[test]
    fn test_column_mean_ignores_nulls() {
        let df = df! {
            "x" => [Some(2.0f64), None, Some(4.0)],
            "empty" => [None::<f64>, None, None],
        }
        .unwrap();

        assert_eq!(column_mean(&df, "x").unwrap(), Some(3.0));
        assert_eq!(column_mean(&df, "empty").unwrap(), None);
        assert!(column_mean(&df, "absent").is_err());
    }

    #[test]
    fn test_schema_supports() {
        let df = df! { "a" => [1i32], "b" => [2i32] }.unwrap();
        let schema = Schema::from_frame(&df);

        assert!(schema.supports(&["a", "b"]));
        assert!(!schema.supports(&["a", "c"]));
        assert!(schema.supports(&[]));
    }
}
