//! Target column validation
//!
//! The churn flag must be a numeric (or boolean) column holding only 0 and 1.
//! Nulls are tolerated and skipped by every mean computed downstream; a column
//! holding nothing but nulls is accepted whatever dtype it was read as.

use anyhow::Result;
use polars::prelude::*;

use super::error::ChurnError;
use super::table::has_column;

/// Default name of the churn flag after column-name normalization
pub const TARGET_COLUMN: &str = "attritionflag";

/// Tolerance for floating point comparison when checking binary 0/1 values
const TOLERANCE: f64 = 1e-9;

/// Check that `target` exists and is binary.
///
/// Fails with [`ChurnError::MissingColumn`] or [`ChurnError::NonBinaryTarget`].
pub fn validate_target(df: &DataFrame, target: &str) -> Result<()> {
    if !has_column(df, target) {
        return Err(ChurnError::MissingColumn(target.to_string()).into());
    }

    let target_col = df.column(target)?;
    let dtype = target_col.dtype();

    if target_col.null_count() == df.height() {
        return Ok(());
    }

    if !(dtype.is_primitive_numeric() || matches!(dtype, DataType::Boolean)) {
        return Err(ChurnError::NonBinaryTarget {
            column: target.to_string(),
            found: format!("dtype {}", dtype),
        }
        .into());
    }

    let float_col = target_col.cast(&DataType::Float64)?;
    let offending = float_col
        .f64()?
        .into_iter()
        .flatten()
        .find(|&v| (v - 0.0).abs() >= TOLERANCE && (v - 1.0).abs() >= TOLERANCE);

    if let Some(value) = offending {
        return Err(ChurnError::NonBinaryTarget {
            column: target.to_string(),
            found: format!("value {}", value),
        }
        .into());
    }

    Ok(())
}

/// Read the target as optional 0.0/1.0 values
pub fn target_values(df: &DataFrame, target: &str) -> Result<Vec<Option<f64>>> {
    super::table::numeric_values(df, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::error::churn_error;

    #[test]
    fn test_binary_int_target() {
        let df = df! {
            "attritionflag" => [0i32, 1, 0, 1],
        }
        .unwrap();
        assert!(validate_target(&df, "attritionflag").is_ok());
    }

    #[test]
    fn test_binary_float_target_with_nulls() {
        let df = df! {
            "attritionflag" => [Some(0.0f64), None, Some(1.0)],
        }
        .unwrap();
        assert!(validate_target(&df, "attritionflag").is_ok());
    }

    #[test]
    fn test_boolean_target() {
        let df = df! {
            "attritionflag" => [true, false, true],
        }
        .unwrap();
        assert!(validate_target(&df, "attritionflag").is_ok());
    }

    #[test]
    fn test_missing_target() {
        let df = df! { "gender" => ["F", "M"] }.unwrap();
        let err = validate_target(&df, "attritionflag").unwrap_err();
        assert_eq!(
            churn_error(&err),
            Some(&ChurnError::MissingColumn("attritionflag".to_string()))
        );
    }

    #[test]
    fn test_non_binary_numeric_target() {
        let df = df! { "attritionflag" => [0i32, 1, 2] }.unwrap();
        let err = validate_target(&df, "attritionflag").unwrap_err();
        assert!(matches!(
            churn_error(&err),
            Some(ChurnError::NonBinaryTarget { .. })
        ));
        assert!(err.to_string().contains("value 2"));
    }

    #[test]
    fn test_all_null_target_accepted() {
        let df = df! { "attritionflag" => [None::<&str>, None] }.unwrap();
        assert!(validate_target(&df, "attritionflag").is_ok());
    }

    #[test]
    fn test_string_target_rejected() {
        let df = df! { "attritionflag" => ["yes", "no"] }.unwrap();
        let err = validate_target(&df, "attritionflag").unwrap_err();
        assert!(err.to_string().contains("dtype"));
    }
}
