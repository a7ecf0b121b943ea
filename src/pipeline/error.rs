//! Error types for the churn pipelines.
//!
//! Library functions return `anyhow::Result`; the variants below are the
//! failures callers are expected to branch on, recoverable with
//! `anyhow::Error::downcast_ref::<ChurnError>()`.

use thiserror::Error;

/// Domain errors raised by ingestion, training and inference.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ChurnError {
    /// A required column is absent after column-name normalization.
    #[error("Missing column: `{0}`")]
    MissingColumn(String),

    /// Two source columns normalize to the same name.
    #[error("Columns normalize to the same name `{0}`")]
    DuplicateColumn(String),

    /// The target column holds something other than 0/1.
    #[error("Target column `{column}` must be binary 0/1, found {found}")]
    NonBinaryTarget {
        /// Target column name
        column: String,
        /// Offending value or dtype, rendered for display
        found: String,
    },

    /// A training column cannot be interpreted as a number.
    #[error("Feature column `{column}` has non-numeric type {dtype}; upload a preprocessed dataset")]
    NonNumericFeature {
        /// Column name
        column: String,
        /// Polars dtype, rendered for display
        dtype: String,
    },

    /// No labelled rows are left to train on.
    #[error("Cannot train a model: the dataset has no rows with a target value")]
    EmptyTrainingSet,

    /// A predictor input field is outside its allowed range.
    #[error("{field} must be between {min} and {max}, got {value}")]
    InputOutOfRange {
        /// Field name as shown to the user
        field: &'static str,
        /// Inclusive lower bound
        min: f64,
        /// Inclusive upper bound
        max: f64,
        /// Rejected value
        value: f64,
    },

    /// A feature row was handed to the model with the wrong schema.
    #[error("Feature row does not match the model schema: expected {expected:?}, got {actual:?}")]
    FeatureMismatch {
        /// Model feature list
        expected: Vec<String>,
        /// Columns of the rejected row
        actual: Vec<String>,
    },
}

/// Returns the [`ChurnError`] behind an `anyhow::Error`, if there is one.
pub fn churn_error(err: &anyhow::Error) -> Option<&ChurnError> {
    err.downcast_ref::<ChurnError>()
}
