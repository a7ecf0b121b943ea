//! Transaction-count bucketing

use anyhow::Result;
use polars::prelude::*;
use serde::Serialize;

use super::aggregate::{accumulate, ChurnSummary, GroupRate};
use super::table::numeric_values;
use super::target::target_values;

/// Bucket boundaries: (0, 10), [10, 50), [50, 100), [100, 500]
pub const BUCKET_EDGES: [f64; 5] = [0.0, 10.0, 50.0, 100.0, 500.0];

/// Discrete transaction level, ordered from lowest to highest activity.
///
/// Values outside every range map to `Unbucketed` instead of the nearest bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum TransactionBucket {
    Low,
    Medium,
    High,
    VeryHigh,
    Unbucketed,
}

impl TransactionBucket {
    pub fn from_value(value: Option<f64>) -> Self {
        let Some(v) = value.filter(|v| !v.is_nan()) else {
            return TransactionBucket::Unbucketed;
        };
        let [zero, low, medium, high, max] = BUCKET_EDGES;

        if v <= zero || v > max {
            TransactionBucket::Unbucketed
        } else if v < low {
            TransactionBucket::Low
        } else if v < medium {
            TransactionBucket::Medium
        } else if v < high {
            TransactionBucket::High
        } else {
            TransactionBucket::VeryHigh
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TransactionBucket::Low => "Low",
            TransactionBucket::Medium => "Medium",
            TransactionBucket::High => "High",
            TransactionBucket::VeryHigh => "Very High",
            TransactionBucket::Unbucketed => "Unbucketed",
        }
    }
}

impl std::fmt::Display for TransactionBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

pub fn bucketize(values: &[Option<f64>]) -> Vec<TransactionBucket> {
    values.iter().map(|v| TransactionBucket::from_value(*v)).collect()
}

/// Churn rate per transaction bucket, in bucket order
pub fn churn_by_transaction_bucket(
    df: &DataFrame,
    column: &str,
    target: &str,
) -> Result<ChurnSummary> {
    let buckets = bucketize(&numeric_values(df, column)?);
    let targets = target_values(df, target)?;

    let groups = accumulate(buckets.into_iter().map(Some), &targets)
        .into_iter()
        .map(|(bucket, (sum, count))| GroupRate {
            key: vec![bucket.label().to_string()],
            churn_rate: sum / count as f64,
            customers: count,
        })
        .collect();

    Ok(ChurnSummary {
        group_by: vec![format!("{}_bucket", column)],
        groups,
    })
}
