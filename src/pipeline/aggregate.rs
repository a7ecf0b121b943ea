//! Churn aggregation: group-wise target means and headline metrics

use std::collections::BTreeMap;

use anyhow::Result;
use polars::prelude::*;
use serde::Serialize;

use super::capability::Metric;
use super::table::{category_values, column_mean, mean, Schema};
use super::target::target_values;

/// Churn rate of one group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRate {
    /// One label per grouping column
    pub key: Vec<String>,
    /// Mean of the target over the group, in [0, 1]
    pub churn_rate: f64,
    /// Rows in the group with a target value
    pub customers: usize,
}

impl GroupRate {
    /// Key labels joined for display, e.g. `Saver × High`
    pub fn label(&self) -> String {
        self.key.join(" × ")
    }
}

/// Group-wise churn rates for one grouping
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChurnSummary {
    pub group_by: Vec<String>,
    pub groups: Vec<GroupRate>,
}

impl ChurnSummary {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Churn rate of a group, `None` when the group has no data
    pub fn rate_of(&self, key: &[&str]) -> Option<f64> {
        self.groups
            .iter()
            .find(|g| g.key.iter().map(|k| k.as_str()).eq(key.iter().copied()))
            .map(|g| g.churn_rate)
    }
}

/// Running (sum, count) of target values per key, in key order
pub(crate) fn accumulate<K: Ord>(
    keys: impl IntoIterator<Item = Option<K>>,
    targets: &[Option<f64>],
) -> BTreeMap<K, (f64, usize)> {
    let mut acc: BTreeMap<K, (f64, usize)> = BTreeMap::new();
    for (key, target) in keys.into_iter().zip(targets.iter()) {
        if let (Some(key), Some(t)) = (key, target) {
            let entry = acc.entry(key).or_insert((0.0, 0));
            entry.0 += t;
            entry.1 += 1;
        }
    }
    acc
}

/// Mean target per distinct combination of `group_by` values.
///
/// Rows with a null key or a null target are skipped, so a group only
/// appears when it has at least one observation.
pub fn churn_rate_by(df: &DataFrame, group_by: &[&str], target: &str) -> Result<ChurnSummary> {
    if group_by.is_empty() {
        anyhow::bail!("At least one grouping column is required");
    }

    let targets = target_values(df, target)?;
    let columns = group_by
        .iter()
        .map(|c| category_values(df, c))
        .collect::<Result<Vec<_>>>()?;

    let keys = (0..df.height()).map(|row| {
        columns
            .iter()
            .map(|col| col[row].clone())
            .collect::<Option<Vec<String>>>()
    });

    let groups = accumulate(keys, &targets)
        .into_iter()
        .map(|(key, (sum, count))| GroupRate {
            key,
            churn_rate: sum / count as f64,
            customers: count,
        })
        .collect();

    Ok(ChurnSummary {
        group_by: group_by.iter().map(|c| c.to_string()).collect(),
        groups,
    })
}

/// Headline metrics of the (filtered) customer base
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyMetrics {
    pub total_customers: usize,
    /// Overall churn rate as a percentage; `None` without any target values
    pub attrition_rate_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_credit_limit: Option<f64>,
    /// Mean utilization as a percentage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_utilization_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_spend: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_transactions: Option<f64>,
}

/// Compute headline metrics. Each optional metric is independent and left
/// out when its source column is absent.
pub fn key_metrics(df: &DataFrame, target: &str) -> Result<KeyMetrics> {
    let schema = Schema::from_frame(df);
    let optional_mean = |metric: Metric| -> Result<Option<f64>> {
        match metric.source_column() {
            Some(column) if schema.contains(column) => column_mean(df, column),
            _ => Ok(None),
        }
    };

    let targets = target_values(df, target)?;

    Ok(KeyMetrics {
        total_customers: df.height(),
        attrition_rate_pct: mean(targets.into_iter().flatten()).map(|m| m * 100.0),
        avg_credit_limit: optional_mean(Metric::AvgCreditLimit)?,
        avg_utilization_pct: optional_mean(Metric::AvgUtilization)?.map(|m| m * 100.0),
        avg_spend: optional_mean(Metric::AvgSpend)?,
        avg_transactions: optional_mean(Metric::AvgTransactions)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulate_skips_null_keys_and_targets() {
        let keys = vec![Some("a"), None, Some("a"), Some("b")];
        let targets = vec![Some(1.0), Some(1.0), None, Some(0.0)];
        let acc = accumulate(keys, &targets);

        assert_eq!(acc.get("a"), Some(&(1.0, 1)));
        assert_eq!(acc.get("b"), Some(&(0.0, 1)));
        assert_eq!(acc.len(), 2);
    }

    #[test]
    fn test_rate_of_pairs() {
        let summary = ChurnSummary {
            group_by: vec!["persona".into(), "income_bucket".into()],
            groups: vec![GroupRate {
                key: vec!["Saver".into(), "High".into()],
                churn_rate: 0.25,
                customers: 4,
            }],
        };
        assert_eq!(summary.rate_of(&["Saver", "High"]), Some(0.25));
        assert_eq!(summary.rate_of(&["Saver"]), None);
        assert_eq!(summary.groups[0].label(), "Saver × High");
    }

    #[test]
    fn test_empty_group_by_rejected() {
        let df = df! { "attritionflag" => [0i32, 1] }.unwrap();
        assert!(churn_rate_by(&df, &[], "attritionflag").is_err());
    }
}
