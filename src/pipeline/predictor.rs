//! Churn model: training on an uploaded table and single-row inference

use anyhow::{Context, Result};
use faer::Mat;
use indicatif::ProgressBar;
use polars::prelude::*;
use serde::Serialize;
use tracing::info;

use super::classifier::{BoostParams, BoostedTrees};
use super::error::ChurnError;
use super::features::FeatureRow;
use super::table::{column_names, numeric_values};
use super::target::target_values;

/// Probability at or above which a customer is predicted to churn
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Outcome of a single prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub churn: bool,
    /// Probability of the positive (churn) class
    pub probability: f64,
}

/// A classifier bound to its ordered training feature list
#[derive(Debug, Clone)]
pub struct ChurnModel {
    features: Vec<String>,
    ensemble: BoostedTrees,
    training_rows: usize,
    positive_rate: f64,
}

impl ChurnModel {
    /// Feature names in training order
    pub fn feature_names(&self) -> &[String] {
        &self.features
    }

    pub fn training_rows(&self) -> usize {
        self.training_rows
    }

    /// Share of churned customers in the training rows
    pub fn positive_rate(&self) -> f64 {
        self.positive_rate
    }

    pub fn params(&self) -> &BoostParams {
        self.ensemble.params()
    }

    /// Score an aligned row.
    ///
    /// Fails with [`ChurnError::FeatureMismatch`] unless the row's columns
    /// equal the feature list in membership and order.
    pub fn predict(&self, row: &FeatureRow) -> Result<Prediction> {
        if row.columns() != self.features.as_slice() {
            return Err(ChurnError::FeatureMismatch {
                expected: self.features.clone(),
                actual: row.columns().to_vec(),
            }
            .into());
        }

        let probability = self.ensemble.predict_proba(row.values());
        Ok(Prediction {
            churn: probability >= DECISION_THRESHOLD,
            probability,
        })
    }
}

/// Non-target columns, rejecting anything that is not numeric or boolean
fn feature_columns(df: &DataFrame, target: &str) -> Result<Vec<String>> {
    column_names(df)
        .into_iter()
        .filter(|c| c != target)
        .map(|name| {
            let dtype = df.column(&name)?.dtype().clone();
            if dtype.is_primitive_numeric() || matches!(dtype, DataType::Boolean) {
                Ok(name)
            } else {
                Err(ChurnError::NonNumericFeature {
                    column: name,
                    dtype: dtype.to_string(),
                }
                .into())
            }
        })
        .collect()
}

/// Train a boosted classifier on every non-target column of `df`.
///
/// Rows without a target value are dropped; missing feature cells are 0.
pub fn train_model(
    df: &DataFrame,
    target: &str,
    progress: Option<&ProgressBar>,
) -> Result<ChurnModel> {
    let features = feature_columns(df, target)?;
    let targets = target_values(df, target)?;
    let labelled: Vec<usize> = targets
        .iter()
        .enumerate()
        .filter_map(|(i, t)| t.map(|_| i))
        .collect();

    if labelled.is_empty() {
        return Err(ChurnError::EmptyTrainingSet.into());
    }

    let columns = features
        .iter()
        .map(|name| numeric_values(df, name))
        .collect::<Result<Vec<_>>>()?;

    let x = Mat::<f64>::from_fn(labelled.len(), features.len(), |i, j| {
        columns[j][labelled[i]].unwrap_or(0.0)
    });
    let y: Vec<f64> = labelled
        .iter()
        .map(|&i| targets[i].unwrap_or(0.0))
        .collect();
    let positive_rate = y.iter().sum::<f64>() / y.len() as f64;

    let ensemble = BoostedTrees::fit(&x, &y, BoostParams::default(), progress)
        .context("Failed to train churn model")?;

    info!(
        rows = labelled.len(),
        features = features.len(),
        trees = ensemble.n_trees(),
        "churn model trained"
    );

    Ok(ChurnModel {
        features,
        ensemble,
        training_rows: labelled.len(),
        positive_rate,
    })
}
