//! Filter panel: narrows the dashboard table by categorical selections

use std::collections::HashSet;

use anyhow::Result;
use polars::prelude::*;
use serde::Serialize;
use tracing::debug;

use super::error::ChurnError;
use super::table::{category_labels, has_column};

/// A whitelisted categorical column that gets a filter control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterColumn {
    pub name: &'static str,
    pub label: &'static str,
}

/// Filterable columns, in the order their controls are presented
pub const FILTER_COLUMNS: [FilterColumn; 5] = [
    FilterColumn {
        name: "cardtype",
        label: "Card Type",
    },
    FilterColumn {
        name: "gender",
        label: "Gender",
    },
    FilterColumn {
        name: "persona",
        label: "Persona",
    },
    FilterColumn {
        name: "educationtier",
        label: "Education Tier",
    },
    FilterColumn {
        name: "demographiccluster",
        label: "Demographic Cluster",
    },
];

/// Whitelisted columns present in `df`, in presentation order
pub fn filter_controls(df: &DataFrame) -> Vec<FilterColumn> {
    FILTER_COLUMNS
        .iter()
        .filter(|fc| has_column(df, fc.name))
        .copied()
        .collect()
}

/// Distinct labels of a column in first-appearance order
pub fn distinct_values(df: &DataFrame, column: &str) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    Ok(category_labels(df, column)?
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect())
}

/// Selected values for one filter column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSelection {
    pub column: String,
    pub values: Vec<String>,
}

/// Per-column value selections, applied in order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterSelection {
    selections: Vec<ColumnSelection>,
}

impl FilterSelection {
    /// Default selection: every distinct value of every present filter column
    pub fn all(df: &DataFrame) -> Result<Self> {
        let selections = filter_controls(df)
            .into_iter()
            .map(|fc| {
                Ok(ColumnSelection {
                    column: fc.name.to_string(),
                    values: distinct_values(df, fc.name)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { selections })
    }

    /// Replace the selection of a column that has a control.
    ///
    /// Fails with [`ChurnError::MissingColumn`] for columns without one.
    pub fn set(&mut self, column: &str, values: Vec<String>) -> Result<()> {
        match self.selections.iter_mut().find(|s| s.column == column) {
            Some(selection) => {
                selection.values = values;
                Ok(())
            }
            None => Err(ChurnError::MissingColumn(column.to_string()).into()),
        }
    }

    pub fn get(&self, column: &str) -> Option<&[String]> {
        self.selections
            .iter()
            .find(|s| s.column == column)
            .map(|s| s.values.as_slice())
    }

    pub fn selections(&self) -> &[ColumnSelection] {
        &self.selections
    }

    /// Narrow `df` column by column. An empty value list keeps no rows.
    pub fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut current = df.clone();

        for selection in &self.selections {
            if !has_column(&current, &selection.column) {
                continue;
            }
            let allowed: HashSet<&str> = selection.values.iter().map(|s| s.as_str()).collect();
            let labels = category_labels(&current, &selection.column)?;
            let mask: Vec<bool> = labels.iter().map(|v| allowed.contains(v.as_str())).collect();
            let mask = BooleanChunked::from_slice("mask".into(), &mask);
            current = current.filter(&mask)?;
            debug!(column = %selection.column, rows = current.height(), "filter applied");
        }

        Ok(current)
    }
}
