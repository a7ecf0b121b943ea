//! Dashboard assembly: metrics, drawable charts and insights for one table

use anyhow::Result;
use polars::prelude::*;
use serde::Serialize;
use tracing::debug;

use super::aggregate::{churn_rate_by, key_metrics, ChurnSummary, KeyMetrics};
use super::bucket::churn_by_transaction_bucket;
use super::capability::{plan_charts, Chart, Section};
use super::narrative::{
    behavioral_insight, demographic_insight, lifecycle_insight, retention_insight, Insight,
};
use super::table::{numeric_values, Schema};
use super::target::target_values;

/// One customer in the spend-vs-utilization scatter
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub utilization: f64,
    pub spend: f64,
    pub churned: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChartBody {
    Rates(ChurnSummary),
    Scatter { points: Vec<ScatterPoint> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub chart: Chart,
    pub body: ChartBody,
}

impl ChartData {
    pub fn rates(&self) -> Option<&ChurnSummary> {
        match &self.body {
            ChartBody::Rates(summary) => Some(summary),
            ChartBody::Scatter { .. } => None,
        }
    }
}

/// Everything the presentation layer renders for one (filtered) table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub metrics: KeyMetrics,
    pub charts: Vec<ChartData>,
    /// Charts left out because a required column is absent
    pub skipped: Vec<Chart>,
    pub insights: Vec<Insight>,
}

impl Dashboard {
    pub fn chart(&self, chart: Chart) -> Option<&ChartData> {
        self.charts.iter().find(|c| c.chart == chart)
    }

    pub fn charts_in(&self, section: Section) -> impl Iterator<Item = &ChartData> {
        self.charts.iter().filter(move |c| c.chart.section() == section)
    }
}

fn scatter_points(df: &DataFrame, target: &str) -> Result<Vec<ScatterPoint>> {
    let utilization = numeric_values(df, "utilizationrate")?;
    let spend = numeric_values(df, "totalspend")?;
    let targets = target_values(df, target)?;

    Ok(utilization
        .into_iter()
        .zip(spend)
        .zip(targets)
        .filter_map(|((u, s), t)| {
            Some(ScatterPoint {
                utilization: u?,
                spend: s?,
                churned: t? >= 0.5,
            })
        })
        .collect())
}

fn chart_body(chart: Chart, df: &DataFrame, target: &str) -> Result<ChartBody> {
    let body = match chart {
        Chart::SpendVsUtilization => ChartBody::Scatter {
            points: scatter_points(df, target)?,
        },
        Chart::ChurnByTransactionLevel => {
            ChartBody::Rates(churn_by_transaction_bucket(df, "totaltransactions", target)?)
        }
        _ => ChartBody::Rates(churn_rate_by(df, chart.required_columns(), target)?),
    };
    Ok(body)
}

/// Build the dashboard for `df`, skipping charts the schema cannot support
pub fn build_dashboard(df: &DataFrame, target: &str) -> Result<Dashboard> {
    let schema = Schema::from_frame(df);
    let (drawable, skipped) = plan_charts(&schema);
    debug!(drawable = drawable.len(), skipped = skipped.len(), "chart plan");

    let metrics = key_metrics(df, target)?;
    let charts = drawable
        .into_iter()
        .map(|chart| {
            Ok(ChartData {
                chart,
                body: chart_body(chart, df, target)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let rates_of = |chart: Chart| {
        charts
            .iter()
            .find(|c| c.chart == chart)
            .and_then(|c| c.rates())
    };

    let insights = [
        rates_of(Chart::ChurnByGender).and_then(demographic_insight),
        behavioral_insight(metrics.avg_spend, metrics.avg_transactions),
        rates_of(Chart::ChurnByTenure).and_then(lifecycle_insight),
        rates_of(Chart::PersonaIncomeHeatmap).and_then(retention_insight),
    ]
    .into_iter()
    .flatten()
    .collect();

    Ok(Dashboard {
        metrics,
        charts,
        skipped,
        insights,
    })
}
