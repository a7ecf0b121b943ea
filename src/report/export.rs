//! Dashboard JSON export

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::{ColumnSelection, Dashboard, FilterSelection};

/// Metadata about the dashboard run
#[derive(Serialize)]
pub struct ExportMetadata {
    /// Timestamp of the export (ISO 8601 format)
    pub timestamp: String,
    /// Churnscope version
    pub churnscope_version: String,
    /// Input file path
    pub input_file: String,
    /// Target column name
    pub target_column: String,
    /// Rows left after filtering
    pub filtered_rows: usize,
}

/// Complete dashboard export with metadata
#[derive(Serialize)]
pub struct DashboardExport<'a> {
    pub metadata: ExportMetadata,
    /// Active filter selections, one per filter control
    pub filters: &'a [ColumnSelection],
    #[serde(flatten)]
    pub dashboard: &'a Dashboard,
}

/// Parameters for the dashboard export
pub struct ExportParams<'a> {
    pub input_file: &'a str,
    pub target_column: &'a str,
    pub filters: &'a FilterSelection,
}

/// Build the export document for `dashboard`
pub fn dashboard_export<'a>(dashboard: &'a Dashboard, params: &ExportParams<'a>) -> DashboardExport<'a> {
    DashboardExport {
        metadata: ExportMetadata {
            timestamp: Utc::now().to_rfc3339(),
            churnscope_version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: params.input_file.to_string(),
            target_column: params.target_column.to_string(),
            filtered_rows: dashboard.metrics.total_customers,
        },
        filters: params.filters.selections(),
        dashboard,
    }
}

/// Write the dashboard and its run metadata to a JSON file
pub fn export_dashboard(
    dashboard: &Dashboard,
    output_path: &Path,
    params: &ExportParams,
) -> Result<()> {
    let export = dashboard_export(dashboard, params);

    let json =
        serde_json::to_string_pretty(&export).context("Failed to serialize dashboard to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write dashboard to {}", output_path.display()))?;

    Ok(())
}
