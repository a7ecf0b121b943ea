//! Dataset ingestion for uploaded CSV and Parquet files

use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;
use tracing::{debug, info};

use super::error::ChurnError;
use super::target::validate_target;

/// On-disk formats accepted as an upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Csv,
    Parquet,
}

impl DatasetFormat {
    /// Pick the format from a file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "csv" => Ok(DatasetFormat::Csv),
            "parquet" => Ok(DatasetFormat::Parquet),
            _ => anyhow::bail!(
                "Unsupported file format: {}. Supported formats: csv, parquet",
                extension
            ),
        }
    }
}

/// Options controlling how an upload is parsed
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Number of rows used for CSV schema inference
    pub infer_schema_length: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            infer_schema_length: 10000,
        }
    }
}

/// Normalize a column name: trim, lowercase, each interior space to `_`
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Rename every column of `df` to its normalized form.
///
/// Fails with [`ChurnError::DuplicateColumn`] when two names collide.
pub fn normalize_columns(df: DataFrame) -> Result<DataFrame> {
    let mut seen = std::collections::HashSet::new();
    let mut columns: Vec<Column> = Vec::with_capacity(df.width());

    for col in df.get_columns() {
        let normalized = normalize_column_name(col.name());
        if !seen.insert(normalized.clone()) {
            return Err(ChurnError::DuplicateColumn(normalized).into());
        }
        let mut series = col.as_materialized_series().clone();
        series.rename(normalized.into());
        columns.push(Column::from(series));
    }

    Ok(DataFrame::new(columns)?)
}

/// Parse an uploaded byte stream, normalize its columns and validate the target.
///
/// This is the only entry point that produces a session table; nothing
/// downstream runs when it fails.
pub fn ingest_bytes(
    bytes: Vec<u8>,
    format: DatasetFormat,
    target: &str,
    options: &IngestOptions,
) -> Result<DataFrame> {
    let raw = match format {
        DatasetFormat::Csv => {
            let infer = match options.infer_schema_length {
                0 => None,
                n => Some(n),
            };
            CsvReadOptions::default()
                .with_has_header(true)
                .with_infer_schema_length(infer)
                .into_reader_with_file_handle(Cursor::new(bytes))
                .finish()
                .context("Failed to parse CSV data")?
        }
        DatasetFormat::Parquet => ParquetReader::new(Cursor::new(bytes))
            .finish()
            .context("Failed to parse Parquet data")?,
    };
    debug!(rows = raw.height(), cols = raw.width(), "parsed upload");

    let mut df = normalize_columns(raw)?;
    validate_target(&df, target)?;

    // An all-null flag may have been inferred as text; downstream reads it as numeric
    let target_col = df.column(target)?;
    if target_col.null_count() == df.height() && target_col.dtype() != &DataType::Float64 {
        let casted = target_col.cast(&DataType::Float64)?;
        df.with_column(casted)?;
    }

    info!(rows = df.height(), cols = df.width(), target_column = target, "dataset ingested");
    Ok(df)
}

/// Read a dataset file and ingest it
pub fn load_dataset(path: &Path, target: &str, options: &IngestOptions) -> Result<DataFrame> {
    let format = DatasetFormat::from_path(path)?;
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read dataset file: {}", path.display()))?;
    ingest_bytes(bytes, format, target, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_column_name() {
        assert_eq!(normalize_column_name("  Attrition Flag "), "attrition_flag");
        assert_eq!(normalize_column_name("CardType"), "cardtype");
        assert_eq!(normalize_column_name("Income  Bucket"), "income__bucket");
        assert_eq!(normalize_column_name("Total Spend"), "total_spend");
        assert_eq!(normalize_column_name("already_ok"), "already_ok");
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            DatasetFormat::from_path(Path::new("a/b.CSV")).unwrap(),
            DatasetFormat::Csv
        );
        assert_eq!(
            DatasetFormat::from_path(Path::new("b.parquet")).unwrap(),
            DatasetFormat::Parquet
        );
        assert!(DatasetFormat::from_path(Path::new("b.xlsx")).is_err());
    }
}
