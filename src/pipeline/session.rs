//! Session context: the ingested table every pipeline stage works from
//!
//! A session is created per upload and rebuilt from scratch on the next one.
//! Filter changes and predictions recompute from `table` each time; nothing
//! derived from it is cached.

use std::path::{Path, PathBuf};

use anyhow::Result;
use indicatif::ProgressBar;
use polars::prelude::*;

use super::dashboard::{build_dashboard, Dashboard};
use super::filter::FilterSelection;
use super::loader::{ingest_bytes, load_dataset, DatasetFormat, IngestOptions};
use super::predictor::{train_model, ChurnModel};

#[derive(Debug, Clone)]
pub struct Session {
    table: DataFrame,
    target: String,
    source: Option<PathBuf>,
}

impl Session {
    /// Ingest an upload held in memory
    pub fn from_bytes(
        bytes: Vec<u8>,
        format: DatasetFormat,
        target: &str,
        options: &IngestOptions,
    ) -> Result<Self> {
        Ok(Self {
            table: ingest_bytes(bytes, format, target, options)?,
            target: target.to_string(),
            source: None,
        })
    }

    /// Ingest a dataset file
    pub fn open(path: &Path, target: &str, options: &IngestOptions) -> Result<Self> {
        Ok(Self {
            table: load_dataset(path, target, options)?,
            target: target.to_string(),
            source: Some(path.to_path_buf()),
        })
    }

    pub fn table(&self) -> &DataFrame {
        &self.table
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Filter selection with every value of every control selected
    pub fn default_filters(&self) -> Result<FilterSelection> {
        FilterSelection::all(&self.table)
    }

    pub fn filtered(&self, selection: &FilterSelection) -> Result<DataFrame> {
        selection.apply(&self.table)
    }

    /// Filter the session table and build the dashboard for what is left
    pub fn dashboard(&self, selection: &FilterSelection) -> Result<Dashboard> {
        let filtered = self.filtered(selection)?;
        build_dashboard(&filtered, &self.target)
    }

    /// Train a fresh model on the full, unfiltered table
    pub fn train(&self, progress: Option<&ProgressBar>) -> Result<ChurnModel> {
        train_model(&self.table, &self.target, progress)
    }
}
