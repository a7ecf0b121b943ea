//! Command-line argument definitions using clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::pipeline::{EducationLevel, MaritalStatus, TARGET_COLUMN};

/// Churnscope - Churn dashboards and churn predictions for credit-card customers
#[derive(Parser, Debug)]
#[command(name = "churnscope")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides this.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Explore churn across demographics, behavior, lifecycle and retention
    Dashboard(DashboardArgs),

    /// Train a churn model on the dataset and score a single customer
    Predict(PredictArgs),
}

/// Dataset options shared by both screens
#[derive(Args, Debug, Clone)]
pub struct DatasetArgs {
    /// Input file path (CSV or Parquet)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Binary churn flag column, matched after column-name normalization
    #[arg(short, long, default_value = TARGET_COLUMN)]
    pub target: String,

    /// Number of rows to use for schema inference (CSV only).
    /// Higher values improve type detection for ambiguous columns but may be slower.
    /// Use 0 for full table scan (very slow for large files).
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,
}

#[derive(Args, Debug)]
pub struct DashboardArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Restrict a filter column to the listed values, e.g. `--filter gender=F,M`.
    /// Repeat for several columns. Columns not named keep every value selected.
    #[arg(long = "filter", value_name = "COLUMN=V1,V2", value_parser = parse_filter)]
    pub filters: Vec<FilterArg>,

    /// Print the dashboard as plain tables instead of the interactive viewer
    #[arg(long, default_value = "false")]
    pub plain: bool,

    /// Skip interactive prompts (implies --plain)
    #[arg(long, default_value = "false")]
    pub no_confirm: bool,

    /// Write the dashboard to this JSON file
    #[arg(long)]
    pub export: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Customer age in years (18-100)
    #[arg(long)]
    pub age: Option<u32>,

    /// Annual income (0-10,000,000)
    #[arg(long, value_parser = parse_amount)]
    pub income: Option<f64>,

    /// Total number of transactions (0-1000)
    #[arg(long)]
    pub transactions: Option<u32>,

    /// Total spend (0-1,000,000)
    #[arg(long, value_parser = parse_amount)]
    pub spend: Option<f64>,

    /// Tenure in months (0-120)
    #[arg(long)]
    pub tenure: Option<u32>,

    /// Marital status: married, single, divorced or widowed
    #[arg(long)]
    pub marital_status: Option<MaritalStatus>,

    /// Education level: high_school, bachelor, master or phd
    #[arg(long)]
    pub education: Option<EducationLevel>,

    /// Skip interactive prompts; missing inputs take their defaults
    #[arg(long, default_value = "false")]
    pub no_confirm: bool,
}

/// One `--filter column=v1,v2` argument
#[derive(Debug, Clone, PartialEq)]
pub struct FilterArg {
    pub column: String,
    pub values: Vec<String>,
}

/// Validator for --filter arguments
fn parse_filter(s: &str) -> Result<FilterArg, String> {
    let (column, values) = s
        .split_once('=')
        .ok_or_else(|| format!("'{}' is not of the form COLUMN=V1,V2", s))?;

    let column = column.trim();
    if column.is_empty() {
        return Err(format!("'{}' has an empty column name", s));
    }

    let values = values
        .split(',')
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();

    Ok(FilterArg {
        column: column.to_lowercase(),
        values,
    })
}

/// Validator for non-negative money amounts
fn parse_amount(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .replace(',', "")
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if !value.is_finite() || value < 0.0 {
        Err(format!("amount must be a non-negative number, got {}", s))
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        let f = parse_filter("Gender=F, M").unwrap();
        assert_eq!(f.column, "gender");
        assert_eq!(f.values, vec!["F", "M"]);

        let empty = parse_filter("persona=").unwrap();
        assert!(empty.values.is_empty());

        assert!(parse_filter("persona").is_err());
        assert!(parse_filter("=a").is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("50,000").unwrap(), 50_000.0);
        assert!(parse_amount("-1").is_err());
        assert!(parse_amount("abc").is_err());
    }
}
