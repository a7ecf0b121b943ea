//! Shared test utilities and fixture generators
#![allow(dead_code)]

use polars::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

/// A small customer table with every dashboard column present.
///
/// - `attritionflag`: 3 of 8 customers churned
/// - `gender`: F churns 1/4, M churns 2/4
/// - `persona` × `income_bucket`: Spender/High is the riskiest pair
/// - `totaltransactions`: one value in each transaction bucket plus a 0
pub fn create_churn_dataframe() -> DataFrame {
    df! {
        "attritionflag" => [1i32, 0, 0, 1, 0, 1, 0, 0],
        "gender" => ["F", "F", "F", "M", "M", "M", "F", "M"],
        "cardtype" => ["Blue", "Gold", "Blue", "Blue", "Silver", "Gold", "Blue", "Blue"],
        "persona" => ["Spender", "Saver", "Saver", "Spender", "Saver", "Spender", "Saver", "Saver"],
        "educationtier" => ["Graduate", "Graduate", "College", "College", "Graduate", "College", "Graduate", "College"],
        "demographiccluster" => ["A", "B", "A", "B", "A", "B", "A", "B"],
        "income_bucket" => ["High", "Low", "Low", "High", "Low", "High", "High", "Low"],
        "tenuregroup" => ["0-6m", "2y+", "2y+", "0-6m", "1-2y", "0-6m", "1-2y", "2y+"],
        "creditlimit" => [1000.0f64, 2000.0, 3000.0, 4000.0, 5000.0, 6000.0, 7000.0, 8000.0],
        "utilizationrate" => [0.9f64, 0.1, 0.2, 0.8, 0.3, 0.7, 0.2, 0.1],
        "totalspend" => [100.0f64, 900.0, 800.0, 150.0, 700.0, 120.0, 600.0, 650.0],
        "totaltransactions" => [5.0f64, 20.0, 60.0, 5.0, 150.0, 0.0, 45.0, 600.0],
    }
    .unwrap()
}

/// Deterministic numeric training table where churn follows low spend
/// and short tenure.
pub fn create_training_dataframe(rows: usize) -> DataFrame {
    use rand::{Rng, SeedableRng};
    let mut rng = rand::rngs::StdRng::seed_from_u64(42);

    let mut age = Vec::with_capacity(rows);
    let mut spend = Vec::with_capacity(rows);
    let mut tenure = Vec::with_capacity(rows);
    let mut flag = Vec::with_capacity(rows);

    for _ in 0..rows {
        let a: f64 = rng.gen_range(18.0..80.0);
        let s: f64 = rng.gen_range(0.0..10_000.0);
        let t: f64 = rng.gen_range(0.0..120.0);
        let churned = s < 2_500.0 && t < 24.0;
        age.push(a);
        spend.push(s);
        tenure.push(t);
        flag.push(churned as i32);
    }

    df! {
        "age" => age,
        "totalspend" => spend,
        "tenure" => tenure,
        "attritionflag" => flag,
    }
    .unwrap()
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("customers.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("customers.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}
