//! Churnscope: Customer Churn Intelligence Library
//!
//! Builds churn dashboards (key metrics, grouped churn rates, narrative
//! insights) from a credit-card customer table, and trains a boosted-tree
//! classifier that scores single customers entered by hand.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
