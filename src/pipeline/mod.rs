//! Pipeline module - ingestion, dashboard aggregation and churn prediction

pub mod aggregate;
pub mod bucket;
pub mod capability;
pub mod classifier;
pub mod dashboard;
pub mod error;
pub mod features;
pub mod filter;
pub mod loader;
pub mod narrative;
pub mod predictor;
pub mod session;
pub mod table;
pub mod target;

pub use aggregate::*;
pub use bucket::*;
pub use capability::*;
pub use classifier::{BoostParams, BoostedTrees};
pub use dashboard::*;
pub use error::*;
pub use features::*;
pub use filter::*;
pub use loader::*;
pub use narrative::*;
pub use predictor::*;
pub use session::*;
pub use table::*;
pub use target::*;
