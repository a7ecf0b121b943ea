//! Report module - terminal rendering and JSON export of results

pub mod dashboard;
pub mod export;
pub mod prediction;

pub use dashboard::*;
pub use export::*;
pub use prediction::*;
