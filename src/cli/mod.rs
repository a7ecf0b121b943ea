//! CLI module - argument parsing, interactive prompts and the dashboard viewer

mod args;
mod dashboard_view;
mod prompts;

pub use args::*;
pub use dashboard_view::*;
pub use prompts::*;
