//! Long-running services behind the CLI commands

pub mod analysis;
pub mod scheduler;

pub use analysis::AnalysisService;
pub use scheduler::{JobsStatus, Scheduler};
