//! Offline analysis of benchmark runner results: per-file latency summaries
//! grouped by scenario, plotted against the numeric run label.

pub mod aggregate;
pub mod inputs;
pub mod plot;
pub mod results;

use std::path::PathBuf;

pub use aggregate::{ScenarioDistribution, Scenarios, SkipReason};
pub use results::{LatencySummary, ResultRecord};

/// Key of the timestamp arrays plotted by default.
pub const DEFAULT_TIMES_KEY: &str = "execute_times";

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Input path '{}' not found as valid file or directory.", .0.display())]
    InvalidPath(PathBuf),
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl AnalysisError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        AnalysisError::Io {
            context: context.into(),
            source,
        }
    }
}

pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
