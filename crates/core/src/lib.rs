pub mod config;
pub mod error;
pub mod metrics;
pub mod types;

pub use config::AnalysisConfig;
pub use error::{InsightError, InsightResult};
