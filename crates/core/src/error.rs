use thiserror::Error;

pub type InsightResult<T> = Result<T, InsightError>;

#[derive(Error, Debug)]
pub enum InsightError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    #[error("Missing column '{0}' in input data")]
    MissingColumn(String),

    #[error("Warehouse query error: {0}")]
    Warehouse(String),

    #[error("Target store error: {0}")]
    TargetStore(String),

    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
