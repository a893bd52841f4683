use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by configuration loading and the drift detector.
///
/// Aggregators never return these: absent data degrades to defaults.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("baseline has {baseline} feature columns but current sample has {current}")]
    ShapeMismatch { baseline: usize, current: usize },
    #[error("expected {features} feature names, got {names}")]
    FeatureCount { features: usize, names: usize },
    #[error("predictions and actuals must have equal lengths ({predictions} vs {actuals})")]
    LengthMismatch { predictions: usize, actuals: usize },
}
