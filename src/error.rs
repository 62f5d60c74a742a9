//! Error types shared across the segmentation pipeline.
//!
//! Every stage failure is terminal for the current run: the pipeline aborts
//! before any artifact is written rather than exporting a partial result.

use std::path::PathBuf;

/// Errors raised by the segmentation pipeline.
#[derive(Debug, thiserror::Error)]
pub enum SegmentationError {
    /// Too few points for the requested neighborhood size.
    #[error("not enough points for a {need}-nearest-neighbor search: have {have}, need at least {}", .need + 1)]
    InsufficientData { have: usize, need: usize },

    /// A filtering pass eliminated every remaining record.
    #[error("outlier filtering removed every remaining record")]
    EmptyResult,

    /// Requested cluster count is outside the valid range for the data.
    #[error("invalid cluster count {k}: must be between 1 and {max}")]
    InvalidClusterCount { k: usize, max: usize },

    /// The silhouette coefficient is undefined for this clustering.
    #[error("silhouette is undefined for {k} clusters over {n} points")]
    DegenerateClustering { k: usize, n: usize },

    /// A cluster index ended up with zero members.
    #[error("cluster {0} has no members")]
    EmptyCluster(usize),

    /// A configured column is missing from the input table.
    #[error("column {0:?} is missing from the input table")]
    MissingColumn(String),

    /// Assignment labels do not line up with the record rows.
    #[error("{labels} assignment labels for {rows} rows")]
    AssignmentMismatch { labels: usize, rows: usize },

    /// A parameter failed validation before the pipeline started.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Rendering the scatter plot failed.
    #[error("failed to render {}: {message}", .path.display())]
    Plot { path: PathBuf, message: String },

    #[error(transparent)]
    KMeans(#[from] linfa_clustering::KMeansError),

    #[error(transparent)]
    Polars(#[from] polars::prelude::PolarsError),

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Common result type used throughout the crate.
pub type Result<T> = std::result::Result<T, SegmentationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SegmentationError::InsufficientData { have: 10, need: 20 };
        assert_eq!(
            err.to_string(),
            "not enough points for a 20-nearest-neighbor search: have 10, need at least 21"
        );

        let err = SegmentationError::InvalidClusterCount { k: 9, max: 4 };
        assert_eq!(err.to_string(), "invalid cluster count 9: must be between 1 and 4");

        let err = SegmentationError::EmptyCluster(2);
        assert_eq!(err.to_string(), "cluster 2 has no members");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<SegmentationError>();
        assert_sync::<SegmentationError>();
    }
}
