//! SegForge: customer segmentation over two numeric attributes.
//!
//! The pipeline removes statistical outliers (a density-based local outlier
//! factor filter followed by progressive interquartile range filtering),
//! picks a cluster count with an elbow heuristic, partitions the records
//! with seeded K-Means, scores the partition with a silhouette-based quality
//! percentage, exports one CSV per cluster and renders a 2-D scatter plot.

pub mod cli;
pub mod data;
pub mod error;
pub mod evaluate;
pub mod export;
pub mod model;
pub mod outlier;
pub mod viz;

// Re-export public items for easier access
pub use cli::Args;
pub use data::{CustomerTable, ASSIGNMENT_COLUMN};
pub use error::{Result, SegmentationError};
pub use evaluate::{evaluate_clustering, quality_percentage, Evaluation};
pub use export::{export_clusters, ExportOutcome};
pub use model::{fit_kmeans, select_cluster_count, ElbowCurve, FitOptions, KMeansModel};
pub use outlier::{density_keep_indices, local_outlier_factors, range_keep_indices};
pub use viz::render_clusters;
