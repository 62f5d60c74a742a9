//! Command-line interface definitions and argument parsing.

use clap::Parser;

use crate::model::FitOptions;

/// Customer segmentation CLI: outlier filtering, elbow cluster-count
/// selection, K-Means clustering and per-cluster export.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input CSV file
    #[arg(short, long, default_value = "Mall_Customers.csv")]
    pub input: String,

    /// Column holding the unique record identifier
    #[arg(long, default_value = "CustomerID")]
    pub id_column: String,

    /// First attribute to cluster on
    #[arg(long, default_value = "Age")]
    pub feature_a: String,

    /// Second attribute to cluster on
    #[arg(long, default_value = "Spending Score")]
    pub feature_b: String,

    /// Directory receiving one CSV per cluster
    #[arg(short, long, default_value = "clustered_csv")]
    pub out_dir: String,

    /// Output path for the scatter plot
    #[arg(short, long, default_value = "cluster_plot.png")]
    pub plot: String,

    /// Largest cluster count probed by the elbow search
    #[arg(long, default_value = "6")]
    pub max_k: usize,

    /// Neighborhood size for the density outlier filter
    #[arg(long, default_value = "20")]
    pub neighbors: usize,

    /// Expected outlier fraction, in [0, 1)
    #[arg(long, default_value = "0.05")]
    pub contamination: f64,

    /// Lower quantile for the interquartile range filter
    #[arg(long, default_value = "0.25")]
    pub lower_quantile: f64,

    /// Upper quantile for the interquartile range filter
    #[arg(long, default_value = "0.75")]
    pub upper_quantile: f64,

    /// Interquartile range multiplier
    #[arg(long, default_value = "1.5")]
    pub multiplier: f64,

    /// Seed driving every randomized step
    #[arg(long, default_value = "0")]
    pub seed: u64,

    /// K-Means restarts per candidate cluster count
    #[arg(long, default_value = "10")]
    pub restarts: usize,

    /// Maximum iterations for K-Means convergence
    #[arg(long, default_value = "300")]
    pub max_iters: u64,

    /// Tolerance for K-Means convergence
    #[arg(long, default_value = "1e-4")]
    pub tolerance: f64,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// The K-Means knobs shared by the elbow search and the final fit.
    pub fn fit_options(&self) -> FitOptions {
        FitOptions {
            seed: self.seed,
            restarts: self.restarts,
            max_iters: self.max_iters,
            tolerance: self.tolerance,
        }
    }
}
