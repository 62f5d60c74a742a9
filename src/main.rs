//! SegForge CLI entrypoint: orchestrates loading, outlier filtering, cluster
//! count selection, K-Means fitting, evaluation, export and visualization.
//!
//! Every stage consumes an immutable snapshot and returns a new collection;
//! the orchestrator threads those snapshots between stages, so a failure at
//! any point aborts the run before artifacts are written.

use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use segforge::{
    density_keep_indices, evaluate_clustering, export_clusters, fit_kmeans, range_keep_indices,
    render_clusters, select_cluster_count, Args, CustomerTable,
};

fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        println!("SegForge - Customer Segmentation");
        println!("================================\n");
    }

    run_pipeline(&args)
}

fn run_pipeline(args: &Args) -> Result<()> {
    let start_time = Instant::now();
    let opts = args.fit_options();

    // Step 1: load the table
    let table = CustomerTable::load(&args.input, &args.id_column, &args.feature_a, &args.feature_b)?;
    println!("✓ Data loaded: {} customers", table.len());
    if args.verbose {
        println!("  Input file: {}", args.input);
        println!("  Clustering on: {} / {}", args.feature_a, args.feature_b);
    }

    // Step 2: density outlier filter over the full feature matrix
    let features = table.features()?;
    let keep = density_keep_indices(&features, args.neighbors, args.contamination)?;
    let removed = table.len() - keep.len();
    let table = table.retain(&keep)?;
    println!("✓ Density filter removed {removed} outliers ({} remain)", table.len());

    // Step 3: interquartile range filter, one attribute at a time, each pass
    // narrowing the previous pass's output
    let mut table = table;
    for column in [&args.feature_a, &args.feature_b] {
        let values = table.attribute(column)?;
        let keep =
            range_keep_indices(&values, args.lower_quantile, args.upper_quantile, args.multiplier)?;
        let removed = table.len() - keep.len();
        table = table.retain(&keep)?;
        if args.verbose {
            println!("  Range filter on {column:?} removed {removed} records");
        }
    }
    println!("✓ Range filter done: {} records remain", table.len());

    // Step 4: elbow search over candidate cluster counts
    let features = table.features()?;
    let elbow = select_cluster_count(&features, args.max_k, &opts)?;
    println!("\nOptimal cluster count: {}", elbow.chosen);
    if args.verbose {
        for (i, wcss) in elbow.wcss.iter().enumerate() {
            println!("  k={}: WCSS {:.2}", i + 1, wcss);
        }
    }

    // Step 5: final fit and evaluation
    let model = fit_kmeans(&features, elbow.chosen, &opts)?;
    let eval = evaluate_clustering(&features, &model.labels, &model.centroids)?;

    println!("Within-Cluster Sum of Squares (WCSS): {:.2}", eval.wcss);
    println!("Silhouette Score (Percentage): {:.1}", eval.quality);
    if args.verbose {
        println!("  Clusterer inertia (cross-check): {:.2}", model.inertia);
        println!("  Mean silhouette coefficient: {:.3}", eval.silhouette);
    }

    println!("\n=== Cluster Sizes ===");
    for (index, &size) in model.cluster_sizes().iter().enumerate() {
        let percentage = (size as f64 / table.len() as f64) * 100.0;
        println!("Cluster {index}: {size} customers ({percentage:.1}%)");
    }

    // Step 6: export one CSV per cluster
    let labeled = table.with_assignments(&model.labels)?;
    let outcome = export_clusters(&labeled, model.n_clusters, &args.out_dir)?;
    for index in &outcome.skipped {
        println!("! Cluster {index} is empty; no file written");
    }
    println!("\n✓ Wrote {} cluster files to {}", outcome.written.len(), args.out_dir);

    // Step 7: scatter plot
    render_clusters(
        &features,
        &model.labels,
        &model.centroids,
        (&args.feature_a, &args.feature_b),
        &args.plot,
    )?;
    println!("✓ Scatter plot saved to {}", args.plot);

    println!("\nTotal processing time: {:.2}s", start_time.elapsed().as_secs_f64());
    Ok(())
}
