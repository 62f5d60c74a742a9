//! Cluster scatter plot rendering using Plotters.

use std::path::PathBuf;

use ndarray::{Array1, Array2};
use plotters::prelude::*;

use crate::error::{Result, SegmentationError};

/// Deterministic color for a cluster index.
///
/// The hue advances by the golden ratio per index, so any number of clusters
/// gets visually separable colors without a fixed palette running out.
pub fn cluster_color(index: usize) -> HSLColor {
    HSLColor((index as f64 * 0.618_033_988_749_895).fract(), 0.68, 0.45)
}

/// Render the feature matrix as a scatter plot, points colored by cluster
/// assignment, centroids drawn as black squares.
///
/// Consumes the clustering read-only: the feature matrix, the assignment
/// labels and the centroid list are exactly the data the core hands to any
/// external renderer.
pub fn render_clusters(
    features: &Array2<f64>,
    labels: &Array1<usize>,
    centroids: &Array2<f64>,
    axes: (&str, &str),
    output_path: &str,
) -> Result<()> {
    let plot_err = |message: String| SegmentationError::Plot {
        path: PathBuf::from(output_path),
        message,
    };

    let xs: Vec<f64> = features.column(0).to_vec();
    let ys: Vec<f64> = features.column(1).to_vec();

    let (x_min, x_max) = padded_bounds(&xs);
    let (y_min, y_max) = padded_bounds(&ys);

    let root = BitMapBackend::new(output_path, (800, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| plot_err(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Customer Segments", ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(|e| plot_err(e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc(axes.0)
        .y_desc(axes.1)
        .axis_desc_style(("sans-serif", 15))
        .draw()
        .map_err(|e| plot_err(e.to_string()))?;

    for (i, (&x, &y)) in xs.iter().zip(ys.iter()).enumerate() {
        let color = cluster_color(labels[i]);
        chart
            .draw_series(std::iter::once(Circle::new((x, y), 4, color.filled())))
            .map_err(|e| plot_err(e.to_string()))?;
    }

    // Centroid markers sized relative to the data span.
    let dx = (x_max - x_min) * 0.012;
    let dy = (y_max - y_min) * 0.012;
    for (index, centroid) in centroids.outer_iter().enumerate() {
        let (cx, cy) = (centroid[0], centroid[1]);
        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(cx - dx, cy - dy), (cx + dx, cy + dy)],
                BLACK.filled(),
            )))
            .map_err(|e| plot_err(e.to_string()))?
            .label(format!("Cluster {index} centroid"))
            .legend(move |(x, y)| Rectangle::new([(x, y), (x + 10, y + 10)], BLACK.filled()));
    }

    chart
        .configure_series_labels()
        .draw()
        .map_err(|e| plot_err(e.to_string()))?;

    root.present().map_err(|e| plot_err(e.to_string()))?;
    Ok(())
}

fn padded_bounds(values: &[f64]) -> (f64, f64) {
    let min = values.iter().fold(f64::INFINITY, |a, &b| a.min(b));
    let max = values.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    let pad = ((max - min) * 0.05).max(1.0);
    (min - pad, max + pad)
}
