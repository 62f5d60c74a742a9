//! Per-cluster CSV export with range-derived file names.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use polars::prelude::*;

use crate::data::{CustomerTable, ASSIGNMENT_COLUMN};
use crate::error::{Result, SegmentationError};

/// What the export pass produced.
#[derive(Debug, Default)]
pub struct ExportOutcome {
    /// Files written, one per non-empty cluster, in cluster-index order.
    pub written: Vec<PathBuf>,
    /// Cluster indices that had no members and were skipped.
    pub skipped: Vec<usize>,
}

/// Write one CSV per cluster index into `out_dir`, creating the directory if
/// it does not exist. Each file carries the group's full rows, all original
/// columns plus the assignment column.
///
/// An empty cluster (possible after aggressive outlier removal) is skipped
/// rather than written as an empty file; its index is reported back so the
/// caller can surface the omission.
pub fn export_clusters(
    table: &CustomerTable,
    n_clusters: usize,
    out_dir: impl AsRef<Path>,
) -> Result<ExportOutcome> {
    let out_dir = out_dir.as_ref();
    fs::create_dir_all(out_dir)?;

    let mut outcome = ExportOutcome::default();
    for index in 0..n_clusters {
        match write_cluster(table, index, out_dir) {
            Ok(path) => outcome.written.push(path),
            Err(SegmentationError::EmptyCluster(i)) => outcome.skipped.push(i),
            Err(other) => return Err(other),
        }
    }
    Ok(outcome)
}

fn write_cluster(table: &CustomerTable, index: usize, out_dir: &Path) -> Result<PathBuf> {
    let df = table.frame();
    let mask = df.column(ASSIGNMENT_COLUMN)?.u32()?.equal(index as u32);
    let mut group = df.filter(&mask)?;

    if group.height() == 0 {
        return Err(SegmentationError::EmptyCluster(index));
    }

    let name = cluster_name(&group, &table.feature_a, &table.feature_b)?;
    let path = out_dir.join(format!("{name}.csv"));

    let mut file = File::create(&path)?;
    CsvWriter::new(&mut file).finish(&mut group)?;

    Ok(path)
}

/// Descriptive group name derived from the min/max of each attribute,
/// e.g. `Cluster_A_18-25_S_39-81` for Age 18-25 and Spending Score 39-81.
fn cluster_name(group: &DataFrame, feature_a: &str, feature_b: &str) -> Result<String> {
    let (a_min, a_max) = column_range(group, feature_a)?;
    let (b_min, b_max) = column_range(group, feature_b)?;
    Ok(format!(
        "Cluster_{}_{}-{}_{}_{}-{}",
        column_prefix(feature_a),
        format_bound(a_min),
        format_bound(a_max),
        column_prefix(feature_b),
        format_bound(b_min),
        format_bound(b_max),
    ))
}

fn column_range(df: &DataFrame, name: &str) -> Result<(f64, f64)> {
    let series = df.column(name)?.cast(&DataType::Float64)?;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for value in series.f64()?.into_no_null_iter() {
        min = min.min(value);
        max = max.max(value);
    }
    Ok((min, max))
}

fn column_prefix(name: &str) -> char {
    name.chars()
        .find(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or('X')
}

/// Whole values print without a decimal point so names stay stable across
/// integer and float source columns.
fn format_bound(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value:.1}")
    }
}
