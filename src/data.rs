//! Customer table loading and feature extraction using Polars.

use std::path::Path;

use ndarray::{Array1, Array2};
use polars::prelude::*;

use crate::error::{Result, SegmentationError};

/// Name of the integer assignment column attached after clustering.
pub const ASSIGNMENT_COLUMN: &str = "Cluster";

/// A customer table plus the names of the columns the pipeline works on.
///
/// The frame keeps every column from the source file so exports can pass them
/// through untouched. Rows are only ever removed through [`CustomerTable::retain`],
/// never reordered, which keeps the table in one-to-one correspondence with any
/// feature matrix derived from it.
#[derive(Debug, Clone)]
pub struct CustomerTable {
    df: DataFrame,
    /// Column holding the unique record identifier.
    pub id_column: String,
    /// First attribute used for clustering.
    pub feature_a: String,
    /// Second attribute used for clustering.
    pub feature_b: String,
}

impl CustomerTable {
    /// Wrap an already-loaded frame, dropping rows with nulls in the
    /// identifier or attribute columns.
    pub fn from_frame(
        df: DataFrame,
        id_column: &str,
        feature_a: &str,
        feature_b: &str,
    ) -> Result<Self> {
        for column in [id_column, feature_a, feature_b] {
            if !df.get_column_names().contains(&column) {
                return Err(SegmentationError::MissingColumn(column.to_string()));
            }
        }

        let mask = df.column(id_column)?.is_not_null()
            & df.column(feature_a)?.is_not_null()
            & df.column(feature_b)?.is_not_null();
        let df = df.filter(&mask)?;

        Ok(CustomerTable {
            df,
            id_column: id_column.to_string(),
            feature_a: feature_a.to_string(),
            feature_b: feature_b.to_string(),
        })
    }

    /// Load a CSV file with a header row.
    pub fn load(
        path: impl AsRef<Path>,
        id_column: &str,
        feature_a: &str,
        feature_b: &str,
    ) -> Result<Self> {
        let df = CsvReader::from_path(path.as_ref())?.has_header(true).finish()?;
        Self::from_frame(df, id_column, feature_a, feature_b)
    }

    /// Number of records currently in the table.
    pub fn len(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// The underlying frame, all original columns included.
    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    /// Project the two attribute columns into an (n, 2) feature matrix.
    ///
    /// Row i of the matrix corresponds to row i of the table.
    pub fn features(&self) -> Result<Array2<f64>> {
        let a = self.attribute(&self.feature_a)?;
        let b = self.attribute(&self.feature_b)?;

        let mut data = Vec::with_capacity(a.len() * 2);
        for i in 0..a.len() {
            data.push(a[i]);
            data.push(b[i]);
        }

        Ok(Array2::from_shape_vec((a.len(), 2), data)?)
    }

    /// One attribute column as f64 values, in row order.
    pub fn attribute(&self, name: &str) -> Result<Vec<f64>> {
        let series = self
            .df
            .column(name)
            .map_err(|_| SegmentationError::MissingColumn(name.to_string()))?
            .cast(&DataType::Float64)?;
        Ok(series.f64()?.into_no_null_iter().collect())
    }

    /// Record identifiers rendered as strings, in row order.
    pub fn ids(&self) -> Result<Vec<String>> {
        let series = self.df.column(&self.id_column)?.cast(&DataType::Utf8)?;
        Ok(series
            .utf8()?
            .into_no_null_iter()
            .map(str::to_string)
            .collect())
    }

    /// A new table holding only the rows at `keep`, in the given order.
    ///
    /// Filters hand back row indices rather than values so that dropping a
    /// feature point always drops the matching record as well.
    pub fn retain(&self, keep: &[usize]) -> Result<Self> {
        let indices: Vec<IdxSize> = keep.iter().map(|&i| i as IdxSize).collect();
        let idx = IdxCa::from_vec("keep", indices);
        Ok(CustomerTable {
            df: self.df.take(&idx)?,
            id_column: self.id_column.clone(),
            feature_a: self.feature_a.clone(),
            feature_b: self.feature_b.clone(),
        })
    }

    /// A new table with the integer assignment column attached.
    pub fn with_assignments(&self, labels: &Array1<usize>) -> Result<Self> {
        if labels.len() != self.df.height() {
            return Err(SegmentationError::AssignmentMismatch {
                labels: labels.len(),
                rows: self.df.height(),
            });
        }

        let column: Vec<u32> = labels.iter().map(|&l| l as u32).collect();
        let mut df = self.df.clone();
        df.with_column(Series::new(ASSIGNMENT_COLUMN, column))?;

        Ok(CustomerTable {
            df,
            id_column: self.id_column.clone(),
            feature_a: self.feature_a.clone(),
            feature_b: self.feature_b.clone(),
        })
    }
}
