//! Exact flat index over dense vectors.
//!
//! Every query is compared against every stored row using squared Euclidean
//! distance. Rows are stored contiguously in insertion order, which is also
//! the tie-break order: when two rows are equally distant, the earlier one
//! ranks first.
//!
//! The index is append-only while a corpus is being built and is treated as
//! immutable afterwards. There is no delete or update operation.

use std::cmp::Ordering;

use crate::vector::{Neighbors, VectorError};

/// Exact k-nearest-neighbor index with L2 distance.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    /// Number of components per row
    dimension: usize,

    /// Number of rows stored. Tracked separately so zero-dimensional rows
    /// still count.
    rows: usize,

    /// Row-major vector data, `rows * dimension` values
    data: Vec<f32>,
}

impl FlatIndex {
    /// Creates an empty index for vectors of the given dimension.
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            rows: 0,
            data: Vec::new(),
        }
    }

    /// Rebuilds an index from raw row-major data.
    ///
    /// Used by the storage layer; the data length must equal
    /// `rows * dimension`.
    pub fn from_raw(dimension: usize, rows: usize, data: Vec<f32>) -> Result<Self, VectorError> {
        let expected = rows.checked_mul(dimension).ok_or_else(|| {
            VectorError::InvalidFormat(format!("{rows} rows of dimension {dimension} overflow"))
        })?;
        if data.len() != expected {
            return Err(VectorError::InvalidFormat(format!(
                "expected {expected} values for {rows} rows of dimension {dimension}, found {}",
                data.len()
            )));
        }
        Ok(Self {
            dimension,
            rows,
            data,
        })
    }

    /// Appends a batch of vectors.
    ///
    /// The whole batch is validated before anything is appended, so a
    /// dimension error leaves the index unchanged.
    pub fn add(&mut self, vectors: &[Vec<f32>]) -> Result<(), VectorError> {
        for vector in vectors {
            self.validate(vector)?;
        }

        self.data.reserve(vectors.len() * self.dimension);
        for vector in vectors {
            self.data.extend_from_slice(vector);
        }
        self.rows += vectors.len();
        Ok(())
    }

    /// Returns the `min(k, size())` nearest rows, ascending by distance.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Neighbors, VectorError> {
        self.validate(query)?;

        if self.rows == 0 || k == 0 {
            return Ok(Neighbors::default());
        }

        let mut scored: Vec<(f32, usize)> = (0..self.rows)
            .map(|row| (squared_l2(query, self.row(row)), row))
            .collect();

        let k = k.min(self.rows);
        if k < scored.len() {
            scored.select_nth_unstable_by(k - 1, compare_candidates);
            scored.truncate(k);
        }
        scored.sort_by(compare_candidates);

        let (distances, indices) = scored.into_iter().unzip();
        Ok(Neighbors { distances, indices })
    }

    /// Number of rows in the index.
    #[must_use]
    pub fn size(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns row `i`. Panics when out of bounds, like slice indexing.
    #[must_use]
    pub fn row(&self, i: usize) -> &[f32] {
        let start = i * self.dimension;
        &self.data[start..start + self.dimension]
    }

    /// Raw row-major data, used when writing the index artifact.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    fn validate(&self, vector: &[f32]) -> Result<(), VectorError> {
        if vector.len() != self.dimension {
            return Err(VectorError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

/// Orders candidates by distance, then by insertion position.
fn compare_candidates(a: &(f32, usize), b: &(f32, usize)) -> Ordering {
    a.0.total_cmp(&b.0).then(a.1.cmp(&b.1))
}

/// Squared Euclidean distance between two vectors of equal length.
#[must_use]
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
