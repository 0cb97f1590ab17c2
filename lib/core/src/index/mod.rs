//! Nearest-neighbor indexes over the row embeddings.
//!
//! Index position `i` always corresponds to row `i` of the [`RowStore`](crate::RowStore).
//! Every implementation returns neighbors ordered by ascending distance with
//! ties broken by ascending position, so results are reproducible run to run.

mod flat;
mod hnsw;

pub use flat::FlatIndex;
pub use hnsw::{HnswIndex, HnswParams};

use crate::{Result, Vector};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Distance metric used by an index. Smaller is closer for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Distance {
    /// Squared Euclidean distance over the raw vectors
    #[default]
    Euclidean,
    /// `1 - cosine_similarity`, computed over unit-normalized vectors
    Cosine,
}

impl Distance {
    /// Bring a vector into the form this metric stores and compares.
    pub(crate) fn prepare(self, vector: &Vector) -> Vector {
        match self {
            Distance::Euclidean => vector.clone(),
            Distance::Cosine => vector.normalized(),
        }
    }

    /// Distance between two prepared vectors
    #[inline]
    pub(crate) fn between(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Distance::Euclidean => crate::simd::squared_l2(a, b),
            Distance::Cosine => 1.0 - crate::simd::dot_product(a, b),
        }
    }
}

/// One search hit: a position in the index and its distance to the query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: usize,
    pub distance: f32,
}

/// Read-only k-nearest-neighbor search.
///
/// Implementations must be safe to query from many threads at once; nothing
/// in the query path mutates the index.
pub trait VectorIndex: Send + Sync {
    /// Dimension every stored vector (and every query) must have
    fn dim(&self) -> usize;

    /// Number of stored vectors
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn distance(&self) -> Distance;

    /// Return up to `k` neighbors of `query`, nearest first.
    ///
    /// Returns `min(k, len)` hits for exact indexes; `k == 0` and an empty
    /// index both yield an empty result. A query of the wrong dimension is
    /// an [`Error::InvalidDimension`](crate::Error::InvalidDimension).
    fn search(&self, query: &Vector, k: usize) -> Result<Vec<Neighbor>>;
}

#[inline]
pub(crate) fn rank_key(n: &Neighbor) -> (OrderedFloat<f32>, usize) {
    (OrderedFloat(n.distance), n.position)
}

/// Sort neighbors nearest first, equal distances by ascending position.
pub(crate) fn rank(neighbors: &mut [Neighbor]) {
    neighbors.sort_unstable_by_key(rank_key);
}

pub(crate) fn check_dim(expected: usize, query: &Vector) -> Result<()> {
    if query.dim() != expected {
        return Err(crate::Error::InvalidDimension {
            expected,
            actual: query.dim(),
        });
    }
    Ok(())
}
