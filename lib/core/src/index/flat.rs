use super::{check_dim, rank, rank_key, Distance, Neighbor, VectorIndex};
use crate::{Error, Result, Vector};
use rayon::prelude::*;

/// Above this many vectors the brute-force scan is split across the rayon pool.
const PARALLEL_SCAN_THRESHOLD: usize = 4096;

/// Exact brute-force index with contiguous vector storage.
///
/// Scores every stored vector, so results are exact: `search(q, k)` always
/// returns `min(k, len)` neighbors.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dim: usize,
    distance: Distance,
    /// `len * dim` floats, row-major
    vectors: Vec<f32>,
}

impl FlatIndex {
    pub fn new(dim: usize, distance: Distance) -> Result<Self> {
        if dim == 0 {
            return Err(Error::InvalidConfig("index dimension must be positive".into()));
        }
        Ok(Self {
            dim,
            distance,
            vectors: Vec::new(),
        })
    }

    /// Build an index whose position `i` holds `vectors[i]`.
    pub fn from_vectors(dim: usize, distance: Distance, vectors: &[Vector]) -> Result<Self> {
        let mut index = Self::new(dim, distance)?;
        index.vectors.reserve(vectors.len() * dim);
        for vector in vectors {
            index.push(vector)?;
        }
        Ok(index)
    }

    /// Append a vector at the next position and return that position.
    pub fn push(&mut self, vector: &Vector) -> Result<usize> {
        check_dim(self.dim, vector)?;
        if !vector.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "vector for position {} contains non-finite values",
                self.len()
            )));
        }
        let prepared = self.distance.prepare(vector);
        self.vectors.extend_from_slice(prepared.as_slice());
        Ok(self.len() - 1)
    }

    #[inline]
    fn score(&self, query: &[f32], position: usize, stored: &[f32]) -> Neighbor {
        Neighbor {
            position,
            distance: self.distance.between(query, stored),
        }
    }
}

impl VectorIndex for FlatIndex {
    fn dim(&self) -> usize {
        self.dim
    }

    fn len(&self) -> usize {
        self.vectors.len() / self.dim
    }

    fn distance(&self) -> Distance {
        self.distance
    }

    fn search(&self, query: &Vector, k: usize) -> Result<Vec<Neighbor>> {
        check_dim(self.dim, query)?;
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let prepared = self.distance.prepare(query);
        let q = prepared.as_slice();

        let mut hits: Vec<Neighbor> = if self.len() >= PARALLEL_SCAN_THRESHOLD {
            self.vectors
                .par_chunks_exact(self.dim)
                .enumerate()
                .map(|(position, stored)| self.score(q, position, stored))
                .collect()
        } else {
            self.vectors
                .chunks_exact(self.dim)
                .enumerate()
                .map(|(position, stored)| self.score(q, position, stored))
                .collect()
        };

        if k < hits.len() {
            hits.select_nth_unstable_by_key(k - 1, rank_key);
            hits.truncate(k);
        }
        rank(&mut hits);
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_index(n: usize) -> FlatIndex {
        let vectors: Vec<Vector> = (0..n).map(|i| Vector::new(vec![i as f32, 0.0])).collect();
        FlatIndex::from_vectors(2, Distance::Euclidean, &vectors).unwrap()
    }

    #[test]
    fn test_exact_nearest_first() {
        let index = line_index(10);
        let hits = index.search(&Vector::new(vec![6.2, 0.0]), 3).unwrap();
        let positions: Vec<usize> = hits.iter().map(|h| h.position).collect();
        assert_eq!(positions, vec![6, 7, 5]);
        assert!((hits[0].distance - 0.04).abs() < 1e-4);
    }

    #[test]
    fn test_k_bounded_by_len() {
        let index = line_index(2);
        assert_eq!(index.search(&Vector::new(vec![0.0, 0.0]), 5).unwrap().len(), 2);
        assert!(index.search(&Vector::new(vec![0.0, 0.0]), 0).unwrap().is_empty());
    }

    #[test]
    fn test_equal_distances_ordered_by_position() {
        let vectors = vec![
            Vector::new(vec![1.0, 0.0]),
            Vector::new(vec![-1.0, 0.0]),
            Vector::new(vec![0.0, 1.0]),
        ];
        let index = FlatIndex::from_vectors(2, Distance::Euclidean, &vectors).unwrap();
        let hits = index.search(&Vector::new(vec![0.0, 0.0]), 3).unwrap();
        let positions: Vec<usize> = hits.iter().map(|h| h.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn test_wrong_query_dimension() {
        let index = line_index(3);
        let err = index.search(&Vector::new(vec![1.0]), 1).unwrap_err();
        assert!(matches!(err, Error::InvalidDimension { expected: 2, actual: 1 }));
    }

    #[test]
    fn test_rejects_ragged_and_non_finite_vectors() {
        let ragged = vec![Vector::new(vec![1.0, 0.0]), Vector::new(vec![1.0])];
        assert!(FlatIndex::from_vectors(2, Distance::Euclidean, &ragged).is_err());

        let nan = vec![Vector::new(vec![f32::NAN, 0.0])];
        assert!(FlatIndex::from_vectors(2, Distance::Euclidean, &nan).is_err());
        assert!(FlatIndex::new(0, Distance::Cosine).is_err());
    }

    #[test]
    fn test_parallel_scan_matches_order() {
        let n = PARALLEL_SCAN_THRESHOLD + 10;
        let index = line_index(n);
        let hits = index.search(&Vector::new(vec![100.0, 0.0]), 4).unwrap();
        let positions: Vec<usize> = hits.iter().map(|h| h.position).collect();
        assert_eq!(positions, vec![100, 99, 101, 98]);
    }

    #[test]
    fn test_cosine_ignores_magnitude() {
        let vectors = vec![Vector::new(vec![10.0, 0.0]), Vector::new(vec![0.0, 0.1])];
        let index = FlatIndex::from_vectors(2, Distance::Cosine, &vectors).unwrap();
        let hits = index.search(&Vector::new(vec![0.0, 3.0]), 1).unwrap();
        assert_eq!(hits[0].position, 1);
    }
}
