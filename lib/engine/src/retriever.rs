use crate::embedder::Embedder;
use hotelrag_core::{Error, Record, Result, RowStore, VectorIndex};
use tracing::debug;

/// Default number of records fetched per query
pub const DEFAULT_TOP_K: usize = 3;

/// One retrieved record and its distance to the query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Retrieved<'a> {
    pub record: &'a Record,
    pub distance: f32,
}

/// Turns a query string into the nearest records.
///
/// Borrows the shared read-only models; construct one per request.
#[derive(Clone, Copy)]
pub struct Retriever<'a> {
    embedder: &'a dyn Embedder,
    index: &'a dyn VectorIndex,
    rows: &'a RowStore,
}

impl<'a> Retriever<'a> {
    pub fn new(embedder: &'a dyn Embedder, index: &'a dyn VectorIndex, rows: &'a RowStore) -> Self {
        Self {
            embedder,
            index,
            rows,
        }
    }

    /// Fetch up to `k` records nearest to `query`, nearest first.
    ///
    /// `k == 0` returns nothing without touching the embedder. Fewer than
    /// `k` stored vectors is not an error. Encoding problems surface as
    /// [`Error::Encoding`]; an index position with no matching row is an
    /// [`Error::Alignment`].
    pub fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Retrieved<'a>>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let embedding = self.embedder.embed(query).map_err(|e| match e {
            Error::Encoding(msg) => Error::Encoding(msg),
            other => Error::Encoding(other.to_string()),
        })?;

        if embedding.dim() != self.index.dim() {
            return Err(Error::Encoding(format!(
                "embedder {} produced dimension {}, index expects {}",
                self.embedder.model_name(),
                embedding.dim(),
                self.index.dim()
            )));
        }
        if !embedding.is_finite() {
            return Err(Error::Encoding("embedding contains non-finite values".into()));
        }

        let neighbors = self.index.search(&embedding, k)?;

        let rows = self.rows;
        let retrieved = neighbors
            .into_iter()
            .map(|n| {
                rows.resolve(n.position).map(|record| Retrieved {
                    record,
                    distance: n.distance,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Retrieved {} of {} requested records (index size {})",
            retrieved.len(),
            k,
            self.index.len()
        );
        Ok(retrieved)
    }
}
