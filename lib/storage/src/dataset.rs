use crate::rows::load_rows;
use crate::snapshot::read_index_snapshot;
use hotelrag_core::{Error, Result, RowStore, VectorIndex};
use std::path::Path;
use tracing::info;

/// Row store and vector index loaded together and checked for alignment
pub struct Dataset {
    pub rows: RowStore,
    pub index: Box<dyn VectorIndex>,
    /// Embedding model the index vectors came from
    pub embedder: String,
}

impl Dataset {
    /// Pair an in-memory row store with its index; counts must agree.
    pub fn new(
        rows: RowStore,
        index: Box<dyn VectorIndex>,
        embedder: impl Into<String>,
    ) -> Result<Self> {
        if rows.len() != index.len() {
            return Err(Error::Startup(format!(
                "row store holds {} rows but index holds {} vectors",
                rows.len(),
                index.len()
            )));
        }
        Ok(Self {
            rows,
            index,
            embedder: embedder.into(),
        })
    }

    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(rows_path: P, index_path: Q) -> Result<Self> {
        let rows = load_rows(rows_path)?;
        let mut snapshot = read_index_snapshot(index_path)?;
        let embedder = std::mem::take(&mut snapshot.embedder);
        let index = snapshot.into_index()?;
        let dataset = Self::new(rows, index, embedder)?;
        info!(
            "Dataset ready: {} rows, dim {}, {:?} distance, embedder {}",
            dataset.rows.len(),
            dataset.index.dim(),
            dataset.index.distance(),
            dataset.embedder
        );
        Ok(dataset)
    }
}
