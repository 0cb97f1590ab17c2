//! Startup loaders: the row store file, the index snapshot, and the
//! aligned [`Dataset`] built from both.

pub mod dataset;
pub mod rows;
pub mod snapshot;

pub use dataset::Dataset;
pub use rows::{load_rows, parse_rows};
pub use snapshot::{read_index_snapshot, write_index_snapshot, IndexKind, IndexSnapshot};
