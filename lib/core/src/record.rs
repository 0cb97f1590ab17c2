use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// One hotel booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Row position; equals the position of this row's vector in the index
    pub id: u64,
    /// Free-text description used for retrieval
    pub text: String,
    /// Average daily rate
    pub adr: f64,
    #[serde(deserialize_with = "deserialize_flag")]
    pub is_canceled: bool,
    /// Days between booking and arrival
    pub lead_time: u32,
}

/// Accepts `true`/`false` or the `0`/`1` integers of tabular exports.
fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Int(0) => Ok(false),
        Flag::Int(1) => Ok(true),
        Flag::Int(other) => Err(serde::de::Error::custom(format!(
            "is_canceled must be 0 or 1, got {}",
            other
        ))),
    }
}

/// Ordered, immutable record collection addressed by position.
///
/// Construction enforces `records[i].id == i`, the alignment the vector
/// index relies on.
#[derive(Debug, Clone, Default)]
pub struct RowStore {
    records: Vec<Record>,
}

impl RowStore {
    pub fn new(records: Vec<Record>) -> Result<Self> {
        if let Some((position, record)) = records
            .iter()
            .enumerate()
            .find(|(position, record)| record.id != *position as u64)
        {
            return Err(Error::Startup(format!(
                "record at position {} has id {}; ids must equal row positions",
                position, record.id
            )));
        }
        Ok(Self { records })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn get(&self, position: usize) -> Option<&Record> {
        self.records.get(position)
    }

    /// Look up the record behind an index position.
    ///
    /// A position past the end means the index and the rows come from
    /// different data generations.
    pub fn resolve(&self, position: usize) -> Result<&Record> {
        self.records.get(position).ok_or(Error::Alignment {
            position,
            rows: self.records.len(),
        })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }
}
