//! Per-record transformation hooks.
//!
//! A transform is injected into the pipeline at construction time and
//! applied to every exported record exactly once before it is written.
//! Transforms always return a record; returning an error aborts the run.
//! There is no drop-on-null escape hatch: filtering records is not a
//! transform concern.

use std::collections::HashMap;

use crate::client::{Record, OBJECT_ID};
use crate::error::{Error, Result};

/// A hook mapping one record to another.
pub trait RecordTransform: Send + Sync {
    /// Transform a single record.
    fn apply(&self, record: Record) -> Result<Record>;
}

/// The identity transform, used when no hook is supplied.
pub struct Identity;

impl RecordTransform for Identity {
    fn apply(&self, record: Record) -> Result<Record> {
        Ok(record)
    }
}

/// Any plain function over records is usable as a transform.
impl<F> RecordTransform for F
where
    F: Fn(Record) -> Result<Record> + Send + Sync,
{
    fn apply(&self, record: Record) -> Result<Record> {
        self(record)
    }
}

/// Renames record fields according to a configured mapping.
///
/// Fields absent from a record are skipped silently; the record identifier
/// is never remapped.
pub struct FieldMapper {
    mappings: HashMap<String, String>,
}

impl FieldMapper {
    /// Creates a mapper from `source field -> destination field` pairs.
    pub fn new(mappings: HashMap<String, String>) -> Result<Self> {
        if mappings.contains_key(OBJECT_ID) {
            return Err(Error::Config(format!(
                "field mapping must not rename the {} field",
                OBJECT_ID
            )));
        }
        Ok(Self { mappings })
    }
}

impl RecordTransform for FieldMapper {
    fn apply(&self, mut record: Record) -> Result<Record> {
        for (from, to) in &self.mappings {
            if let Some(value) = record.remove(from) {
                record.insert(to.clone(), value);
            }
        }
        Ok(record)
    }
}

/// Applies a transform to every record of a page, preserving order.
pub fn transform_page(
    transform: &dyn RecordTransform,
    records: Vec<Record>,
) -> Result<Vec<Record>> {
    records
        .into_iter()
        .map(|r| {
            transform.apply(r).map_err(|e| match e {
                Error::Transform(_) => e,
                other => Error::Transform(other.to_string()),
            })
        })
        .collect()
}
