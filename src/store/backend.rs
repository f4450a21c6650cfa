use crate::model::{FileKind, ViewerConfigRecord};

use super::Result;

pub type RecordUpdate<'a> =
    &'a mut dyn FnMut(Option<ViewerConfigRecord>) -> Result<ViewerConfigRecord>;

/// Storage collaborator for viewer records, one collection per [`FileKind`].
///
/// Implementations must make `insert_if_absent` and `upsert_with` atomic with
/// respect to each other: two racing first accesses may both build a record,
/// but only one of them can land.
pub trait ConfigBackend: Send + Sync {
    fn describe(&self) -> &'static str;

    fn is_durable(&self) -> bool;

    fn find(&self, kind: FileKind, id: &str) -> Result<Option<ViewerConfigRecord>>;

    /// Returns `true` when this call created the record.
    fn insert_if_absent(&self, record: &ViewerConfigRecord) -> Result<bool>;

    /// Read-modify-write of one record. `update` sees the current record, if
    /// any, and returns the one to persist.
    fn upsert_with(
        &self,
        kind: FileKind,
        id: &str,
        update: RecordUpdate<'_>,
    ) -> Result<ViewerConfigRecord>;

    fn count(&self, kind: FileKind) -> Result<usize>;
}
