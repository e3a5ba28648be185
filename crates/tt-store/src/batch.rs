//! Write batches: the unit of atomicity.

use uuid::Uuid;

use crate::error::StoreResult;
use crate::record::Record;
use crate::table::{Row, Table};

/// A single queued write.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Insert or replace a row.
    Put {
        /// Target table.
        table: Table,
        /// Row id.
        id: Uuid,
        /// Row contents.
        row: Row,
    },
    /// Delete a row if it exists.
    Delete {
        /// Target table.
        table: Table,
        /// Row id.
        id: Uuid,
    },
}

/// An ordered list of writes, possibly spanning tables, that a store
/// applies all together or not at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw row write.
    pub fn put(&mut self, table: Table, id: Uuid, row: Row) -> &mut Self {
        self.ops.push(WriteOp::Put { table, id, row });
        self
    }

    /// Queue a raw row deletion.
    pub fn delete(&mut self, table: Table, id: Uuid) -> &mut Self {
        self.ops.push(WriteOp::Delete { table, id });
        self
    }

    /// Queue a typed record write.
    pub fn put_record<R: Record>(&mut self, record: &R) -> StoreResult<&mut Self> {
        let row = serde_json::to_value(record)?;
        Ok(self.put(R::TABLE, record.record_id(), row))
    }

    /// Queue a typed record deletion.
    pub fn delete_record<R: Record>(&mut self, id: Uuid) -> &mut Self {
        self.delete(R::TABLE, id)
    }

    /// The queued operations.
    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    /// Number of queued operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Consume the batch, yielding its operations in order.
    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}
