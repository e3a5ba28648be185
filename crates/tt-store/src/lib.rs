//! Persistence capability for Tabletracker.
//!
//! A store is a set of keyed tables of JSON rows with secondary indexes and
//! atomic multi-table write batches. The tracker only talks to the
//! [`Store`] trait; [`MemoryStore`] and [`JsonFileStore`] are the shipped
//! backends.

pub mod batch;
pub mod error;
pub mod file;
pub mod memory;
pub mod record;
pub mod table;

pub use batch::{WriteBatch, WriteOp};
pub use error::{StoreError, StoreResult};
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use record::{Record, StoreExt};
pub use table::{Index, Row, Table, Tables};

use uuid::Uuid;

/// Durable mapping from id to row, per table, with secondary index lookup.
///
/// `commit` is the only write path: every logical mutation is one batch,
/// and a batch is applied entirely or not at all.
pub trait Store {
    /// Fetch a single row.
    fn get(&self, table: Table, id: Uuid) -> StoreResult<Option<Row>>;

    /// Fetch every row in a table.
    fn get_all(&self, table: Table) -> StoreResult<Vec<Row>>;

    /// Fetch every row whose indexed field equals `value`.
    fn get_all_by_index(&self, table: Table, index: Index, value: Uuid) -> StoreResult<Vec<Row>>;

    /// Apply a batch of writes atomically.
    fn commit(&mut self, batch: WriteBatch) -> StoreResult<()>;

    /// Insert or replace one row.
    fn put(&mut self, table: Table, id: Uuid, row: Row) -> StoreResult<()> {
        let mut batch = WriteBatch::new();
        batch.put(table, id, row);
        self.commit(batch)
    }

    /// Delete one row. Deleting a missing row is not an error.
    fn delete(&mut self, table: Table, id: Uuid) -> StoreResult<()> {
        let mut batch = WriteBatch::new();
        batch.delete(table, id);
        self.commit(batch)
    }
}
