//! Ephemeral in-memory store.

use uuid::Uuid;

use crate::Store;
use crate::batch::WriteBatch;
use crate::error::StoreResult;
use crate::table::{Index, Row, Table, Tables};

/// A store that keeps everything in memory. Used by tests and by
/// throwaway sessions that never touch disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Tables,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current table contents.
    pub fn tables(&self) -> &Tables {
        &self.tables
    }
}

impl Store for MemoryStore {
    fn get(&self, table: Table, id: Uuid) -> StoreResult<Option<Row>> {
        Ok(self.tables.get(table, id).cloned())
    }

    fn get_all(&self, table: Table) -> StoreResult<Vec<Row>> {
        Ok(self.tables.all(table).cloned().collect())
    }

    fn get_all_by_index(&self, table: Table, index: Index, value: Uuid) -> StoreResult<Vec<Row>> {
        Ok(self
            .tables
            .by_index(table, index, value)?
            .into_iter()
            .cloned()
            .collect())
    }

    fn commit(&mut self, batch: WriteBatch) -> StoreResult<()> {
        tracing::trace!(ops = batch.len(), "memory commit");
        self.tables.apply(batch);
        Ok(())
    }
}
