//! Tables, secondary indexes, and the in-memory table set shared by the
//! backends.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::batch::{WriteBatch, WriteOp};
use crate::error::{StoreError, StoreResult};

/// A stored row. Rows are the JSON form of the entity records.
pub type Row = serde_json::Value;

/// The tables a store holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    /// Game instances.
    Instances,
    /// Characters, indexed by owning instance.
    Characters,
    /// Encounters, indexed by owning instance.
    Encounters,
}

impl Table {
    /// All tables.
    pub const ALL: [Self; 3] = [Self::Instances, Self::Characters, Self::Encounters];

    /// Secondary indexes maintained for this table.
    pub fn indexes(self) -> &'static [Index] {
        match self {
            Self::Instances => &[],
            Self::Characters | Self::Encounters => &[Index::InstanceId],
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instances => write!(f, "instances"),
            Self::Characters => write!(f, "characters"),
            Self::Encounters => write!(f, "encounters"),
        }
    }
}

/// A secondary index over a row field holding an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Index {
    /// The owning instance.
    InstanceId,
}

impl Index {
    /// The row field this index reads.
    pub fn field(self) -> &'static str {
        match self {
            Self::InstanceId => "instance_id",
        }
    }

    /// Extract the indexed value from a row, if present.
    fn key_of(self, row: &Row) -> Option<Uuid> {
        row.get(self.field())
            .and_then(|v| v.as_str())
            .and_then(|s| Uuid::parse_str(s).ok())
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field())
    }
}

/// Rows for every table plus their secondary indexes.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    rows: BTreeMap<Table, BTreeMap<Uuid, Row>>,
    // (table, index) -> indexed value -> row ids
    indexes: HashMap<(Table, Index), HashMap<Uuid, BTreeSet<Uuid>>>,
}

impl Tables {
    /// Create an empty table set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table set from raw rows, rebuilding every index.
    pub fn from_rows(rows: BTreeMap<Table, BTreeMap<Uuid, Row>>) -> Self {
        let mut tables = Self::new();
        for (table, entries) in rows {
            for (id, row) in entries {
                tables.insert(table, id, row);
            }
        }
        tables
    }

    /// The raw rows, for serialisation.
    pub fn rows(&self) -> &BTreeMap<Table, BTreeMap<Uuid, Row>> {
        &self.rows
    }

    /// Fetch a row.
    pub fn get(&self, table: Table, id: Uuid) -> Option<&Row> {
        self.rows.get(&table).and_then(|t| t.get(&id))
    }

    /// Iterate every row in a table.
    pub fn all(&self, table: Table) -> impl Iterator<Item = &Row> {
        self.rows.get(&table).into_iter().flat_map(|t| t.values())
    }

    /// Rows whose indexed field equals `value`.
    pub fn by_index(&self, table: Table, index: Index, value: Uuid) -> StoreResult<Vec<&Row>> {
        if !table.indexes().contains(&index) {
            return Err(StoreError::UnknownIndex { table, index });
        }
        let ids = self
            .indexes
            .get(&(table, index))
            .and_then(|by_value| by_value.get(&value));
        Ok(ids
            .into_iter()
            .flatten()
            .filter_map(|id| self.get(table, *id))
            .collect())
    }

    /// Number of rows in a table.
    pub fn len(&self, table: Table) -> usize {
        self.rows.get(&table).map_or(0, BTreeMap::len)
    }

    /// Returns true if every table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.values().all(BTreeMap::is_empty)
    }

    /// Apply every operation in a batch, in order.
    pub fn apply(&mut self, batch: WriteBatch) {
        for op in batch.into_ops() {
            match op {
                WriteOp::Put { table, id, row } => self.insert(table, id, row),
                WriteOp::Delete { table, id } => {
                    self.remove(table, id);
                }
            }
        }
    }

    fn insert(&mut self, table: Table, id: Uuid, row: Row) {
        self.remove(table, id);
        for &index in table.indexes() {
            if let Some(key) = index.key_of(&row) {
                self.indexes
                    .entry((table, index))
                    .or_default()
                    .entry(key)
                    .or_default()
                    .insert(id);
            }
        }
        self.rows.entry(table).or_default().insert(id, row);
    }

    fn remove(&mut self, table: Table, id: Uuid) -> Option<Row> {
        let row = self.rows.get_mut(&table)?.remove(&id)?;
        for &index in table.indexes() {
            if let Some(key) = index.key_of(&row)
                && let Some(by_value) = self.indexes.get_mut(&(table, index))
                && let Some(ids) = by_value.get_mut(&key)
            {
                ids.remove(&id);
                if ids.is_empty() {
                    by_value.remove(&key);
                }
            }
        }
        Some(row)
    }
}
