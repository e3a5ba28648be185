//! Typed access to stored rows.

use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use tt_core::{Character, GameInstance};
use tt_mechanics::Encounter;

use crate::Store;
use crate::error::StoreResult;
use crate::table::{Index, Table};

/// An entity that is persisted as one row of one table.
pub trait Record: Serialize + DeserializeOwned {
    /// The table holding records of this type.
    const TABLE: Table;

    /// The record's primary key.
    fn record_id(&self) -> Uuid;
}

impl Record for GameInstance {
    const TABLE: Table = Table::Instances;

    fn record_id(&self) -> Uuid {
        self.id.0
    }
}

impl Record for Character {
    const TABLE: Table = Table::Characters;

    fn record_id(&self) -> Uuid {
        self.id.0
    }
}

impl Record for Encounter {
    const TABLE: Table = Table::Encounters;

    fn record_id(&self) -> Uuid {
        self.id.0
    }
}

/// Typed helpers available on every [`Store`].
pub trait StoreExt: Store {
    /// Fetch and decode one record.
    fn get_record<R: Record>(&self, id: Uuid) -> StoreResult<Option<R>> {
        self.get(R::TABLE, id)?
            .map(serde_json::from_value)
            .transpose()
            .map_err(Into::into)
    }

    /// Fetch and decode every record of a type.
    fn records<R: Record>(&self) -> StoreResult<Vec<R>> {
        self.get_all(R::TABLE)?
            .into_iter()
            .map(|row| serde_json::from_value(row).map_err(Into::into))
            .collect()
    }

    /// Fetch and decode every record whose indexed field equals `value`.
    fn records_by_index<R: Record>(&self, index: Index, value: Uuid) -> StoreResult<Vec<R>> {
        self.get_all_by_index(R::TABLE, index, value)?
            .into_iter()
            .map(|row| serde_json::from_value(row).map_err(Into::into))
            .collect()
    }

    /// Encode and store one record.
    fn put_record<R: Record>(&mut self, record: &R) -> StoreResult<()> {
        let row = serde_json::to_value(record)?;
        self.put(R::TABLE, record.record_id(), row)
    }
}

impl<S: Store + ?Sized> StoreExt for S {}
