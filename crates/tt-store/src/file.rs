//! Store backed by a single JSON document on disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Store;
use crate::batch::WriteBatch;
use crate::error::{StoreError, StoreResult};
use crate::table::{Index, Row, Table, Tables};

const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Document {
    version: u32,
    #[serde(default)]
    tables: BTreeMap<Table, BTreeMap<Uuid, Row>>,
}

/// A store that persists every table to one JSON file.
///
/// Each commit writes the whole document to a sibling temporary file and
/// renames it over the original, so a failed write leaves the previous
/// contents in place and the in-memory tables unchanged.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    tables: Tables,
}

impl JsonFileStore {
    /// Open a store file. A missing file is an empty store; it is created
    /// on the first commit.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let tables = if path.exists() {
            let text = fs::read_to_string(&path).map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
            let doc: Document = serde_json::from_str(&text)?;
            if doc.version != FORMAT_VERSION {
                return Err(StoreError::Corrupt(format!(
                    "{} has format version {}, expected {FORMAT_VERSION}",
                    path.display(),
                    doc.version
                )));
            }
            Tables::from_rows(doc.tables)
        } else {
            Tables::new()
        };
        tracing::info!(path = %path.display(), "opened store");
        Ok(Self { path, tables })
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, tables: &Tables) -> StoreResult<()> {
        let doc = Document {
            version: FORMAT_VERSION,
            tables: tables.rows().clone(),
        };
        let text = serde_json::to_string_pretty(&doc)?;

        let tmp = self.path.with_extension("json.tmp");
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source: std::io::Error| StoreError::Io { path, source }
        };
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(io_err(parent))?;
        }
        fs::write(&tmp, text).map_err(io_err(&tmp))?;
        fs::rename(&tmp, &self.path).map_err(io_err(&self.path))
    }
}

impl Store for JsonFileStore {
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
        let ops = batch.len();
        let mut next = self.tables.clone();
        next.apply(batch);
        self.write(&next)?;
        self.tables = next;
        tracing::debug!(ops, path = %self.path.display(), "committed batch");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::StoreExt;
    use tempfile::TempDir;
    use tt_core::{CharacterDraft, CharacterType, GameInstance};

    #[test]
    fn missing_file_opens_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path().join("data.json")).unwrap();
        assert!(store.get_all(Table::Instances).unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn commits_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/data.json");
        let inst = GameInstance::new("Strength of Thousands");
        let npc = CharacterDraft::new("Okoro", CharacterType::Npc, 40, 20)
            .build(inst.id)
            .unwrap();

        {
            let mut store = JsonFileStore::open(&path).unwrap();
            let mut batch = WriteBatch::new();
            batch.put_record(&inst).unwrap();
            batch.put_record(&npc).unwrap();
            store.commit(batch).unwrap();
        }

        let store = JsonFileStore::open(&path).unwrap();
        let loaded: Option<GameInstance> = store.get_record(inst.id.0).unwrap();
        assert_eq!(loaded, Some(inst.clone()));
        let owned: Vec<tt_core::Character> =
            store.records_by_index(Index::InstanceId, inst.id.0).unwrap();
        assert_eq!(owned.len(), 1);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn failed_write_leaves_tables_untouched() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be makes the rename fail
        let path = dir.path().join("blocked.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        let mut store = JsonFileStore {
            path: path.clone(),
            tables: Tables::new(),
        };
        let inst = GameInstance::new("Doomed");
        let err = store.put_record(&inst).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert!(store.get_all(Table::Instances).unwrap().is_empty());
    }

    #[test]
    fn rejects_unknown_version() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, r#"{"version": 99, "tables": {}}"#).unwrap();
        let err = JsonFileStore::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }

    #[test]
    fn rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            JsonFileStore::open(&path).unwrap_err(),
            StoreError::Serialization(_)
        ));
    }
}
