//! Whole-table persistence layer.
//!
//! The [`TableStore`] is the single boundary between in-memory tables and
//! durable storage. A database is a directory; each table inside it is one
//! file named after the table, holding a binary encoding of the full
//! `{schema, rows}` state.
//!
//! # Responsibilities
//!
//! - Creating and removing database directories.
//! - Serializing a whole table to its file, overwriting prior content.
//! - Deserializing a whole table back into memory.
//!
//! Writes are neither incremental nor atomic: there is no locking, no
//! write-ahead log, and no rename step, so a failure mid-write can leave a
//! truncated file behind. Callers get whole-table snapshots and nothing
//! else, which keeps this layer swappable for a different backing store
//! without touching the engine.
use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufReader, BufWriter, Write},
    path::Path,
};

use bincode::{
    config::{BigEndian, Configuration, Fixint},
    decode_from_std_read, encode_into_std_write,
};
use log::trace;
use thiserror::Error;

use super::table::Table;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("table '{0}' not found")]
    TableNotFound(String),

    #[error("failed to encode table '{name}': {source}")]
    Encode {
        name: String,
        source: bincode::error::EncodeError,
    },

    #[error("failed to decode table '{name}': {source}")]
    Decode {
        name: String,
        source: bincode::error::DecodeError,
    },

    #[error("storage io error: {0}")]
    Io(#[from] io::Error),
}

/// Reads and writes whole tables, one file per table inside a directory per
/// database.
pub struct TableStore {
    config: Configuration<BigEndian, Fixint>,
}

impl TableStore {
    pub fn new() -> Self {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_fixed_int_encoding();
        Self { config }
    }

    pub fn create_database(&self, path: &Path) -> Result<(), StoreError> {
        fs::create_dir(path)?;
        Ok(())
    }

    pub fn database_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    /// Removes a database directory along with every table file in it.
    pub fn drop_database(&self, path: &Path) -> Result<(), StoreError> {
        fs::remove_dir_all(path)?;
        Ok(())
    }

    pub fn table_exists(&self, database: &Path, name: &str) -> bool {
        database.join(name).is_file()
    }

    pub fn drop_table(&self, database: &Path, name: &str) -> Result<(), StoreError> {
        fs::remove_file(database.join(name))?;
        Ok(())
    }

    /// Serializes the table's full state, overwriting any existing file.
    /// Fails if the target cannot be created, e.g. when the database
    /// directory is missing.
    pub fn write(&self, database: &Path, name: &str, table: &Table) -> Result<(), StoreError> {
        let path = database.join(name);
        trace!("writing table to {path:?}");

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;
        let mut writer = BufWriter::new(file);
        encode_into_std_write(table, &mut writer, self.config).map_err(|source| {
            StoreError::Encode {
                name: name.to_string(),
                source,
            }
        })?;
        writer.flush()?;
        Ok(())
    }

    /// Deserializes a previously written table.
    pub fn read(&self, database: &Path, name: &str) -> Result<Table, StoreError> {
        let path = database.join(name);
        trace!("reading table from {path:?}");

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::TableNotFound(name.to_string()));
            }
            Err(e) => return Err(StoreError::Io(e)),
        };
        let mut reader = BufReader::new(file);
        decode_from_std_read(&mut reader, self.config).map_err(|source| StoreError::Decode {
            name: name.to_string(),
            source,
        })
    }
}

impl Default for TableStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use tempdir::TempDir;

    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn round_trip() {
        let temp = TempDir::new("store").unwrap();
        let store = TableStore::new();

        let mut table = Table::new(&columns(&["name", "age"])).unwrap();
        table.add_row(&columns(&["alice", "30"])).unwrap();
        table.add_row(&columns(&["bob", "25"])).unwrap();

        store.write(temp.path(), "people", &table).unwrap();
        let loaded = store.read(temp.path(), "people").unwrap();
        assert_eq!(loaded, table);
    }

    #[test]
    fn round_trip_empty_table() {
        let temp = TempDir::new("store").unwrap();
        let store = TableStore::new();

        let table = Table::new(&[]).unwrap();
        store.write(temp.path(), "empty", &table).unwrap();
        let loaded = store.read(temp.path(), "empty").unwrap();
        assert_eq!(loaded, table);
    }

    #[test]
    fn write_overwrites_prior_content() {
        let temp = TempDir::new("store").unwrap();
        let store = TableStore::new();

        let mut table = Table::new(&columns(&["name"])).unwrap();
        table.add_row(&columns(&["alice"])).unwrap();
        store.write(temp.path(), "people", &table).unwrap();

        table.delete_matching(None).unwrap();
        store.write(temp.path(), "people", &table).unwrap();

        let loaded = store.read(temp.path(), "people").unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn missing_table_reads_not_found() {
        let temp = TempDir::new("store").unwrap();
        let store = TableStore::new();

        match store.read(temp.path(), "ghost") {
            Err(StoreError::TableNotFound(name)) => assert_eq!(name, "ghost"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn write_into_missing_database_fails() {
        let temp = TempDir::new("store").unwrap();
        let store = TableStore::new();

        let table = Table::new(&[]).unwrap();
        let missing = temp.path().join("nope");
        assert!(matches!(
            store.write(&missing, "people", &table),
            Err(StoreError::Io(_))
        ));
    }

    #[test]
    fn corrupt_file_reads_decode_error() {
        let temp = TempDir::new("store").unwrap();
        let store = TableStore::new();

        fs::write(temp.path().join("people"), b"\xff").unwrap();
        assert!(matches!(
            store.read(temp.path(), "people"),
            Err(StoreError::Decode { .. })
        ));
    }

    #[test]
    fn database_lifecycle() {
        let temp = TempDir::new("store").unwrap();
        let store = TableStore::new();
        let path = temp.path().join("db");

        assert!(!store.database_exists(&path));
        store.create_database(&path).unwrap();
        assert!(store.database_exists(&path));

        let table = Table::new(&[]).unwrap();
        store.write(&path, "people", &table).unwrap();
        assert!(store.table_exists(&path, "people"));

        store.drop_table(&path, "people").unwrap();
        assert!(!store.table_exists(&path, "people"));

        store.drop_database(&path).unwrap();
        assert!(!store.database_exists(&path));
    }
}
