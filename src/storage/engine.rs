//! Operation execution engine.
//!
//! The [`Engine`] turns one structured [`Request`] into storage effects and a
//! textual result. It never parses statement text; the statement layer hands
//! it a fully formed request, optionally carrying a
//! [`Condition`](crate::storage::Condition).
//!
//! Every table-touching operation runs the same pipeline: load the whole
//! table from the [`TableStore`], apply the mutation in memory, write the
//! whole table back. Reads go through the identical cycle, so a select
//! re-serializes the (unchanged) table. A table exists in memory only for
//! the duration of one call; the file on disk is the only state that
//! outlives it.
//!
//! The engine itself is stateless. The database selected by `USE` lives in a
//! [`Session`] owned by the caller and threaded through every call, so one
//! engine can serve any number of consecutive sessions.
use std::path::{Path, PathBuf};

use log::{debug, info};
use thiserror::Error;

use crate::protocol::request::{Alteration, Request};

use super::{
    condition::Condition,
    error::TableError,
    store::{StoreError, TableStore},
    table::Table,
};

const OK: &str = "OK";

/// Per-connection context: the database selected by `USE`, if any.
#[derive(Debug, Clone, Default)]
pub struct Session {
    database: Option<String>,
}

impl Session {
    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("database '{0}' already exists")]
    DatabaseExists(String),

    #[error("table '{0}' already exists")]
    TableExists(String),

    #[error("database '{0}' does not exist")]
    DatabaseNotFound(String),

    #[error("table '{0}' does not exist")]
    TableNotFound(String),

    #[error("no database selected")]
    NoDatabase,

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Executes structured requests against file-persisted tables under a root
/// directory, one database directory per database.
pub struct Engine {
    root: PathBuf,
    store: TableStore,
}

impl Engine {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            store: TableStore::new(),
        }
    }

    /// Runs one operation to completion, returning `OK` or a rendered
    /// header-plus-rows block.
    pub fn execute(&self, session: &mut Session, request: Request) -> Result<String, EngineError> {
        debug!("executing {request:?}");
        match request {
            Request::CreateDatabase { name } => self.create_database(&name),
            Request::UseDatabase { name } => self.use_database(session, name),
            Request::DropDatabase { name } => self.drop_database(&name),
            Request::CreateTable { name, columns } => self.create_table(session, &name, &columns),
            Request::DropTable { name } => self.drop_table(session, &name),
            Request::Insert { table, values } => self.insert(session, &table, &values),
            Request::Select {
                table,
                columns,
                filter,
            } => self.select(session, &table, columns.as_deref(), filter.as_ref()),
            Request::Update {
                table,
                column,
                value,
                filter,
            } => self.update(session, &table, &column, &value, filter.as_ref()),
            Request::Delete { table, filter } => self.delete(session, &table, filter.as_ref()),
            Request::Alter { table, alteration } => self.alter(session, &table, alteration),
        }
    }

    fn create_database(&self, name: &str) -> Result<String, EngineError> {
        let path = self.root.join(name);
        if self.store.database_exists(&path) {
            return Err(EngineError::DatabaseExists(name.to_string()));
        }
        self.store.create_database(&path)?;
        info!("created database '{name}'");
        Ok(OK.to_string())
    }

    fn use_database(&self, session: &mut Session, name: String) -> Result<String, EngineError> {
        if !self.store.database_exists(&self.root.join(&name)) {
            return Err(EngineError::DatabaseNotFound(name));
        }
        session.database = Some(name);
        Ok(OK.to_string())
    }

    fn drop_database(&self, name: &str) -> Result<String, EngineError> {
        let path = self.root.join(name);
        if !self.store.database_exists(&path) {
            return Err(EngineError::DatabaseNotFound(name.to_string()));
        }
        self.store.drop_database(&path)?;
        info!("dropped database '{name}'");
        Ok(OK.to_string())
    }

    fn create_table(
        &self,
        session: &Session,
        name: &str,
        columns: &[String],
    ) -> Result<String, EngineError> {
        let database = self.database_path(session)?;
        if self.store.table_exists(&database, name) {
            return Err(EngineError::TableExists(name.to_string()));
        }
        let table = Table::new(columns)?;
        self.store.write(&database, name, &table)?;
        info!("created table '{name}'");
        Ok(OK.to_string())
    }

    fn drop_table(&self, session: &Session, name: &str) -> Result<String, EngineError> {
        let database = self.database_path(session)?;
        if !self.store.table_exists(&database, name) {
            return Err(EngineError::TableNotFound(name.to_string()));
        }
        self.store.drop_table(&database, name)?;
        info!("dropped table '{name}'");
        Ok(OK.to_string())
    }

    fn insert(
        &self,
        session: &Session,
        name: &str,
        values: &[String],
    ) -> Result<String, EngineError> {
        let database = self.database_path(session)?;
        let mut table = self.load(&database, name)?;
        table.add_row(values)?;
        self.store.write(&database, name, &table)?;
        Ok(OK.to_string())
    }

    fn select(
        &self,
        session: &Session,
        name: &str,
        columns: Option<&[String]>,
        filter: Option<&Condition>,
    ) -> Result<String, EngineError> {
        let database = self.database_path(session)?;
        let table = self.load(&database, name)?;

        let (header, body) = match columns {
            None => {
                let body = match filter {
                    Some(condition) => table.matching_rows(condition)?,
                    None => table.all_rows(),
                };
                (table.header(), body)
            }
            Some(columns) => (
                table.projected_header(columns)?,
                table.projected_rows(filter, columns)?,
            ),
        };

        self.store.write(&database, name, &table)?;

        let mut output = header;
        if !body.is_empty() {
            output.push('\n');
            output.push_str(&body);
        }
        Ok(output)
    }

    fn update(
        &self,
        session: &Session,
        name: &str,
        column: &str,
        value: &str,
        filter: Option<&Condition>,
    ) -> Result<String, EngineError> {
        let database = self.database_path(session)?;
        let mut table = self.load(&database, name)?;
        table.update_matching(filter, column, value)?;
        self.store.write(&database, name, &table)?;
        Ok(OK.to_string())
    }

    fn delete(
        &self,
        session: &Session,
        name: &str,
        filter: Option<&Condition>,
    ) -> Result<String, EngineError> {
        let database = self.database_path(session)?;
        let mut table = self.load(&database, name)?;
        table.delete_matching(filter)?;
        self.store.write(&database, name, &table)?;
        Ok(OK.to_string())
    }

    fn alter(
        &self,
        session: &Session,
        name: &str,
        alteration: Alteration,
    ) -> Result<String, EngineError> {
        let database = self.database_path(session)?;
        let mut table = self.load(&database, name)?;
        match alteration {
            Alteration::Add(column) => table.add_column(&column)?,
            Alteration::Drop(column) => table.remove_column(&column)?,
        }
        self.store.write(&database, name, &table)?;
        Ok(OK.to_string())
    }

    fn database_path(&self, session: &Session) -> Result<PathBuf, EngineError> {
        session
            .database
            .as_ref()
            .map(|name| self.root.join(name))
            .ok_or(EngineError::NoDatabase)
    }

    fn load(&self, database: &Path, name: &str) -> Result<Table, EngineError> {
        match self.store.read(database, name) {
            Ok(table) => Ok(table),
            Err(StoreError::TableNotFound(name)) => Err(EngineError::TableNotFound(name)),
            Err(e) => Err(EngineError::Storage(e)),
        }
    }
}
