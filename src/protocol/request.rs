use crate::storage::Condition;

/// Column change carried by an `ALTER TABLE` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alteration {
    Add(String),
    Drop(String),
}

/// Structured operation descriptor handed to the engine.
///
/// Built by the statement layer; the engine never sees raw statement text.
/// An absent `filter` means "match every row", not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    CreateDatabase {
        name: String,
    },
    UseDatabase {
        name: String,
    },
    DropDatabase {
        name: String,
    },
    CreateTable {
        name: String,
        columns: Vec<String>,
    },
    DropTable {
        name: String,
    },
    Insert {
        table: String,
        values: Vec<String>,
    },
    Select {
        table: String,
        /// `None` selects every column (`SELECT *`).
        columns: Option<Vec<String>>,
        filter: Option<Condition>,
    },
    Update {
        table: String,
        column: String,
        value: String,
        filter: Option<Condition>,
    },
    Delete {
        table: String,
        filter: Option<Condition>,
    },
    Alter {
        table: String,
        alteration: Alteration,
    },
}
