pub mod cli;
pub mod protocol;
pub mod statement;
pub mod storage;

pub use cli::{Command, prompt};
pub use protocol::{Reply, Request, TableServer};
pub use statement::StatementError;
pub use storage::{Condition, Engine, Session, Table};
