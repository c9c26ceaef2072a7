pub mod add;
pub mod bulkadd;
pub mod get;

use std::fmt;

use crate::record::Record;

pub use add::Add;
pub use bulkadd::BulkAdd;
pub use get::Get;

/// Whether a maintenance command applies to the table in use or to every table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scope {
    Current,
    All,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Current => Ok(()),
            Scope::All => write!(f, " ALL"),
        }
    }
}

/// One line of the store's command protocol.
///
/// Table names are written verbatim, no escaping is performed. Callers must not pass names
/// containing whitespace, `,` or `;`.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Info,
    Ping,
    Help,
    Add(Add),
    Get(Get),
    Count(Scope),
    Clear(Scope),
    Flush(Scope),
    Create(String),
    Use(String),
    Exists(String),
    /// Opens a bulk block, optionally naming its destination.
    BulkAddOpen(Option<String>),
    BulkAddRow(Record),
    BulkAddClose,
    /// A line sent as-is.
    Raw(String),
}

impl Command {
    pub fn add(record: Record) -> Command {
        Command::Add(Add { record, into: None })
    }

    pub fn insert(record: Record, table: impl Into<String>) -> Command {
        Command::Add(Add {
            record,
            into: Some(table.into()),
        })
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Info => write!(f, "INFO"),
            Command::Ping => write!(f, "PING"),
            Command::Help => write!(f, "HELP"),
            Command::Add(cmd) => write!(f, "{}", cmd),
            Command::Get(cmd) => write!(f, "{}", cmd),
            Command::Count(scope) => write!(f, "COUNT{}", scope),
            Command::Clear(scope) => write!(f, "CLEAR{}", scope),
            Command::Flush(scope) => write!(f, "FLUSH{}", scope),
            Command::Create(name) => write!(f, "CREATE {}", name),
            Command::Use(name) => write!(f, "USE {}", name),
            Command::Exists(name) => write!(f, "EXISTS {}", name),
            Command::BulkAddOpen(None) => write!(f, "{}", bulkadd::OPEN),
            Command::BulkAddOpen(Some(table)) => write!(f, "{} INTO {}", bulkadd::OPEN, table),
            Command::BulkAddRow(record) => write!(f, "{};", record),
            Command::BulkAddClose => write!(f, "{}", bulkadd::CLOSE),
            Command::Raw(text) => write!(f, "{}", text),
        }
    }
}
