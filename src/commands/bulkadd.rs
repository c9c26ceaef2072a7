use crate::commands::Command;
use crate::record::Record;

pub(crate) const OPEN: &str = "BULKADD";
pub(crate) const CLOSE: &str = "DDAKLUB";

/// A block of rows framed by `BULKADD[ INTO <table>]` and `DDAKLUB`.
///
/// The rows only make sense between the two markers, so the block is submitted as a single unit
/// of work and nothing else is written on the connection until it is done.
#[derive(Clone, Debug, PartialEq)]
pub struct BulkAdd {
    pub records: Vec<Record>,
    pub into: Option<String>,
}

impl BulkAdd {
    /// The commands of the block in wire order: the opener, one row per record, the terminator.
    pub fn into_steps(self) -> Vec<Command> {
        let mut steps = Vec::with_capacity(self.records.len() + 2);
        steps.push(Command::BulkAddOpen(self.into));
        steps.extend(self.records.into_iter().map(Command::BulkAddRow));
        steps.push(Command::BulkAddClose);
        steps
    }
}
