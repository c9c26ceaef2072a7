use std::fmt;

use crate::record::Record;

/// Appends one record, to the table in use or to the one named by `into`.
///
/// Wire form: `ADD <ts>, <seq>, <t|f>, <t|f>, <price>, <size>;[ INTO <table>]`
#[derive(Clone, Debug, PartialEq)]
pub struct Add {
    pub record: Record,
    pub into: Option<String>,
}

impl fmt::Display for Add {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ADD {};", self.record)?;
        if let Some(table) = &self.into {
            write!(f, " INTO {}", table)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::commands::Command;
    use crate::record::Record;

    #[test]
    fn add_to_current_table() {
        let record = Record::new(100.0, 0, true, true, 0.1, 0.1);

        assert_eq!(
            Command::add(record).to_string(),
            "ADD 100, 0, t, t, 0.1, 0.1;"
        );
    }

    #[test]
    fn insert_into_named_table() {
        let record = Record::new(1505177459.685, 139010, false, false, 0.5, 3.0);

        assert_eq!(
            Command::insert(record, "bnc_xrp_btc").to_string(),
            "ADD 1505177459.685, 139010, f, f, 0.5, 3; INTO bnc_xrp_btc"
        );
    }
}
