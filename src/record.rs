use itertools::Itertools;
use serde::Deserialize;
use std::fmt;

pub(crate) const FIELD_SEPARATOR: &str = ", ";

/// A single tick: either a trade or an order book level update.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Record {
    /// Seconds since the epoch, with a fractional part.
    #[serde(rename = "ts")]
    pub timestamp: f64,
    pub seq: u32,
    pub is_trade: bool,
    pub is_bid: bool,
    pub price: f32,
    pub size: f32,
}

impl Record {
    pub fn new(
        timestamp: f64,
        seq: u32,
        is_trade: bool,
        is_bid: bool,
        price: f32,
        size: f32,
    ) -> Self {
        Self {
            timestamp,
            seq,
            is_trade,
            is_bid,
            price,
            size,
        }
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "t"
    } else {
        "f"
    }
}

/// Renders the row fields as the store expects them, without the trailing `;`:
/// `<ts>, <seq>, <t|f>, <t|f>, <price>, <size>`.
impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = [
            self.timestamp.to_string(),
            self.seq.to_string(),
            flag(self.is_trade).to_string(),
            flag(self.is_bid).to_string(),
            self.price.to_string(),
            self.size.to_string(),
        ];

        write!(f, "{}", fields.iter().join(FIELD_SEPARATOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_whole_timestamp() {
        let record = Record::new(100.0, 0, true, true, 0.1, 0.1);

        assert_eq!(record.to_string(), "100, 0, t, t, 0.1, 0.1");
    }

    #[test]
    fn display_fractional_timestamp_and_flags() {
        let record = Record::new(1505177459.685, 139010, false, true, 0.25, 7.5);

        assert_eq!(
            record.to_string(),
            "1505177459.685, 139010, f, t, 0.25, 7.5"
        );
    }

    #[test]
    fn deserialize_json_row() {
        let json = r#"{"ts":1505177459.685,"seq":139010,"is_trade":true,"is_bid":false,"price":0.5,"size":2.0}"#;

        let record: Record = serde_json::from_str(json).unwrap();

        assert_eq!(record, Record::new(1505177459.685, 139010, true, false, 0.5, 2.0));
    }
}
