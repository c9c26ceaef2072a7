use std::fmt;

/// Reads records back as a JSON array, either the first `limit` of them or all of them.
///
/// Wire form: `GET <n> AS JSON` or `GET ALL AS JSON`
#[derive(Clone, Debug, PartialEq)]
pub struct Get {
    pub limit: Option<u64>,
}

impl fmt::Display for Get {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.limit {
            Some(n) => write!(f, "GET {} AS JSON", n),
            None => write!(f, "GET ALL AS JSON"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_with_limit() {
        assert_eq!(Get { limit: Some(10) }.to_string(), "GET 10 AS JSON");
    }

    #[test]
    fn get_all() {
        assert_eq!(Get { limit: None }.to_string(), "GET ALL AS JSON");
    }
}
