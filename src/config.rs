use std::env;

use crate::Error;

pub const DEFAULT_ADDR: &str = "127.0.0.1:9001";
pub const DEFAULT_MAX_FRAME_SIZE: usize = 512 * 1024 * 1024;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// `host:port` of the store.
    pub addr: String,
    /// Largest response payload accepted before the connection is considered broken.
    pub max_frame_size: usize,
}

impl Config {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `TICKLOG_ADDR` and `MAX_FRAME_SIZE` when they are set.
    pub fn from_env() -> Result<Self, Error> {
        let mut config = Self::default();

        if let Ok(addr) = env::var("TICKLOG_ADDR") {
            config.addr = addr;
        }

        if let Ok(size) = env::var("MAX_FRAME_SIZE") {
            config.max_frame_size = size.parse().map_err(|_| {
                Error::Config(format!("MAX_FRAME_SIZE must be a number, got {size:?}"))
            })?;
        }

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_keeps_default_frame_limit() {
        let config = Config::new("10.0.0.1:9001");

        assert_eq!(config.addr, "10.0.0.1:9001");
        assert_eq!(config.max_frame_size, DEFAULT_MAX_FRAME_SIZE);
    }
}
