use std::io;
use std::str::Utf8Error;
use thiserror::Error as ThisError;

use crate::frame;

#[derive(Debug, ThisError)]
pub enum Error {
    /// The socket failed while a query was being written or awaited.
    #[error("transport error: {0}")]
    Io(#[from] io::Error),
    /// The bytes received could not be decoded as a response frame.
    #[error("protocol error; {0}")]
    Frame(#[from] frame::Error),
    #[error("failed to connect: {0}")]
    Connect(io::Error),
    /// The connection is gone. No reconnection is attempted.
    #[error("connection closed")]
    ConnectionClosed,
    #[error("invalid json payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] Utf8Error),
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Builds a standalone copy of a connect error, one for every query that was waiting on it.
    pub(crate) fn connect(err: &io::Error) -> Error {
        Error::Connect(io::Error::new(err.kind(), err.to_string()))
    }
}
