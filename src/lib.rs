//! An async client for an append-only tick store.
//!
//! Every command issued through a [`Client`] travels over a single TCP connection. Commands are
//! written one at a time and each reply is matched to its caller positionally, since response
//! frames carry no request identifier.

pub mod client;
pub mod codec;
pub mod commands;
pub mod config;
pub mod connection;
pub mod error;
pub mod frame;
pub mod queue;
pub mod record;

pub use client::{Client, Fetched};
pub use commands::Command;
pub use config::Config;
pub use connection::State;
pub use error::Error;
pub use frame::Frame;
pub use record::Record;

pub type Result<T> = std::result::Result<T, Error>;
