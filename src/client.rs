use bytes::Bytes;
use std::future::Future;
use std::io;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::debug;

use crate::codec::FrameCodec;
use crate::commands::{BulkAdd, Command, Get, Scope};
use crate::config::Config;
use crate::connection::{Connection, State};
use crate::frame::Frame;
use crate::queue::PendingQuery;
use crate::record::Record;
use crate::{Error, Result};

/// Outcome of a bounded `GET`.
#[derive(Clone, Debug, PartialEq)]
pub enum Fetched {
    Records(Vec<Record>),
    /// The store refused the request, this is its explanation.
    Raw(Bytes),
}

/// Handle to a connection. Cloning it is cheap and every clone shares the same connection, so
/// commands issued from different tasks are written one after the other in submission order.
#[derive(Clone, Debug)]
pub struct Client {
    requests: mpsc::UnboundedSender<PendingQuery>,
    state: watch::Receiver<State>,
}

impl Client {
    /// Starts connecting in the background and returns right away. Commands issued before the
    /// connection is up are queued and sent as soon as it is.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(config: Config) -> Client {
        let connect = TcpStream::connect(config.addr.clone());
        Client::with_transport(config, connect)
    }

    /// Connects and only returns once the connection is established.
    pub async fn connect(config: Config) -> Result<Client> {
        let stream = TcpStream::connect(config.addr.as_str())
            .await
            .map_err(Error::Connect)?;
        let client = Client::with_transport(config, async move { Ok::<_, io::Error>(stream) });
        client.wait_connected().await?;
        Ok(client)
    }

    /// Runs the client over any byte stream produced by `connect`.
    pub fn with_transport<F, T>(config: Config, connect: F) -> Client
    where
        F: Future<Output = io::Result<T>> + Send + 'static,
        T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (requests, rx) = mpsc::unbounded_channel();
        let (state_tx, state) = watch::channel(State::Connecting);

        let connection = Connection::new(rx, state_tx, FrameCodec::new(config.max_frame_size));
        tokio::spawn(connection.run(config.addr, connect));

        Client { requests, state }
    }

    pub fn state(&self) -> State {
        *self.state.borrow()
    }

    /// Waits until the connection attempt is over.
    pub async fn wait_connected(&self) -> Result<()> {
        let mut state = self.state.clone();
        let current = state
            .wait_for(|state| *state != State::Connecting)
            .await
            .map_err(|_| Error::ConnectionClosed)?;

        match *current {
            State::Connected => Ok(()),
            _ => Err(Error::ConnectionClosed),
        }
    }

    /// Sends one command and waits for its reply.
    pub async fn cmd(&self, command: Command) -> Result<Frame> {
        let mut replies = self.sequence(vec![command]).await?;
        replies.pop().ok_or(Error::ConnectionClosed)
    }

    /// Sends the commands back to back, as a single unit: no other command is written on the
    /// connection until the last one is answered. Each command waits for the previous reply.
    async fn sequence(&self, steps: Vec<Command>) -> Result<Vec<Frame>> {
        let (tx, rx) = oneshot::channel();
        self.requests
            .send(PendingQuery::new(steps, tx))
            .map_err(|_| Error::ConnectionClosed)?;

        rx.await.map_err(|_| Error::ConnectionClosed)?
    }

    pub async fn info(&self) -> Result<Frame> {
        self.cmd(Command::Info).await
    }

    pub async fn ping(&self) -> Result<Frame> {
        self.cmd(Command::Ping).await
    }

    pub async fn help(&self) -> Result<Frame> {
        self.cmd(Command::Help).await
    }

    pub async fn add(&self, record: Record) -> Result<Frame> {
        self.cmd(Command::add(record)).await
    }

    pub async fn insert(&self, record: Record, table: &str) -> Result<Frame> {
        self.cmd(Command::insert(record, table)).await
    }

    pub async fn bulkadd(&self, records: impl IntoIterator<Item = Record>) -> Result<Frame> {
        self.bulk(BulkAdd {
            records: records.into_iter().collect(),
            into: None,
        })
        .await
    }

    /// The table must already exist, it is not created on the fly.
    pub async fn bulkadd_into(
        &self,
        records: impl IntoIterator<Item = Record>,
        table: &str,
    ) -> Result<Frame> {
        self.bulk(BulkAdd {
            records: records.into_iter().collect(),
            into: Some(table.to_string()),
        })
        .await
    }

    /// Resolves with the first rejected step, or with the terminator's reply when every step
    /// went through. The terminator is always sent.
    async fn bulk(&self, bulk: BulkAdd) -> Result<Frame> {
        debug!(records = bulk.records.len(), into = ?bulk.into, "bulk insert");
        let replies = self.sequence(bulk.into_steps()).await?;

        let mut last = None;
        for frame in replies {
            if !frame.success {
                return Ok(frame);
            }
            last = Some(frame);
        }
        last.ok_or(Error::ConnectionClosed)
    }

    pub async fn get(&self, n: u64) -> Result<Fetched> {
        let frame = self.cmd(Command::Get(Get { limit: Some(n) })).await?;
        if !frame.success {
            return Ok(Fetched::Raw(frame.payload));
        }

        let records = serde_json::from_slice(&frame.payload)?;
        Ok(Fetched::Records(records))
    }

    /// `None` when the store refuses the request.
    pub async fn getall(&self) -> Result<Option<Vec<Record>>> {
        let frame = self.cmd(Command::Get(Get { limit: None })).await?;
        if !frame.success {
            return Ok(None);
        }

        let records = serde_json::from_slice(&frame.payload)?;
        Ok(Some(records))
    }

    pub async fn clear(&self) -> Result<Frame> {
        self.cmd(Command::Clear(Scope::Current)).await
    }

    pub async fn clearall(&self) -> Result<Frame> {
        self.cmd(Command::Clear(Scope::All)).await
    }

    pub async fn flush(&self) -> Result<Frame> {
        self.cmd(Command::Flush(Scope::Current)).await
    }

    pub async fn flushall(&self) -> Result<Frame> {
        self.cmd(Command::Flush(Scope::All)).await
    }

    pub async fn count(&self) -> Result<Frame> {
        self.cmd(Command::Count(Scope::Current)).await
    }

    pub async fn countall(&self) -> Result<Frame> {
        self.cmd(Command::Count(Scope::All)).await
    }

    pub async fn create(&self, name: &str) -> Result<Frame> {
        self.cmd(Command::Create(name.to_string())).await
    }

    pub async fn use_table(&self, name: &str) -> Result<Frame> {
        self.cmd(Command::Use(name.to_string())).await
    }

    pub async fn exists(&self, name: &str) -> Result<Frame> {
        self.cmd(Command::Exists(name.to_string())).await
    }
}
