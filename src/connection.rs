use futures::{SinkExt, StreamExt};
use std::future::Future;
use std::io;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, watch};
use tokio_util::codec::Framed;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::codec::FrameCodec;
use crate::frame::Frame;
use crate::queue::{PendingQuery, PendingQueryQueue};
use crate::Error;

/// Lifecycle of the single connection behind a client. It only moves forward, except for
/// `Connected -> Disconnected` when the socket goes away. A disconnected client stays that way.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum State {
    Disconnected,
    Connecting,
    Connected,
}

/// Owns the socket and every query submitted through it.
///
/// Only one query is active at a time, and only one command of that query is written before its
/// reply arrives. Replies carry no request id, so this is what ties each reply to its caller.
pub struct Connection {
    pub id: Uuid,
    requests: mpsc::UnboundedReceiver<PendingQuery>,
    state: watch::Sender<State>,
    queue: PendingQueryQueue,
    active: Option<PendingQuery>,
    codec: FrameCodec,
}

impl Connection {
    pub(crate) fn new(
        requests: mpsc::UnboundedReceiver<PendingQuery>,
        state: watch::Sender<State>,
        codec: FrameCodec,
    ) -> Connection {
        Connection {
            id: Uuid::new_v4(),
            requests,
            state,
            queue: PendingQueryQueue::new(),
            active: None,
            codec,
        }
    }

    #[instrument(name = "connection", skip_all, fields(connection_id, addr))]
    pub(crate) async fn run<F, T>(mut self, addr: String, connect: F)
    where
        F: Future<Output = io::Result<T>>,
        T: AsyncRead + AsyncWrite + Unpin,
    {
        tracing::Span::current()
            .record("connection_id", self.id.to_string())
            .record("addr", addr.as_str());

        self.set_state(State::Connecting);

        // Nothing can be written before the socket exists, so everything submitted in the
        // meantime waits in the queue.
        tokio::pin!(connect);
        let stream = loop {
            tokio::select! {
                res = &mut connect => break res,
                Some(query) = self.requests.recv() => {
                    debug!("queueing query until connected");
                    self.queue.push(query);
                }
            }
        };

        let stream = match stream {
            Ok(stream) => stream,
            Err(err) => {
                error!("failed to connect: {}", err);
                self.set_state(State::Disconnected);
                self.queue.fail_all(|| Error::connect(&err));
                self.reject_incoming(|| Error::connect(&err));
                return;
            }
        };

        let mut transport = Framed::new(stream, self.codec.clone());
        self.set_state(State::Connected);
        info!("connected, {} queries waiting", self.queue.len());

        // A failed read or write leaves the stream out of step with the queue, so either one ends
        // the connection.
        let mut outcome = self.advance(&mut transport).await;
        while outcome.is_ok() {
            outcome = tokio::select! {
                query = self.requests.recv() => match query {
                    Some(query) => {
                        self.queue.push(query);
                        self.advance(&mut transport).await
                    }
                    None => {
                        debug!("every client handle was dropped");
                        break;
                    }
                },
                frame = transport.next() => match frame {
                    Some(Ok(frame)) => {
                        self.on_frame(frame);
                        self.advance(&mut transport).await
                    }
                    Some(Err(err)) => Err(err),
                    None => {
                        info!("connection closed by peer");
                        break;
                    }
                },
            };
        }

        self.set_state(State::Disconnected);
        if let Err(err) = outcome {
            warn!("transport failed: {}", err);
            match self.active.take() {
                Some(query) => query.fail(err),
                None => warn!("transport error with no active query, nobody to notify"),
            }
        }
        if let Some(query) = self.active.take() {
            query.fail(Error::ConnectionClosed);
        }
        self.queue.fail_all(|| Error::ConnectionClosed);
        self.reject_incoming(|| Error::ConnectionClosed);
        info!("connection closed");
    }

    /// Writes the next command if nothing is awaiting a reply. A query whose commands have all
    /// been answered is completed here, and the following one is started.
    ///
    /// On a write error the query being written stays active, and the encoded bytes may still
    /// sit in the write buffer. The transport must not be used again.
    async fn advance<T>(&mut self, transport: &mut Framed<T, FrameCodec>) -> Result<(), Error>
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        loop {
            if self.active.is_none() {
                match self.queue.pop() {
                    Some(query) => self.active = Some(query),
                    None => return Ok(()),
                }
            }

            let Some(query) = self.active.as_mut() else {
                return Ok(());
            };

            if query.in_flight() {
                return Ok(());
            }

            let Some(command) = query.next_step() else {
                if let Some(query) = self.active.take() {
                    query.complete();
                }
                continue;
            };

            debug!(%command, "sending command");
            return transport.send(command).await;
        }
    }

    fn on_frame(&mut self, frame: Frame) {
        match self.active.as_mut() {
            Some(query) if query.in_flight() => {
                debug!(%frame, "received frame");
                query.record(frame);
            }
            _ => warn!(%frame, "dropping frame received with no active query"),
        }
    }

    fn set_state(&self, state: State) {
        debug!(%state, "state change");
        self.state.send_replace(state);
    }

    /// Stops accepting queries and fails the ones that raced with shutdown.
    fn reject_incoming(&mut self, err: impl Fn() -> Error) {
        self.requests.close();
        while let Ok(query) = self.requests.try_recv() {
            query.fail(err());
        }
    }
}
