use std::collections::VecDeque;
use tokio::sync::oneshot;

use crate::commands::Command;
use crate::frame::Frame;
use crate::{Error, Result};

pub(crate) type Responder = oneshot::Sender<Result<Vec<Frame>>>;

/// A unit of work waiting for the connection: one command, or a sequence of commands that must
/// reach the server back to back. Its responder fires exactly once.
#[derive(Debug)]
pub struct PendingQuery {
    steps: VecDeque<Command>,
    replies: Vec<Frame>,
    in_flight: bool,
    responder: Responder,
}

impl PendingQuery {
    pub(crate) fn new(steps: Vec<Command>, responder: Responder) -> Self {
        Self {
            replies: Vec::with_capacity(steps.len()),
            steps: steps.into(),
            in_flight: false,
            responder,
        }
    }

    /// Takes the next command to write and marks it as awaiting a reply.
    pub fn next_step(&mut self) -> Option<Command> {
        let step = self.steps.pop_front()?;
        self.in_flight = true;
        Some(step)
    }

    /// Whether a command of this query has been written and its reply has not arrived yet.
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn record(&mut self, frame: Frame) {
        self.replies.push(frame);
        self.in_flight = false;
    }

    pub fn complete(self) {
        // The caller may have stopped waiting, the reply is dropped in that case.
        let _ = self.responder.send(Ok(self.replies));
    }

    pub fn fail(self, err: Error) {
        let _ = self.responder.send(Err(err));
    }
}

/// Queries accepted by the connection but not yet sent, oldest first.
#[derive(Debug, Default)]
pub struct PendingQueryQueue {
    queries: VecDeque<PendingQuery>,
}

impl PendingQueryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, query: PendingQuery) {
        self.queries.push_back(query);
    }

    pub fn pop(&mut self) -> Option<PendingQuery> {
        self.queries.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Fails every queued query, in order, with the error built by `err`.
    pub fn fail_all(&mut self, err: impl Fn() -> Error) {
        for query in self.queries.drain(..) {
            query.fail(err());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(steps: Vec<Command>) -> (PendingQuery, oneshot::Receiver<Result<Vec<Frame>>>) {
        let (tx, rx) = oneshot::channel();
        (PendingQuery::new(steps, tx), rx)
    }

    #[test]
    fn queue_is_fifo() {
        let mut queue = PendingQueryQueue::new();
        let (first, _rx1) = pending(vec![Command::Ping]);
        let (second, _rx2) = pending(vec![Command::Info]);

        queue.push(first);
        queue.push(second);

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop().unwrap().next_step(), Some(Command::Ping));
        assert_eq!(queue.pop().unwrap().next_step(), Some(Command::Info));
        assert!(queue.is_empty());
    }

    #[test]
    fn steps_alternate_with_replies() {
        let (mut query, mut rx) =
            pending(vec![Command::BulkAddOpen(None), Command::BulkAddClose]);

        assert!(!query.in_flight());
        assert_eq!(query.next_step(), Some(Command::BulkAddOpen(None)));
        assert!(query.in_flight());

        query.record(Frame::ok("1"));
        assert!(!query.in_flight());
        assert_eq!(query.next_step(), Some(Command::BulkAddClose));

        query.record(Frame::ok("2"));
        assert_eq!(query.next_step(), None);

        query.complete();
        let replies = rx.try_recv().unwrap().unwrap();
        assert_eq!(replies, vec![Frame::ok("1"), Frame::ok("2")]);
    }

    #[test]
    fn fail_all_notifies_every_query() {
        let mut queue = PendingQueryQueue::new();
        let (first, mut rx1) = pending(vec![Command::Ping]);
        let (second, mut rx2) = pending(vec![Command::Ping]);
        queue.push(first);
        queue.push(second);

        queue.fail_all(|| Error::ConnectionClosed);

        assert!(queue.is_empty());
        assert!(matches!(rx1.try_recv(), Ok(Err(Error::ConnectionClosed))));
        assert!(matches!(rx2.try_recv(), Ok(Err(Error::ConnectionClosed))));
    }
}
