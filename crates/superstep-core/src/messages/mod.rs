//! Double-buffered message passing between supersteps.
//!
//! Every messenger keeps two buffers. During superstep `k` workers append to
//! the send buffer while reading their inbound messages from the receive
//! buffer, which holds exactly what was sent during `k - 1`. The executor
//! calls [`Messenger::init_iteration`] between supersteps to swap the roles
//! and clear the new send buffer.
//!
//! # Variants
//!
//! - [`QueueMessenger`]: keeps every message, one locked queue per node.
//! - [`ReducingMessenger`]: folds messages with a [`Reducer`] on arrival,
//!   at most one message per node and superstep.

mod queue;
mod reducing;


pub use queue::QueueMessenger;
pub use reducing::ReducingMessenger;

use parking_lot::MutexGuard;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Message transport used by the executor.
///
/// `send_to`, `messages` and `has_messages` are called concurrently by the
/// workers. `init_iteration` needs `&mut self`, so it can only run once every
/// worker of the previous superstep has returned.
pub trait Messenger: Send + Sync {
    /// Prepares the buffers for `superstep`.
    ///
    /// For `superstep > 0` the buffers swap roles and the new send buffer is
    /// emptied.
    fn init_iteration(&mut self, superstep: u64);

    /// Sends `message` from `source` to `target`, visible next superstep.
    fn send_to(&self, source: u64, target: u64, message: f64) -> Result<()>;

    /// Messages sent to `node` during the previous superstep.
    fn messages(&self, node: u64) -> Result<Messages<'_>>;

    /// True if `node` received at least one message in the previous superstep.
    fn has_messages(&self, node: u64) -> Result<bool>;

    /// Resolved variant of this messenger.
    fn kind(&self) -> MessengerKind;
}

/// Folds messages addressed to the same node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reducer {
    /// Sum of all messages.
    Sum,
    /// Smallest message.
    Min,
    /// Largest message.
    Max,
    /// Number of messages.
    Count,
}

impl Reducer {
    /// Neutral element of the fold.
    #[must_use]
    pub fn identity(self) -> f64 {
        match self {
            Reducer::Sum | Reducer::Count => 0.0,
            Reducer::Min => f64::INFINITY,
            Reducer::Max => f64::NEG_INFINITY,
        }
    }

    /// Folds `message` into `current`.
    #[inline]
    #[must_use]
    pub fn reduce(self, current: f64, message: f64) -> f64 {
        match self {
            Reducer::Sum => current + message,
            Reducer::Min => current.min(message),
            Reducer::Max => current.max(message),
            Reducer::Count => current + 1.0,
        }
    }
}

/// Which messenger the executor allocates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessengerKind {
    /// Reducing if the computation declares a reducer, queue otherwise.
    #[default]
    Auto,
    /// Keep every message.
    Queue,
    /// Fold messages on arrival.
    Reducing,
}

impl MessengerKind {
    /// Resolves `Auto` against the computation's reducer.
    ///
    /// # Errors
    ///
    /// `Error::Configuration` if `Reducing` is requested without a reducer.
    pub fn resolve(self, reducer: Option<Reducer>) -> Result<MessengerKind> {
        match (self, reducer) {
            (MessengerKind::Auto, Some(_)) | (MessengerKind::Reducing, Some(_)) => {
                Ok(MessengerKind::Reducing)
            }
            (MessengerKind::Auto | MessengerKind::Queue, _) => Ok(MessengerKind::Queue),
            (MessengerKind::Reducing, None) => Err(Error::Configuration(
                "reducing messenger requires a computation with a reducer".to_string(),
            )),
        }
    }
}

/// Allocates the messenger selected by `kind`.
pub(crate) fn create(
    kind: MessengerKind,
    reducer: Option<Reducer>,
    node_count: u64,
    page_shift: u32,
) -> Result<Box<dyn Messenger>> {
    match (kind.resolve(reducer)?, reducer) {
        (MessengerKind::Reducing, Some(reducer)) => Ok(Box::new(ReducingMessenger::new(
            reducer, node_count, page_shift,
        )?)),
        _ => Ok(Box::new(QueueMessenger::new(node_count, page_shift)?)),
    }
}

/// Inbound messages of one node for the current superstep.
///
/// Finite and consumed once. For the queue messenger the node's queue stays
/// locked while this value is alive; nobody else reads it during the
/// superstep.
pub struct Messages<'a> {
    inner: Inner<'a>,
}

enum Inner<'a> {
    Queue {
        guard: MutexGuard<'a, Vec<f64>>,
        position: usize,
    },
    Single(Option<f64>),
    Empty,
}

impl<'a> Messages<'a> {
    pub(crate) fn queue(guard: MutexGuard<'a, Vec<f64>>) -> Self {
        Self {
            inner: Inner::Queue { guard, position: 0 },
        }
    }

    pub(crate) fn single(message: f64) -> Self {
        Self {
            inner: Inner::Single(Some(message)),
        }
    }

    /// No messages.
    #[must_use]
    pub fn empty() -> Self {
        Self { inner: Inner::Empty }
    }

    /// True if no message is left.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn remaining(&self) -> usize {
        match &self.inner {
            Inner::Queue { guard, position } => guard.len() - position,
            Inner::Single(message) => usize::from(message.is_some()),
            Inner::Empty => 0,
        }
    }
}

impl Iterator for Messages<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        match &mut self.inner {
            Inner::Queue { guard, position } => {
                let message = guard.get(*position).copied();
                if message.is_some() {
                    *position += 1;
                }
                message
            }
            Inner::Single(message) => message.take(),
            Inner::Empty => None,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Messages<'_> {}

impl std::fmt::Debug for Messages<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Messages")
            .field("remaining", &self.remaining())
            .finish()
    }
}
