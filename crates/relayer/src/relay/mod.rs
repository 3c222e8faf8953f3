//! Relay hub: publisher slot, subscriber set and history.
//!
//! All three live behind a single mutex so that registration, removal and
//! ingestion are strictly serialized. Subscribers are unbounded queues; pushing
//! a frame never waits, and the socket write happens in the connection's own
//! writer task, so the lock is never held across network I/O. Because the
//! history replay for a new subscriber is queued while the lock is held, every
//! subscriber sees its replay first and never sees an event twice.

mod history;

pub use history::{HistoryBuffer, DEFAULT_HISTORY_SIZE};

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use axum::extract::ws::Utf8Bytes;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use shared::codec::{self, CodecError};
use shared::Envelope;

/// An encoded text frame. Clones share the same buffer, so one broadcast is
/// never copied per subscriber.
pub type Frame = Utf8Bytes;

/// Outbound queue of one subscriber connection.
pub type SubscriberTx = mpsc::UnboundedSender<Frame>;

/// Identity of a registered publisher connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PublisherId(u64);

/// Identity of a registered subscriber connection. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(u64);

impl fmt::Display for PublisherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pub-{}", self.0)
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Why a publisher frame was not broadcast. None of these are fatal.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("publisher {0} is not the registered publisher")]
    StalePublisher(PublisherId),
    #[error("malformed payload: {0}")]
    Malformed(#[from] CodecError),
    #[error("unrecognized message type {0:?}")]
    Unrecognized(String),
}

/// Point-in-time counters, served on `/stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HubStats {
    pub subscribers: usize,
    pub has_publisher: bool,
    pub history_len: usize,
    pub history_capacity: usize,
}

struct HubState {
    publisher: Option<PublisherId>,
    subscribers: BTreeMap<SubscriberId, SubscriberTx>,
    history: HistoryBuffer,
    next_id: u64,
}

impl HubState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

pub struct Hub {
    state: Mutex<HubState>,
}

impl Hub {
    pub fn new(history_size: usize) -> Self {
        Self {
            state: Mutex::new(HubState {
                publisher: None,
                subscribers: BTreeMap::new(),
                history: HistoryBuffer::new(history_size),
                next_id: 0,
            }),
        }
    }

    // Nothing panics while holding the lock, so a poisoned guard still holds
    // consistent state.
    fn lock(&self) -> MutexGuard<'_, HubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take the publisher slot. Last registration wins; a displaced publisher
    /// stays connected but its frames are dropped from then on.
    pub fn register_publisher(&self) -> PublisherId {
        let mut state = self.lock();
        let id = PublisherId(state.next_id());
        match state.publisher.replace(id) {
            Some(prev) => warn!(publisher = %id, displaced = %prev, "publisher replaced"),
            None => info!(publisher = %id, "publisher registered"),
        }
        id
    }

    /// Clear the slot if `id` still holds it. Returns whether it did.
    pub fn unregister_publisher(&self, id: PublisherId) -> bool {
        let mut state = self.lock();
        if state.publisher == Some(id) {
            state.publisher = None;
            info!(publisher = %id, "publisher unregistered");
            true
        } else {
            debug!(publisher = %id, "stale publisher close ignored");
            false
        }
    }

    /// Add a subscriber and queue the history replay for it, if there is any.
    pub fn register_subscriber(&self, tx: SubscriberTx) -> SubscriberId {
        let mut state = self.lock();
        let id = SubscriberId(state.next_id());

        if !state.history.is_empty() {
            match codec::encode_history(state.history.as_contiguous()) {
                Ok(frame) => {
                    if tx.send(Frame::from(frame)).is_err() {
                        debug!(subscriber = %id, "subscriber gone before history replay");
                    }
                }
                Err(e) => warn!(subscriber = %id, error = %e, "failed to encode history"),
            }
        }

        state.subscribers.insert(id, tx);
        info!(
            subscriber = %id,
            subscribers = state.subscribers.len(),
            "subscriber registered"
        );
        id
    }

    /// Remove a subscriber. Unknown or already removed ids are a no-op.
    pub fn unregister_subscriber(&self, id: SubscriberId) -> bool {
        let mut state = self.lock();
        let removed = state.subscribers.remove(&id).is_some();
        if removed {
            info!(
                subscriber = %id,
                subscribers = state.subscribers.len(),
                "subscriber unregistered"
            );
        }
        removed
    }

    /// Record a `post_data` frame from `publisher` and queue it, unchanged, for
    /// every subscriber. Returns how many subscriber queues accepted it.
    pub fn ingest_publish(
        &self,
        publisher: PublisherId,
        raw: impl Into<Frame>,
    ) -> Result<usize, IngestError> {
        let raw = raw.into();
        let value = match codec::decode(raw.as_str())? {
            Envelope::PostData(value) => value,
            other => return Err(IngestError::Unrecognized(other.kind().to_string())),
        };
        let frame = codec::encode_broadcast(raw);

        let mut state = self.lock();
        if state.publisher != Some(publisher) {
            return Err(IngestError::StalePublisher(publisher));
        }
        state.history.append(value);

        let mut delivered = 0;
        for (id, tx) in &state.subscribers {
            if tx.send(frame.clone()).is_ok() {
                delivered += 1;
            } else {
                debug!(subscriber = %id, "subscriber queue closed, skipping");
            }
        }
        Ok(delivered)
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    pub fn has_publisher(&self) -> bool {
        self.lock().publisher.is_some()
    }

    pub fn current_publisher(&self) -> Option<PublisherId> {
        self.lock().publisher
    }

    pub fn history_len(&self) -> usize {
        self.lock().history.len()
    }

    pub fn history_snapshot(&self) -> Vec<Value> {
        self.lock().history.snapshot()
    }

    pub fn stats(&self) -> HubStats {
        let state = self.lock();
        HubStats {
            subscribers: state.subscribers.len(),
            has_publisher: state.publisher.is_some(),
            history_len: state.history.len(),
            history_capacity: state.history.capacity(),
        }
    }
}
