//! Channels carrying pipeline events to a front end.
//!
//! Stage workers send events from their own threads. On a bounded channel
//! a slow consumer must not stall hashing, so per-stage progress events
//! are dropped while the channel is full. Events that open or close a run
//! (`Started`, `Completed`, `Cancelled`, `Error`) always wait for room.

use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TrySendError};
use tracing::trace;

use super::Event;

/// Sending half, cloned into every stage worker
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Send an event.
    ///
    /// Nothing happens once the receiver is gone.
    pub fn send(&self, event: Event) {
        let event = match self.inner.try_send(event) {
            Ok(()) | Err(TrySendError::Disconnected(_)) => return,
            Err(TrySendError::Full(event)) => event,
        };

        let Event::Pipeline(pipeline_event) = &event;
        if pipeline_event.is_progress() {
            trace!(?pipeline_event, "Event channel full, dropping progress event");
            return;
        }
        let _ = self.inner.send(event);
    }
}

/// Receiving half, drained by the front end
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Events until every sender is dropped
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

pub struct EventChannel;

impl EventChannel {
    /// Unbounded channel: every event is delivered.
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (EventSender, EventReceiver) {
        Self::wrap(unbounded())
    }

    /// Channel holding at most `capacity` undelivered events.
    pub fn bounded(capacity: usize) -> (EventSender, EventReceiver) {
        Self::wrap(bounded(capacity))
    }

    fn wrap((sender, receiver): (Sender<Event>, Receiver<Event>)) -> (EventSender, EventReceiver) {
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}

/// Sender whose events go nowhere
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = EventChannel::new();
    sender
}
