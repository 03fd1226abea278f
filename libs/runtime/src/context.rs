//! Actor Execution Context
//!
//! The handle an actor's work receives: its own id plus the receiving half
//! of its mailbox. Receiving is the actor's only suspension point.

use crate::mailbox::MailboxReceiver;
use crate::messages::Envelope;
use crate::registry::ActorId;

/// Per-actor context, moved into the work future at spawn
pub struct ActorContext {
    id: ActorId,
    mailbox: MailboxReceiver,
}

impl ActorContext {
    pub(crate) fn new(id: ActorId, mailbox: MailboxReceiver) -> Self {
        Self { id, mailbox }
    }

    /// This actor's id
    pub fn actor_id(&self) -> ActorId {
        self.id
    }

    /// Dequeue the next message, suspending until one arrives.
    ///
    /// Returns `None` once the actor has been terminated and its mailbox
    /// drained.
    pub async fn recv(&mut self) -> Option<Envelope> {
        self.mailbox.recv().await
    }

    /// Dequeue the next message matching `selector`, suspending until one
    /// arrives. Skipped messages stay queued for later receives.
    pub async fn recv_where<F>(&mut self, selector: F) -> Option<Envelope>
    where
        F: FnMut(&Envelope) -> bool,
    {
        self.mailbox.recv_where(selector).await
    }

    /// Dequeue without suspending
    pub fn try_recv(&mut self) -> Option<Envelope> {
        self.mailbox.try_recv()
    }
}
