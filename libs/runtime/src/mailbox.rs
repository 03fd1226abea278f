//! Per-Actor Mailbox
//!
//! Two-lane queue per actor: a signal lane for runtime-generated exit and
//! down notifications, and a user lane for application traffic. The receiver
//! drains the signal lane first (biased select), so coupling notifications
//! are never stuck behind a backlog of ordinary messages. Ordering is FIFO
//! per lane; no ordering is guaranteed across lanes or across senders.
//!
//! Selective receive keeps skipped messages in a stash, in arrival order,
//! and re-offers them to later receives.

use std::collections::VecDeque;

use tokio::sync::mpsc;
use tracing::warn;

use crate::messages::Envelope;

/// Sending half, held by the registry for the actor's lifetime
#[derive(Debug)]
pub(crate) struct MailboxSender {
    signals: mpsc::UnboundedSender<Envelope>,
    user: mpsc::UnboundedSender<Envelope>,
}

impl MailboxSender {
    /// Enqueue on the user lane. Fire and forget: a closed mailbox drops
    /// the message.
    pub fn send_user(&self, envelope: Envelope) {
        let _ = self.user.send(envelope);
    }

    /// Enqueue on the signal lane
    pub fn send_signal(&self, envelope: Envelope) {
        let _ = self.signals.send(envelope);
    }
}

/// Receiving half, owned by the actor through its context
pub struct MailboxReceiver {
    signals: mpsc::UnboundedReceiver<Envelope>,
    user: mpsc::UnboundedReceiver<Envelope>,
    stash: VecDeque<Envelope>,
    stash_warn_threshold: usize,
    stash_warned: bool,
}

/// Create a connected mailbox pair
pub(crate) fn channel(stash_warn_threshold: usize) -> (MailboxSender, MailboxReceiver) {
    let (signal_tx, signal_rx) = mpsc::unbounded_channel();
    let (user_tx, user_rx) = mpsc::unbounded_channel();

    let sender = MailboxSender {
        signals: signal_tx,
        user: user_tx,
    };

    let receiver = MailboxReceiver {
        signals: signal_rx,
        user: user_rx,
        stash: VecDeque::new(),
        stash_warn_threshold,
        stash_warned: false,
    };

    (sender, receiver)
}

impl MailboxReceiver {
    /// Dequeue the next message, stashed messages first.
    ///
    /// Returns `None` once the actor is terminated and the mailbox drained.
    pub async fn recv(&mut self) -> Option<Envelope> {
        if let Some(envelope) = self.stash.pop_front() {
            return Some(envelope);
        }
        self.next_arrival().await
    }

    /// Dequeue the next message matching `selector`, suspending until one
    /// arrives. Non-matching messages are stashed in arrival order.
    pub async fn recv_where<F>(&mut self, mut selector: F) -> Option<Envelope>
    where
        F: FnMut(&Envelope) -> bool,
    {
        if let Some(position) = self.stash.iter().position(|e| selector(e)) {
            return self.stash.remove(position);
        }
        loop {
            let envelope = self.next_arrival().await?;
            if selector(&envelope) {
                return Some(envelope);
            }
            self.push_stash(envelope);
        }
    }

    /// Dequeue without suspending; `None` when nothing is ready
    pub fn try_recv(&mut self) -> Option<Envelope> {
        if let Some(envelope) = self.stash.pop_front() {
            return Some(envelope);
        }
        if let Ok(envelope) = self.signals.try_recv() {
            return Some(envelope);
        }
        self.user.try_recv().ok()
    }

    async fn next_arrival(&mut self) -> Option<Envelope> {
        tokio::select! {
            biased;

            Some(envelope) = self.signals.recv() => Some(envelope),
            Some(envelope) = self.user.recv() => Some(envelope),
            else => None,
        }
    }

    fn push_stash(&mut self, envelope: Envelope) {
        self.stash.push_back(envelope);
        if self.stash.len() >= self.stash_warn_threshold && !self.stash_warned {
            self.stash_warned = true;
            warn!(
                stashed = self.stash.len(),
                "selective receive stash keeps growing; selector may never match"
            );
        }
    }
}
