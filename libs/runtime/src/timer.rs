//! Delayed Message Delivery
//!
//! The timing collaborator of the runtime: actors have no intrinsic
//! timeouts, so any timing behavior (a countdown, a deadline) is built from
//! delayed self-messages scheduled here.
//!
//! Contract: the message reaches the target's mailbox no earlier than
//! `delay` after the call, at most once, unless the handle cancels it first.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::trace;

use crate::registry::ActorId;
use crate::system::ActorSystem;

/// Schedules one-shot delayed deliveries into a system's mailboxes
#[derive(Debug, Clone)]
pub struct TimerService {
    system: ActorSystem,
}

impl TimerService {
    pub fn new(system: ActorSystem) -> Self {
        Self { system }
    }

    /// Deliver `message` to `target` no earlier than `delay` from now.
    ///
    /// Delivery is fire-and-forget like any send: a target that terminates
    /// in the meantime drops the message.
    pub fn schedule<M: Send + Sync + 'static>(
        &self,
        delay: Duration,
        target: ActorId,
        message: M,
    ) -> TimerHandle {
        let system = self.system.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            trace!(actor_id = %target, delay_ms = delay.as_millis() as u64, "Timer fired");
            system.send(target, message);
        });
        TimerHandle { task }
    }
}

/// Handle to one scheduled delivery
#[derive(Debug)]
pub struct TimerHandle {
    task: JoinHandle<()>,
}

impl TimerHandle {
    /// Cancel the delivery if it has not fired yet.
    ///
    /// Returns whether the timer was still pending at the moment of the
    /// call; a `false` means the message already left (or the delivery task
    /// ended). At-most-once delivery holds either way.
    pub fn cancel(self) -> bool {
        let pending = !self.task.is_finished();
        self.task.abort();
        pending
    }
}
