//! Mailbox Message Types
//!
//! Every message an actor can dequeue is a tagged [`Envelope`]: application
//! payloads travel as `Arc<dyn Any>` (zero-copy within the process), while
//! exit signals and down-notifications are first-class variants so receivers
//! match on them without any dynamic dispatch of their own.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::registry::{ActorId, MonitorRef};

/// Why an actor stopped running.
///
/// `Normal` is the only graceful reason; every other value is treated as a
/// failure by link propagation. Panics inside an actor's work map to
/// [`ExitReason::Fault`] carrying the panic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitReason {
    /// Graceful completion; never cascades over links
    Normal,
    /// System teardown; propagates like a fault
    Shutdown,
    /// Abnormal termination with a describing message
    Fault(String),
}

impl ExitReason {
    /// Shorthand for an abnormal reason
    pub fn fault(message: impl Into<String>) -> Self {
        Self::Fault(message.into())
    }

    /// Whether this reason is the designated graceful one
    pub fn is_normal(&self) -> bool {
        matches!(self, Self::Normal)
    }
}

impl From<()> for ExitReason {
    fn from(_: ()) -> Self {
        Self::Normal
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => f.write_str("normal"),
            Self::Shutdown => f.write_str("shutdown"),
            Self::Fault(message) => write!(f, "fault: {}", message),
        }
    }
}

/// A single mailbox message
#[derive(Clone)]
pub enum Envelope {
    /// Application payload, shared by reference within the process
    User(Arc<dyn Any + Send + Sync>),

    /// Trapped exit signal from a linked actor
    Exit {
        source: ActorId,
        reason: ExitReason,
    },

    /// One-shot termination notification from a monitor
    Down {
        monitor: MonitorRef,
        actor: ActorId,
        reason: ExitReason,
    },
}

impl Envelope {
    /// Wrap an application message
    pub fn user<M: Send + Sync + 'static>(message: M) -> Self {
        Self::User(Arc::new(message))
    }

    /// Borrow the application payload if this is a `User` envelope of type `M`
    pub fn payload<M: 'static>(&self) -> Option<&M> {
        match self {
            Self::User(payload) => payload.downcast_ref::<M>(),
            _ => None,
        }
    }

    /// Whether this envelope is runtime-generated (exit or down)
    pub fn is_signal(&self) -> bool {
        !matches!(self, Self::User(_))
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(_) => f.write_str("User(..)"),
            Self::Exit { source, reason } => f
                .debug_struct("Exit")
                .field("source", source)
                .field("reason", reason)
                .finish(),
            Self::Down {
                monitor,
                actor,
                reason,
            } => f
                .debug_struct("Down")
                .field("monitor", monitor)
                .field("actor", actor)
                .field("reason", reason)
                .finish(),
        }
    }
}
