//! Actor Identity and Live-Actor Table
//!
//! Ids for actors and monitors, plus the registry that tracks which actors
//! are running, which have terminated (tombstones), and the link/monitor
//! relations between them. The registry is the single synchronization point:
//! every coupling operation and every termination runs under its lock, which
//! is what makes registration-vs-termination races impossible.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::links::LinkTable;
use crate::mailbox::MailboxSender;
use crate::messages::ExitReason;
use crate::monitors::MonitorTable;
use crate::system::SystemMetrics;

/// Unique actor identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActorId {
    id: Uuid,
}

impl ActorId {
    /// Create new actor ID
    pub fn new() -> Self {
        Self { id: Uuid::new_v4() }
    }

    /// Create from UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self { id }
    }

    /// Get UUID
    pub fn uuid(&self) -> Uuid {
        self.id
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor-{}", self.id.simple())
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique reference identifying a single monitor registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonitorRef {
    id: Uuid,
}

impl MonitorRef {
    pub(crate) fn new() -> Self {
        Self { id: Uuid::new_v4() }
    }

    /// Create from UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self { id }
    }

    /// Get UUID
    pub fn uuid(&self) -> Uuid {
        self.id
    }
}

impl fmt::Display for MonitorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "monitor-{}", self.id.simple())
    }
}

/// Bookkeeping for one live actor
#[derive(Debug)]
pub(crate) struct ActorEntry {
    /// Sending half of the actor's mailbox
    pub mailbox: MailboxSender,

    /// When set, incoming exit signals become mailbox messages instead of
    /// terminating the actor
    pub trap_exit: bool,

    /// Task handle, stored after spawn for abort-on-terminate and shutdown
    /// joining
    pub task: Option<JoinHandle<()>>,
}

impl ActorEntry {
    pub fn new(mailbox: MailboxSender) -> Self {
        Self {
            mailbox,
            trap_exit: false,
            task: None,
        }
    }
}

/// Runtime state shared by every handle to one actor system
#[derive(Debug)]
pub(crate) struct Registry {
    /// Actors currently running
    pub actors: HashMap<ActorId, ActorEntry>,

    /// Symmetric failure-propagation relations
    pub links: LinkTable,

    /// Directed one-shot termination-notification relations
    pub monitors: MonitorTable,

    /// Last known reason of every terminated actor. Retained for the
    /// runtime's lifetime so a late `monitor` call can synthesize its
    /// down-notification instead of losing it.
    pub tombstones: HashMap<ActorId, ExitReason>,

    /// Shared counters, incremented at the bookkeeping sites
    pub metrics: Arc<SystemMetrics>,
}

impl Registry {
    pub fn new(metrics: Arc<SystemMetrics>) -> Self {
        Self {
            actors: HashMap::new(),
            links: LinkTable::default(),
            monitors: MonitorTable::default(),
            tombstones: HashMap::new(),
            metrics,
        }
    }

    /// Remove a live actor's entry, if it is still live
    pub fn remove_live(&mut self, id: ActorId) -> Option<ActorEntry> {
        self.actors.remove(&id)
    }

    /// Whether the id was ever spawned (live or terminated)
    pub fn knows(&self, id: ActorId) -> bool {
        self.actors.contains_key(&id) || self.tombstones.contains_key(&id)
    }
}
