//! Runtime Error Types
//!
//! Synchronous error taxonomy for the coupling operations. Failures inside
//! an actor's own logic are never surfaced here: they become that actor's
//! termination reason and flow through link and monitor propagation.

use thiserror::Error;

use crate::registry::ActorId;

/// Result alias used across the runtime
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Main runtime error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// Operation referenced an actor id that was never spawned
    #[error("Invalid target: actor {actor} does not exist")]
    InvalidTarget { actor: ActorId },

    /// An actor attempted to link itself
    #[error("Self link rejected: {actor} cannot link to itself")]
    SelfLinkRejected { actor: ActorId },
}
