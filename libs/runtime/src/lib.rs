//! Lifecycle-Coupled Actor Runtime
//!
//! Minimal actor runtime whose point is not scheduling but *coupling*:
//! actors establish failure-propagation relationships and decide, per actor,
//! whether a neighbor's death is fatal or just another message.
//!
//! ```text
//! ┌──────────────┐   link (symmetric)    ┌──────────────┐
//! │  coordinator │◄─────────────────────►│    worker    │
//! │ trap_exit=on │   monitor (one-shot)  │              │
//! │              │──────────────────────►│              │
//! └──────┬───────┘                       └──────┬───────┘
//!        │ Exit{source,reason}                  │ terminates
//!        │ Down{ref,actor,reason}               ▼
//!        ▼                                 reason != normal
//!   keeps running,                         cascades to every
//!   cleans up itself                       non-trapping link
//! ```
//!
//! Three primitives combine into the ownership patterns a host application
//! needs:
//!
//! - **Links** are mutual: when either endpoint terminates abnormally, the
//!   other receives an exit signal. Graceful (`normal`) exits do not
//!   propagate.
//! - **Monitors** are directed and one-shot: the watcher gets exactly one
//!   down-notification per monitor, for any termination reason, and never
//!   dies because of it.
//! - **Trap-exit** turns incoming exit signals into ordinary mailbox
//!   messages, so an owner can outlive its children and clean up instead of
//!   crashing with them.
//!
//! Everything is single-process: messages move as `Arc` payloads, never
//! serialized. There is no supervision tree, no name registry, and no
//! distribution; this is the layer such things are built on.
//!
//! # Examples
//!
//! ```
//! use lifeline_runtime::{ActorSystem, ExitReason};
//!
//! #[tokio::main]
//! async fn main() {
//!     let system = ActorSystem::new();
//!
//!     let worker = system.spawn(|mut ctx| async move {
//!         while let Some(envelope) = ctx.recv().await {
//!             if let Some(text) = envelope.payload::<String>() {
//!                 tracing::info!("worker got: {text}");
//!             }
//!         }
//!     });
//!
//!     system.send(worker, "hello".to_string());
//!     system.terminate(worker, ExitReason::Normal).unwrap();
//!     system.shutdown().await;
//! }
//! ```

pub mod context;
pub mod error;
pub mod mailbox;
pub mod messages;
pub mod registry;
pub mod system;
pub mod timer;

mod dispatch;
mod links;
mod monitors;

pub use context::ActorContext;
pub use error::{Result, RuntimeError};
pub use mailbox::MailboxReceiver;
pub use messages::{Envelope, ExitReason};
pub use registry::{ActorId, MonitorRef};
pub use system::{ActorSystem, SystemConfig, SystemMetrics, SystemStats};
pub use timer::{TimerHandle, TimerService};
