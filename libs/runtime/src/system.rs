//! Actor System Core
//!
//! Runtime with actor lifecycle management, message delivery, and the three
//! coupling primitives: links (symmetric failure propagation), monitors
//! (one-shot termination notifications), and trap-exit (signals delivered as
//! messages).
//!
//! Each actor runs as an independent tokio task; no actor blocks another
//! except through explicit messages or an intentional link cascade. All
//! cross-actor state lives behind one registry lock, never held across an
//! await, so coupling bookkeeping is atomic with respect to concurrent
//! termination: an operation racing a death either completes before the
//! cascade or observes the tombstone, never a half-recorded relation.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::Mutex;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::context::ActorContext;
use crate::dispatch;
use crate::error::{Result, RuntimeError};
use crate::mailbox;
use crate::messages::{Envelope, ExitReason};
use crate::registry::{ActorEntry, ActorId, MonitorRef, Registry};

/// System configuration
#[derive(Debug, Clone)]
pub struct SystemConfig {
    /// Name used in log fields; generated when absent
    pub name: Option<String>,

    /// Stash size at which selective receive logs a warning, a sign that a
    /// selector never matches
    pub stash_warn_threshold: usize,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            name: None,
            stash_warn_threshold: 1024,
        }
    }
}

/// System-wide counters
#[derive(Debug, Default)]
pub struct SystemMetrics {
    pub actors_spawned: AtomicU64,
    pub actors_terminated: AtomicU64,
    pub cascade_kills: AtomicU64,
    pub messages_sent: AtomicU64,
    pub signals_trapped: AtomicU64,
    pub down_notifications: AtomicU64,
}

impl SystemMetrics {
    /// Consistent-enough point-in-time copy of the counters
    pub fn snapshot(&self) -> SystemStats {
        SystemStats {
            actors_spawned: self.actors_spawned.load(Ordering::Relaxed),
            actors_terminated: self.actors_terminated.load(Ordering::Relaxed),
            cascade_kills: self.cascade_kills.load(Ordering::Relaxed),
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            signals_trapped: self.signals_trapped.load(Ordering::Relaxed),
            down_notifications: self.down_notifications.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time system statistics
#[derive(Debug, Clone)]
pub struct SystemStats {
    pub actors_spawned: u64,
    pub actors_terminated: u64,
    pub cascade_kills: u64,
    pub messages_sent: u64,
    pub signals_trapped: u64,
    pub down_notifications: u64,
}

/// Core actor system managing actor lifecycles and coupling relations.
///
/// Cheap to clone; clones share the same runtime state.
#[derive(Debug, Clone)]
pub struct ActorSystem {
    registry: Arc<Mutex<Registry>>,
    metrics: Arc<SystemMetrics>,
    config: SystemConfig,
    system_id: String,
}

impl ActorSystem {
    /// Create new actor system with default configuration
    pub fn new() -> Self {
        Self::with_config(SystemConfig::default())
    }

    /// Create new actor system
    pub fn with_config(config: SystemConfig) -> Self {
        let system_id = config
            .name
            .clone()
            .unwrap_or_else(|| format!("system-{}", Uuid::new_v4()));
        info!(system_id = %system_id, "Creating new actor system");

        let metrics = Arc::new(SystemMetrics::default());
        Self {
            registry: Arc::new(Mutex::new(Registry::new(Arc::clone(&metrics)))),
            metrics,
            config,
            system_id,
        }
    }

    /// Spawn a new actor running `work`.
    ///
    /// Returns a live id immediately. The work future's output converts into
    /// the termination reason (`()` converts to `ExitReason::Normal`); a
    /// panic becomes `ExitReason::Fault` carrying the panic message.
    pub fn spawn<F, Fut, R>(&self, work: F) -> ActorId
    where
        F: FnOnce(ActorContext) -> Fut + Send + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: Into<ExitReason> + Send + 'static,
    {
        let id = ActorId::new();
        let (sender, receiver) = mailbox::channel(self.config.stash_warn_threshold);
        self.registry.lock().actors.insert(id, ActorEntry::new(sender));
        self.launch(id, ActorContext::new(id, receiver), work);
        id
    }

    /// Spawn a new actor already linked to `owner`.
    ///
    /// Registration and link happen in one critical section, so the child
    /// cannot die unlinked in the window an explicit `spawn` + `link` pair
    /// would leave open. The owner must still be running.
    pub fn spawn_linked<F, Fut, R>(&self, owner: ActorId, work: F) -> Result<ActorId>
    where
        F: FnOnce(ActorContext) -> Fut + Send + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: Into<ExitReason> + Send + 'static,
    {
        let id = ActorId::new();
        let (sender, receiver) = mailbox::channel(self.config.stash_warn_threshold);
        {
            let mut registry = self.registry.lock();
            if !registry.actors.contains_key(&owner) {
                return Err(RuntimeError::InvalidTarget { actor: owner });
            }
            registry.actors.insert(id, ActorEntry::new(sender));
            registry.links.insert(owner, id);
        }
        self.launch(id, ActorContext::new(id, receiver), work);
        Ok(id)
    }

    fn launch<F, Fut, R>(&self, id: ActorId, ctx: ActorContext, work: F)
    where
        F: FnOnce(ActorContext) -> Fut + Send + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: Into<ExitReason> + Send + 'static,
    {
        let system = self.clone();
        let task = tokio::spawn(async move {
            let outcome = AssertUnwindSafe(work(ctx)).catch_unwind().await;
            let reason = match outcome {
                Ok(result) => result.into(),
                Err(payload) => panic_reason(payload),
            };
            system.finish(id, reason);
        });

        let mut registry = self.registry.lock();
        match registry.actors.get_mut(&id) {
            Some(entry) => entry.task = Some(task),
            // terminated before the handle landed; the abort preserves kill
            // semantics either way
            None => task.abort(),
        }
        drop(registry);

        self.metrics.actors_spawned.fetch_add(1, Ordering::Relaxed);
        debug!(actor_id = %id, system_id = %self.system_id, "Actor spawned");
    }

    /// Termination path for an actor whose work future ran to completion
    /// (or panicked). Idempotent with `terminate`.
    fn finish(&self, id: ActorId, reason: ExitReason) {
        let mut registry = self.registry.lock();
        let _aborted = dispatch::propagate_termination(&mut registry, id, reason);
    }

    /// Forcibly end an actor, triggering exit-signal propagation.
    ///
    /// The cancellation primitive: idempotent on already-terminated actors,
    /// `InvalidTarget` for ids that were never spawned.
    pub fn terminate(&self, id: ActorId, reason: ExitReason) -> Result<()> {
        let mut registry = self.registry.lock();
        if registry.actors.contains_key(&id) {
            let _aborted = dispatch::propagate_termination(&mut registry, id, reason);
            Ok(())
        } else if registry.tombstones.contains_key(&id) {
            Ok(())
        } else {
            Err(RuntimeError::InvalidTarget { actor: id })
        }
    }

    /// Enqueue `message` into actor `id`'s mailbox.
    ///
    /// Fire and forget: sending to a terminated or unknown actor silently
    /// drops the message. Callers needing delivery confirmation monitor the
    /// target instead.
    pub fn send<M: Send + Sync + 'static>(&self, id: ActorId, message: M) {
        let registry = self.registry.lock();
        match registry.actors.get(&id) {
            Some(entry) => {
                entry.mailbox.send_user(Envelope::user(message));
                self.metrics.messages_sent.fetch_add(1, Ordering::Relaxed);
            }
            None => {
                trace!(actor_id = %id, "Message dropped: target not running");
            }
        }
    }

    /// Establish a symmetric failure-propagation relation between `a` and
    /// `b`. Idempotent.
    ///
    /// When one endpoint already terminated, the correct exit signal is
    /// synthesized for the survivor instead of recording a dangling
    /// relation, so a `link` racing a termination never loses the signal.
    pub fn link(&self, a: ActorId, b: ActorId) -> Result<()> {
        if a == b {
            return Err(RuntimeError::SelfLinkRejected { actor: a });
        }

        let mut registry = self.registry.lock();
        for id in [a, b] {
            if !registry.knows(id) {
                return Err(RuntimeError::InvalidTarget { actor: id });
            }
        }

        let a_live = registry.actors.contains_key(&a);
        let b_live = registry.actors.contains_key(&b);
        match (a_live, b_live) {
            (true, true) => {
                registry.links.insert(a, b);
            }
            (true, false) => {
                let reason = registry.tombstones[&b].clone();
                let _aborted = dispatch::deliver_exit_signal(&mut registry, a, b, reason);
            }
            (false, true) => {
                let reason = registry.tombstones[&a].clone();
                let _aborted = dispatch::deliver_exit_signal(&mut registry, b, a, reason);
            }
            (false, false) => {}
        }
        Ok(())
    }

    /// Remove the link between `a` and `b`, if any. Idempotent.
    pub fn unlink(&self, a: ActorId, b: ActorId) -> Result<()> {
        let mut registry = self.registry.lock();
        for id in [a, b] {
            if !registry.knows(id) {
                return Err(RuntimeError::InvalidTarget { actor: id });
            }
        }
        registry.links.remove(a, b);
        Ok(())
    }

    /// Whether `a` and `b` are currently linked
    pub fn linked(&self, a: ActorId, b: ActorId) -> bool {
        self.registry.lock().links.contains(a, b)
    }

    /// Watch `target` for termination on behalf of `watcher`.
    ///
    /// Exactly one down-notification is delivered per returned reference,
    /// for any termination reason including `Normal`, and the watcher never
    /// terminates as a result. Race-free: a target that already terminated
    /// yields an immediate notification carrying its recorded reason. A call
    /// landing during a cascade observes either the target still live (the
    /// notification arrives when the cascade reaches it) or its tombstone
    /// (the notification arrives now), never neither.
    pub fn monitor(&self, watcher: ActorId, target: ActorId) -> Result<MonitorRef> {
        let mut registry = self.registry.lock();
        if !registry.actors.contains_key(&watcher) {
            return Err(RuntimeError::InvalidTarget { actor: watcher });
        }

        let reference = MonitorRef::new();
        if registry.actors.contains_key(&target) {
            registry.monitors.insert(reference, watcher, target);
        } else if let Some(reason) = registry.tombstones.get(&target).cloned() {
            // already gone: fire immediately with the last known reason
            if let Some(watcher_entry) = registry.actors.get(&watcher) {
                watcher_entry.mailbox.send_signal(Envelope::Down {
                    monitor: reference,
                    actor: target,
                    reason,
                });
                self.metrics
                    .down_notifications
                    .fetch_add(1, Ordering::Relaxed);
            }
        } else {
            return Err(RuntimeError::InvalidTarget { actor: target });
        }
        Ok(reference)
    }

    /// Retire a monitor before it fires. Returns whether it was still
    /// pending; `false` after the notification was delivered (a no-op).
    pub fn demonitor(&self, reference: MonitorRef) -> bool {
        self.registry.lock().monitors.remove(reference).is_some()
    }

    /// Toggle exit trapping for `id`.
    ///
    /// A trapping actor receives propagated exit signals as
    /// [`Envelope::Exit`] messages instead of terminating. A no-op on
    /// already-terminated actors.
    pub fn set_trap_exit(&self, id: ActorId, trap: bool) -> Result<()> {
        let mut registry = self.registry.lock();
        if let Some(entry) = registry.actors.get_mut(&id) {
            entry.trap_exit = trap;
            debug!(actor_id = %id, trap, "Trap-exit flag updated");
            Ok(())
        } else if registry.tombstones.contains_key(&id) {
            Ok(())
        } else {
            Err(RuntimeError::InvalidTarget { actor: id })
        }
    }

    /// Whether the actor is still running
    pub fn is_alive(&self, id: ActorId) -> bool {
        self.registry.lock().actors.contains_key(&id)
    }

    /// Ids of all currently running actors
    pub fn live_actors(&self) -> Vec<ActorId> {
        self.registry.lock().actors.keys().copied().collect()
    }

    /// Recorded reason of a terminated actor, `None` while it runs or if it
    /// was never spawned
    pub fn termination_reason(&self, id: ActorId) -> Option<ExitReason> {
        self.registry.lock().tombstones.get(&id).cloned()
    }

    /// Get system metrics
    pub fn metrics(&self) -> Arc<SystemMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Shutdown the entire actor system.
    ///
    /// Every remaining actor terminates with [`ExitReason::Shutdown`]
    /// (monitors fire, trapping actors see the signal before their task is
    /// cancelled) and all tasks are joined. The teardown boundary of the
    /// runtime.
    pub async fn shutdown(&self) {
        info!(system_id = %self.system_id, "Shutting down actor system");

        let aborted = {
            let mut registry = self.registry.lock();
            let ids: Vec<ActorId> = registry.actors.keys().copied().collect();
            let mut aborted = Vec::new();
            for id in ids {
                aborted.extend(dispatch::propagate_termination(
                    &mut registry,
                    id,
                    ExitReason::Shutdown,
                ));
            }
            aborted
        };

        for task in aborted {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    warn!(error = %e, "Actor task ended abnormally during shutdown");
                }
            }
        }

        info!(system_id = %self.system_id, "Actor system shutdown complete");
    }
}

impl Default for ActorSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_reason(payload: Box<dyn std::any::Any + Send>) -> ExitReason {
    let message = payload
        .downcast_ref::<&'static str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "actor panicked".to_string());
    ExitReason::Fault(message)
}
