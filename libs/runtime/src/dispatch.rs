//! Exit-Signal Dispatch
//!
//! Decides, per receiver, whether a propagated exit signal kills the actor
//! or is delivered as a mailbox message (trap-exit), and runs the resulting
//! crash cascade over the link graph.
//!
//! Cascades use an explicit worklist rather than recursion, so a cycle of
//! mutually linked actors terminates: each actor leaves the live table the
//! first time the worklist reaches it, and later visits are skipped.
//!
//! All of this runs under the registry lock. A whole connected component is
//! settled in one critical section, which is what gives `link`/`monitor`
//! callers their either-before-or-after guarantee.

use std::collections::VecDeque;
use std::sync::atomic::Ordering;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::messages::{Envelope, ExitReason};
use crate::registry::{ActorId, Registry};

/// Terminate `root` with `reason` and propagate along links until the
/// worklist drains. Returns the aborted task handles so callers that tear
/// the system down can join them.
pub(crate) fn propagate_termination(
    registry: &mut Registry,
    root: ActorId,
    reason: ExitReason,
) -> Vec<JoinHandle<()>> {
    let mut aborted = Vec::new();
    let mut worklist = VecDeque::new();
    worklist.push_back((root, reason, false));

    while let Some((id, reason, cascaded)) = worklist.pop_front() {
        // an actor can be queued through several link paths; only the first
        // visit finds it live
        let Some(entry) = registry.remove_live(id) else {
            continue;
        };
        debug!(actor_id = %id, reason = %reason, cascaded, "actor terminated");

        registry.tombstones.insert(id, reason.clone());
        registry.metrics.actors_terminated.fetch_add(1, Ordering::Relaxed);
        if cascaded {
            registry.metrics.cascade_kills.fetch_add(1, Ordering::Relaxed);
        }

        if let Some(task) = entry.task {
            task.abort();
            aborted.push(task);
        }

        // monitors aimed at this actor fire exactly once, for any reason
        for (reference, watcher) in registry.monitors.take_for_target(id) {
            if let Some(watcher_entry) = registry.actors.get(&watcher) {
                watcher_entry.mailbox.send_signal(Envelope::Down {
                    monitor: reference,
                    actor: id,
                    reason: reason.clone(),
                });
                registry
                    .metrics
                    .down_notifications
                    .fetch_add(1, Ordering::Relaxed);
            }
        }

        // monitors this actor held are retired without firing
        registry.monitors.drop_watcher(id);

        // link partners: trapping partners get a message for every reason,
        // non-trapping partners join the cascade unless the exit was graceful
        for partner in registry.links.take_partners(id) {
            let Some(partner_entry) = registry.actors.get(&partner) else {
                continue;
            };
            if partner_entry.trap_exit {
                partner_entry.mailbox.send_signal(Envelope::Exit {
                    source: id,
                    reason: reason.clone(),
                });
                registry
                    .metrics
                    .signals_trapped
                    .fetch_add(1, Ordering::Relaxed);
            } else if !reason.is_normal() {
                worklist.push_back((partner, reason.clone(), true));
            }
        }
    }

    aborted
}

/// Deliver one exit signal to `receiver`, as if a linked `source` had just
/// terminated with `reason`. Used to synthesize the signal when a `link`
/// call finds its far endpoint already tombstoned.
pub(crate) fn deliver_exit_signal(
    registry: &mut Registry,
    receiver: ActorId,
    source: ActorId,
    reason: ExitReason,
) -> Vec<JoinHandle<()>> {
    let trap_exit = match registry.actors.get(&receiver) {
        Some(entry) => entry.trap_exit,
        None => return Vec::new(),
    };
    if trap_exit {
        if let Some(entry) = registry.actors.get(&receiver) {
            entry.mailbox.send_signal(Envelope::Exit { source, reason });
        }
        registry
            .metrics
            .signals_trapped
            .fetch_add(1, Ordering::Relaxed);
        Vec::new()
    } else if reason.is_normal() {
        Vec::new()
    } else {
        propagate_termination(registry, receiver, reason)
    }
}
