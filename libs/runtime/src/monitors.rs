//! Monitor Table
//!
//! Directed, one-shot termination-notification registry. Each entry is keyed
//! by a unique [`MonitorRef`] and fires at most once: either retired by
//! `demonitor` before the target dies, or consumed when the target's
//! termination takes every monitor aimed at it.
//!
//! Fire order for one target is registration order.

use std::collections::HashMap;

use crate::registry::{ActorId, MonitorRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MonitorEntry {
    pub watcher: ActorId,
    pub target: ActorId,
}

#[derive(Debug, Default)]
pub(crate) struct MonitorTable {
    entries: HashMap<MonitorRef, MonitorEntry>,
    by_target: HashMap<ActorId, Vec<MonitorRef>>,
    by_watcher: HashMap<ActorId, Vec<MonitorRef>>,
}

impl MonitorTable {
    pub fn insert(&mut self, reference: MonitorRef, watcher: ActorId, target: ActorId) {
        self.entries
            .insert(reference, MonitorEntry { watcher, target });
        self.by_target.entry(target).or_default().push(reference);
        self.by_watcher.entry(watcher).or_default().push(reference);
    }

    /// Retire a pending monitor. `None` when it already fired or never
    /// existed.
    pub fn remove(&mut self, reference: MonitorRef) -> Option<MonitorEntry> {
        let entry = self.entries.remove(&reference)?;
        Self::unindex(&mut self.by_target, entry.target, reference);
        Self::unindex(&mut self.by_watcher, entry.watcher, reference);
        Some(entry)
    }

    /// Consume every monitor aimed at `target`, in registration order,
    /// returning `(reference, watcher)` pairs to notify
    pub fn take_for_target(&mut self, target: ActorId) -> Vec<(MonitorRef, ActorId)> {
        let references = self.by_target.remove(&target).unwrap_or_default();
        references
            .into_iter()
            .filter_map(|reference| {
                let entry = self.entries.remove(&reference)?;
                Self::unindex(&mut self.by_watcher, entry.watcher, reference);
                Some((reference, entry.watcher))
            })
            .collect()
    }

    /// Retire every monitor held by a watcher that terminated; nothing fires
    pub fn drop_watcher(&mut self, watcher: ActorId) {
        let references = self.by_watcher.remove(&watcher).unwrap_or_default();
        for reference in references {
            if let Some(entry) = self.entries.remove(&reference) {
                Self::unindex(&mut self.by_target, entry.target, reference);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn unindex(index: &mut HashMap<ActorId, Vec<MonitorRef>>, key: ActorId, reference: MonitorRef) {
        if let Some(references) = index.get_mut(&key) {
            references.retain(|r| *r != reference);
            if references.is_empty() {
                index.remove(&key);
            }
        }
    }

    #[cfg(test)]
    fn check_invariants(&self) {
        for (reference, entry) in &self.entries {
            assert!(self.by_target[&entry.target].contains(reference));
            assert!(self.by_watcher[&entry.watcher].contains(reference));
        }
        let indexed: usize = self.by_target.values().map(Vec::len).sum();
        assert_eq!(indexed, self.entries.len());
        let indexed: usize = self.by_watcher.values().map(Vec::len).sum();
        assert_eq!(indexed, self.entries.len());
    }
}
