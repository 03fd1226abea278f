//! Link Table
//!
//! Symmetric failure-propagation registry. Invariant: `b` is recorded as a
//! partner of `a` exactly when `a` is recorded as a partner of `b`, and no
//! actor is ever its own partner (rejected before insertion).

use std::collections::{HashMap, HashSet};

use crate::registry::ActorId;

#[derive(Debug, Default)]
pub(crate) struct LinkTable {
    edges: HashMap<ActorId, HashSet<ActorId>>,
}

impl LinkTable {
    /// Insert a symmetric relation. Idempotent; returns whether it was new.
    pub fn insert(&mut self, a: ActorId, b: ActorId) -> bool {
        debug_assert_ne!(a, b, "self links must be rejected by the caller");
        let newly = self.edges.entry(a).or_default().insert(b);
        self.edges.entry(b).or_default().insert(a);
        newly
    }

    /// Remove a relation. Idempotent; returns whether it existed.
    pub fn remove(&mut self, a: ActorId, b: ActorId) -> bool {
        let existed = self
            .edges
            .get_mut(&a)
            .is_some_and(|partners| partners.remove(&b));
        if let Some(partners) = self.edges.get_mut(&b) {
            partners.remove(&a);
        }
        self.prune(a);
        self.prune(b);
        existed
    }

    pub fn contains(&self, a: ActorId, b: ActorId) -> bool {
        self.edges
            .get(&a)
            .is_some_and(|partners| partners.contains(&b))
    }

    /// Remove every relation touching `actor`, returning its former partners
    pub fn take_partners(&mut self, actor: ActorId) -> Vec<ActorId> {
        let partners = self.edges.remove(&actor).unwrap_or_default();
        for partner in &partners {
            if let Some(reverse) = self.edges.get_mut(partner) {
                reverse.remove(&actor);
            }
            self.prune(*partner);
        }
        partners.into_iter().collect()
    }

    /// Number of distinct links
    pub fn len(&self) -> usize {
        self.edges.values().map(HashSet::len).sum::<usize>() / 2
    }

    fn prune(&mut self, actor: ActorId) {
        if self.edges.get(&actor).is_some_and(HashSet::is_empty) {
            self.edges.remove(&actor);
        }
    }

    #[cfg(test)]
    fn check_invariants(&self) {
        for (actor, partners) in &self.edges {
            assert!(!partners.is_empty(), "empty partner sets must be pruned");
            for partner in partners {
                assert_ne!(actor, partner, "self link recorded");
                assert!(
                    self.contains(*partner, *actor),
                    "link is not symmetric: {} -> {}",
                    actor,
                    partner
                );
            }
        }
    }
}
