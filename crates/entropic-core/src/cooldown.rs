//! Bounded per-actor activation cooldowns.
//!
//! A `CooldownCache` stores the last activation step per actor and evicts
//! lazily: entries past the TTL are dropped whenever the cache is about to
//! grow past its capacity. This replaces the unbounded global map the
//! pattern usually degenerates into.

use crate::fixed::Steps;
use crate::id::ActorId;
use std::collections::BTreeMap;

/// Bounded associative cache of last-activation timestamps.
#[derive(Debug, Clone)]
pub struct CooldownCache {
    entries: BTreeMap<ActorId, Steps>,
    capacity: usize,
    ttl: Steps,
}

impl CooldownCache {
    /// `capacity` is clamped to at least 1; `ttl` is the retention horizon
    /// for lazy eviction and should exceed every cooldown used with the
    /// cache.
    pub fn new(capacity: usize, ttl: Steps) -> Self {
        Self {
            entries: BTreeMap::new(),
            capacity: capacity.max(1),
            ttl: ttl.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remaining cooldown steps for an actor, 0 when ready.
    pub fn remaining(&self, actor: ActorId, now: Steps, cooldown: Steps) -> Steps {
        match self.entries.get(&actor) {
            Some(&last) => {
                let elapsed = now.saturating_sub(last);
                cooldown.saturating_sub(elapsed)
            }
            None => 0,
        }
    }

    /// Try to activate: returns false while the actor is still cooling
    /// down, otherwise records `now` as the new activation time.
    pub fn try_activate(&mut self, actor: ActorId, now: Steps, cooldown: Steps) -> bool {
        if cooldown > 0 && self.remaining(actor, now, cooldown) > 0 {
            return false;
        }
        if !self.entries.contains_key(&actor) && self.entries.len() >= self.capacity {
            self.evict(now);
        }
        self.entries.insert(actor, now);
        true
    }

    /// Drop entries past the TTL; if everything is fresh, drop the oldest
    /// entry (smallest timestamp, smallest actor id as tie-break) so the
    /// cache never exceeds its capacity.
    fn evict(&mut self, now: Steps) {
        let ttl = self.ttl;
        self.entries.retain(|_, &mut last| now.saturating_sub(last) < ttl);
        if self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(actor, last)| (**last, **actor))
                .map(|(&actor, _)| actor);
            if let Some(actor) = oldest {
                self.entries.remove(&actor);
            }
        }
    }

    /// Clear an actor's cooldown (admin/test hook).
    pub fn clear(&mut self, actor: ActorId) {
        self.entries.remove(&actor);
    }
}

// ===========================================================================
// Tests
// ===========================================================================
