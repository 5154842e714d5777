use std::{collections::HashMap, hash::Hash, time::Duration, time::Instant};

/// Coalesces bursts of change signals per key.
///
/// A key becomes ready once no new signal arrived for it during the quiet
/// window; every signal restarts its window.
#[derive(Debug, Clone)]
pub struct Debouncer<K> {
    window: Duration,
    pending: HashMap<K, Instant>,
    coalesced: u64,
}

impl<K> Debouncer<K>
where
    K: Eq + Hash + Ord + Clone,
{
    /// Debouncer with the given quiet window.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: HashMap::new(),
            coalesced: 0,
        }
    }

    /// Record a signal for `key`. Returns `true` when it merged into one
    /// already pending.
    pub fn enqueue(&mut self, key: K, now: Instant) -> bool {
        let merged = self.pending.insert(key, now).is_some();
        if merged {
            self.coalesced = self.coalesced.saturating_add(1);
        }
        merged
    }

    /// Remove and return keys whose window has elapsed, oldest first.
    pub fn flush_ready(&mut self, now: Instant) -> Vec<K> {
        let mut ready = self
            .pending
            .iter()
            .filter(|(_, last)| now.saturating_duration_since(**last) >= self.window)
            .map(|(key, last)| (key.clone(), *last))
            .collect::<Vec<_>>();
        ready.sort_by(|(left_key, left), (right_key, right)| {
            left.cmp(right).then_with(|| left_key.cmp(right_key))
        });
        for (key, _) in &ready {
            self.pending.remove(key);
        }
        ready.into_iter().map(|(key, _)| key).collect()
    }

    /// Earliest instant at which some pending key becomes ready.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().min().map(|last| *last + self.window)
    }

    /// Keys still waiting for their window to elapse.
    pub fn pending_depth(&self) -> usize {
        self.pending.len()
    }

    /// Signals absorbed into an already pending key.
    pub fn coalesced(&self) -> u64 {
        self.coalesced
    }

    /// Forget every pending key.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
