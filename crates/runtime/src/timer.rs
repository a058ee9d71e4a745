use std::collections::BTreeMap;

use foundation::math::stable_total_cmp_f64;
use foundation::time::Time;
use tracing::trace;

/// One-shot cancellable deadlines, polled from the frame tick.
///
/// Scheduling a key that is already pending moves its deadline.
#[derive(Debug, Clone)]
pub struct Timers<K: Ord + Copy + std::fmt::Debug> {
    deadlines: BTreeMap<K, Time>,
}

impl<K: Ord + Copy + std::fmt::Debug> Default for Timers<K> {
    fn default() -> Self {
        Self {
            deadlines: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Copy + std::fmt::Debug> Timers<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if an earlier deadline for `key` was replaced.
    pub fn schedule(&mut self, key: K, at: Time) -> bool {
        let replaced = self.deadlines.insert(key, at).is_some();
        trace!(?key, at = at.seconds(), replaced, "timer scheduled");
        replaced
    }

    pub fn cancel(&mut self, key: K) -> bool {
        self.deadlines.remove(&key).is_some()
    }

    pub fn cancel_all(&mut self) {
        self.deadlines.clear();
    }

    pub fn is_pending(&self, key: K) -> bool {
        self.deadlines.contains_key(&key)
    }

    pub fn deadline(&self, key: K) -> Option<Time> {
        self.deadlines.get(&key).copied()
    }

    /// Removes and returns every key whose deadline is `<= now`, earliest first
    /// (ties broken by key order).
    pub fn expire(&mut self, now: Time) -> Vec<K> {
        let mut due: Vec<(K, Time)> = self
            .deadlines
            .iter()
            .filter(|(_, at)| at.seconds() <= now.seconds())
            .map(|(k, at)| (*k, *at))
            .collect();
        due.sort_by(|(ka, a), (kb, b)| {
            stable_total_cmp_f64(a.seconds(), b.seconds()).then_with(|| ka.cmp(kb))
        });
        for (key, _) in &due {
            self.deadlines.remove(key);
        }
        due.into_iter().map(|(k, _)| k).collect()
    }
}
