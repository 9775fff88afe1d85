//! Token based debouncing of per-row recomputes.
//!
//! The debouncer keeps no timers of its own. Each `schedule` returns a fresh
//! token and supersedes whatever was pending for the same key; the driver
//! (a tokio task in the server, or a test calling `take_due` with a chosen
//! `Instant`) later calls `fire` with the token it was given. Only the most
//! recent token for a key fires, so the last edit within a window wins.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Default quiet period before a row edit is recomputed
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DebounceToken(u64);

#[derive(Debug, Clone, Copy)]
struct Pending {
    deadline: Instant,
    token: DebounceToken,
}

#[derive(Debug, Clone)]
pub struct Debouncer<K> {
    window: Duration,
    next_token: u64,
    pending: HashMap<K, Pending>,
}

impl<K: Eq + Hash + Clone> Debouncer<K> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            next_token: 0,
            pending: HashMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Schedule (or reschedule) `key`, superseding any pending token
    pub fn schedule(&mut self, key: K, now: Instant) -> DebounceToken {
        self.next_token += 1;
        let token = DebounceToken(self.next_token);
        self.pending.insert(
            key,
            Pending {
                deadline: now + self.window,
                token,
            },
        );
        token
    }

    pub fn cancel(&mut self, key: &K) -> bool {
        self.pending.remove(key).is_some()
    }

    /// Consume the pending entry if `token` is still the current one
    pub fn fire(&mut self, key: &K, token: DebounceToken) -> bool {
        match self.pending.get(key) {
            Some(pending) if pending.token == token => {
                self.pending.remove(key);
                true
            }
            _ => false,
        }
    }

    /// Consume every entry whose deadline has passed
    pub fn take_due(&mut self, now: Instant) -> Vec<K> {
        let due: Vec<K> = self
            .pending
            .iter()
            .filter(|(_, pending)| pending.deadline <= now)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &due {
            self.pending.remove(key);
        }
        due
    }

    pub fn drain_all(&mut self) -> Vec<K> {
        self.pending.drain().map(|(key, _)| key).collect()
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|pending| pending.deadline).min()
    }
}

impl<K: Eq + Hash + Clone> Default for Debouncer<K> {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_WINDOW)
    }
}
