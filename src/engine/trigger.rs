//! Trigger index.
//!
//! Maps a trigger key (a dialog id or an action tag) to the reactions
//! registered under it.
//!
//! ## Ordering
//!
//! - Reactions under one key keep registration order. That order is the
//!   evaluation order within a tier.
//! - Keys iterate in the order they were first registered. The absent-action
//!   tier walks every key, so this makes it deterministic too.
//!
//! The index is append-only: there is no removal.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use super::reaction::Reaction;

pub struct TriggerIndex<K> {
    slots: HashMap<K, usize>,
    entries: Vec<(K, Vec<Arc<Reaction>>)>,
}

impl<K> Default for TriggerIndex<K> {
    fn default() -> Self {
        TriggerIndex { slots: HashMap::new(), entries: Vec::new() }
    }
}

impl<K: Eq + Hash + Clone> TriggerIndex<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `reaction` to the list under `key`.
    pub fn add(&mut self, key: K, reaction: Arc<Reaction>) {
        match self.slots.get(&key) {
            Some(&slot) => self.entries[slot].1.push(reaction),
            None => {
                self.slots.insert(key.clone(), self.entries.len());
                self.entries.push((key, vec![reaction]));
            }
        }
    }

    /// Reactions under `key`, in registration order. Empty when unknown.
    pub fn get(&self, key: &K) -> &[Arc<Reaction>] {
        match self.slots.get(key) {
            Some(&slot) => &self.entries[slot].1,
            None => &[],
        }
    }

    /// Every key with its reactions, keys in first-registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &[Arc<Reaction>])> {
        self.entries.iter().map(|(key, reactions)| (key, reactions.as_slice()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(key, _)| key)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: fmt::Debug> fmt::Debug for TriggerIndex<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.entries.iter().map(|(key, reactions)| (key, reactions.iter().map(|r| r.name()).collect::<Vec<_>>())),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ActionTag;

    fn reaction(name: &'static str) -> Arc<Reaction> {
        Arc::new(Reaction::builder(name).handler(|resume| resume.continue_existing_train()))
    }

    fn names(reactions: &[Arc<Reaction>]) -> Vec<&'static str> {
        reactions.iter().map(|r| r.name()).collect()
    }

    #[test]
    fn reactions_keep_registration_order_per_key() {
        let mut index = TriggerIndex::new();
        index.add(ActionTag::from("busy"), reaction("first"));
        index.add(ActionTag::from("idle"), reaction("other"));
        index.add(ActionTag::from("busy"), reaction("second"));

        assert_eq!(names(index.get(&ActionTag::from("busy"))), vec!["first", "second"]);
        assert_eq!(names(index.get(&ActionTag::from("idle"))), vec!["other"]);
        assert!(index.get(&ActionTag::from("away")).is_empty());
    }

    #[test]
    fn keys_iterate_in_first_registration_order() {
        let mut index = TriggerIndex::new();
        for key in ["zeta", "alpha", "mid", "alpha", "zeta"] {
            index.add(ActionTag::from(key), reaction(key));
        }
        let keys: Vec<&str> = index.keys().map(ActionTag::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(index.len(), 3);

        let sizes: Vec<usize> = index.iter().map(|(_, reactions)| reactions.len()).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }
}
