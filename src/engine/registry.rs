//! Reaction registry.
//!
//! The registry owns the four rule collections walked by the resolver:
//!
//! | collection          | keyed by   | tier |
//! |---------------------|------------|------|
//! | dialog index        | `DialogId` | 1    |
//! | active-action index | `ActionTag`| 2    |
//! | absent-action index | `ActionTag`| 3    |
//! | constant list       | (none)     | 4    |
//!
//! It is built once at installation time and only read during resolution.
//!
//! ## Registration
//!
//! `register(reaction, triggers)`:
//!
//! - no keys at all: the reaction goes into the constant list;
//! - otherwise it is appended once per key to the matching index. A reaction
//!   may sit under many keys in several indexes at once; each placement is
//!   evaluated independently when its tier is reached.
//!
//! There is no removal and no failure mode.

use std::sync::Arc;

use super::reaction::Reaction;
use super::trigger::TriggerIndex;
use crate::{ActionTag, DialogId};

/// The keys a reaction is registered under.
///
/// Duplicate keys within one set collapse into one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Triggers {
    while_speaking: Vec<DialogId>,
    during: Vec<ActionTag>,
    not_during: Vec<ActionTag>,
}

impl Triggers {
    pub fn new() -> Self {
        Self::default()
    }

    /// No keys: the reaction is considered on every resolution.
    pub fn always() -> Self {
        Self::default()
    }

    /// Consider the reaction right after one of these dialogs was spoken.
    pub fn while_speaking<I, D>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<DialogId>,
    {
        extend_unique(&mut self.while_speaking, ids.into_iter().map(Into::into));
        self
    }

    /// Consider the reaction while one of these actions is in progress.
    pub fn during<I, A>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<ActionTag>,
    {
        extend_unique(&mut self.during, tags.into_iter().map(Into::into));
        self
    }

    /// Consider the reaction while one of these actions is *not* in progress.
    pub fn not_during<I, A>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<ActionTag>,
    {
        extend_unique(&mut self.not_during, tags.into_iter().map(Into::into));
        self
    }

    pub fn is_constant(&self) -> bool {
        self.while_speaking.is_empty() && self.during.is_empty() && self.not_during.is_empty()
    }
}

fn extend_unique<K: PartialEq>(keys: &mut Vec<K>, new: impl Iterator<Item = K>) {
    for key in new {
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    constant: Vec<Arc<Reaction>>,
    dialogs: TriggerIndex<DialogId>,
    active: TriggerIndex<ActionTag>,
    absent: TriggerIndex<ActionTag>,
    /// Reaction names in registration order.
    names: Vec<&'static str>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, reaction: Reaction, triggers: Triggers) -> &mut Self {
        let reaction = Arc::new(reaction);
        self.names.push(reaction.name());

        if triggers.is_constant() {
            tracing::trace!(reaction = reaction.name(), "registered constant reaction");
            self.constant.push(reaction);
            return self;
        }

        tracing::trace!(
            reaction = reaction.name(),
            dialogs = triggers.while_speaking.len(),
            during = triggers.during.len(),
            not_during = triggers.not_during.len(),
            "registered keyed reaction"
        );
        for id in triggers.while_speaking {
            self.dialogs.add(id, Arc::clone(&reaction));
        }
        for tag in triggers.during {
            self.active.add(tag, Arc::clone(&reaction));
        }
        for tag in triggers.not_during {
            self.absent.add(tag, Arc::clone(&reaction));
        }
        self
    }

    pub fn constant(&self) -> &[Arc<Reaction>] {
        &self.constant
    }

    pub fn dialog_index(&self) -> &TriggerIndex<DialogId> {
        &self.dialogs
    }

    pub fn active_index(&self) -> &TriggerIndex<ActionTag> {
        &self.active
    }

    pub fn absent_index(&self) -> &TriggerIndex<ActionTag> {
        &self.absent
    }

    /// Number of reactions registered (not placements).
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn reaction_names(&self) -> &[&'static str] {
        &self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reaction(name: &'static str) -> Reaction {
        Reaction::builder(name).handler(|resume| resume.continue_existing_train())
    }

    #[test]
    fn keyless_reactions_are_constant() {
        let mut registry = Registry::new();
        registry.register(reaction("a"), Triggers::always()).register(reaction("b"), Triggers::new());

        let names: Vec<_> = registry.constant().iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(registry.dialog_index().is_empty());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn one_reaction_can_sit_in_every_index() {
        let mut registry = Registry::new();
        registry.register(
            reaction("everywhere"),
            Triggers::new().while_speaking(["welcome", "hello"]).during(["busy"]).not_during(["speaking_to_user"]),
        );

        assert!(registry.constant().is_empty());
        assert_eq!(registry.dialog_index().len(), 2);
        assert_eq!(registry.active_index().get(&ActionTag::from("busy"))[0].name(), "everywhere");
        assert_eq!(registry.absent_index().get(&ActionTag::from("speaking_to_user"))[0].name(), "everywhere");
        assert_eq!(registry.len(), 1);

        let shared = &registry.dialog_index().get(&DialogId::from("welcome"))[0];
        assert!(Arc::ptr_eq(shared, &registry.active_index().get(&ActionTag::from("busy"))[0]));
    }

    #[test]
    fn duplicate_keys_in_one_set_collapse() {
        let triggers = Triggers::new().while_speaking(["welcome", "welcome", "hello"]).while_speaking(["hello"]);
        let mut registry = Registry::new();
        registry.register(reaction("greeting"), triggers);
        assert_eq!(registry.dialog_index().get(&DialogId::from("welcome")).len(), 1);
        assert_eq!(registry.dialog_index().get(&DialogId::from("hello")).len(), 1);
    }
}
