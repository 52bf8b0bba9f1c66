//! Collaborator contracts: action state and dialog history.
//!
//! The resolver never reaches for global state. Whatever tracks "what is the
//! agent doing right now" and "what did it say last" is handed to it through
//! these traits, so tests can substitute fixed fixtures.
//!
//! Reference implementations:
//!
//! - [`ActionTracker`]: a thread-safe begin/finish tracker of ongoing actions.
//! - [`DialogLog`]: remembers the last two dialog lines spoken.
//! - `Vec<ActionTag>` and [`RecordedHistory`]: immutable fixtures.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::ActionStateError;
use crate::{ActionTag, DialogId};

/// Reports the actions currently in progress.
pub trait ActionState {
    /// Ongoing actions, newest first.
    fn currently_occurring(&self) -> Result<Vec<ActionTag>, ActionStateError>;

    fn is_occurring(&self, tag: &ActionTag) -> Result<bool, ActionStateError> {
        Ok(self.currently_occurring()?.contains(tag))
    }
}

/// Reports what the agent said most recently.
pub trait DialogHistory {
    fn last_spoken(&self) -> Option<DialogId>;

    fn previous_to_last_spoken(&self) -> Option<DialogId>;

    /// Whether audio is playing right now.
    fn is_speaking(&self) -> bool {
        false
    }
}

impl ActionState for Vec<ActionTag> {
    fn currently_occurring(&self) -> Result<Vec<ActionTag>, ActionStateError> {
        Ok(self.clone())
    }
}

impl ActionState for [ActionTag] {
    fn currently_occurring(&self) -> Result<Vec<ActionTag>, ActionStateError> {
        Ok(self.to_vec())
    }
}

impl<T: ActionState + ?Sized> ActionState for Arc<T> {
    fn currently_occurring(&self) -> Result<Vec<ActionTag>, ActionStateError> {
        (**self).currently_occurring()
    }

    fn is_occurring(&self, tag: &ActionTag) -> Result<bool, ActionStateError> {
        (**self).is_occurring(tag)
    }
}

impl<T: DialogHistory + ?Sized> DialogHistory for Arc<T> {
    fn last_spoken(&self) -> Option<DialogId> {
        (**self).last_spoken()
    }

    fn previous_to_last_spoken(&self) -> Option<DialogId> {
        (**self).previous_to_last_spoken()
    }

    fn is_speaking(&self) -> bool {
        (**self).is_speaking()
    }
}

/// Snapshot of the active actions taken once per resolution.
///
/// Keeps the newest-first order for the active-action tier and a membership
/// set (duplicates collapsed) for the absent-action tier and preconditions.
#[derive(Debug, Clone, Default)]
pub struct ActiveActions {
    newest_first: Vec<ActionTag>,
    members: HashSet<ActionTag>,
}

impl ActiveActions {
    pub fn from_newest_first(newest_first: Vec<ActionTag>) -> Self {
        let members = newest_first.iter().cloned().collect();
        ActiveActions { newest_first, members }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionTag> {
        self.newest_first.iter()
    }

    pub fn contains(&self, tag: &ActionTag) -> bool {
        self.members.contains(tag)
    }

    pub fn contains_any<'t>(&self, tags: impl IntoIterator<Item = &'t ActionTag>) -> bool {
        tags.into_iter().any(|tag| self.contains(tag))
    }

    pub fn is_empty(&self) -> bool {
        self.newest_first.is_empty()
    }

    pub fn to_vec(&self) -> Vec<ActionTag> {
        self.newest_first.clone()
    }
}

/// Thread-safe tracker of ongoing actions, in the order they began.
#[derive(Debug, Default)]
pub struct ActionTracker {
    started: Mutex<Vec<ActionTag>>,
}

impl ActionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, tag: impl Into<ActionTag>) {
        let tag = tag.into();
        tracing::debug!(action = %tag, "action started");
        self.started.lock().unwrap_or_else(PoisonError::into_inner).push(tag);
    }

    /// Finish the most recent occurrence of `tag`. Returns false when it was
    /// not running.
    pub fn finish(&self, tag: &ActionTag) -> bool {
        let mut started = self.started.lock().unwrap_or_else(PoisonError::into_inner);
        match started.iter().rposition(|t| t == tag) {
            Some(idx) => {
                started.remove(idx);
                tracing::debug!(action = %tag, "action finished");
                true
            }
            None => false,
        }
    }
}

impl ActionState for ActionTracker {
    fn currently_occurring(&self) -> Result<Vec<ActionTag>, ActionStateError> {
        let started = self.started.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(started.iter().rev().cloned().collect())
    }
}

#[derive(Debug, Default)]
struct Spoken {
    last: Option<DialogId>,
    previous: Option<DialogId>,
    speaking: bool,
}

/// Remembers the last two dialog lines spoken and whether audio is playing.
#[derive(Debug, Default)]
pub struct DialogLog {
    spoken: Mutex<Spoken>,
}

impl DialogLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `id` started playing.
    pub fn spoke(&self, id: impl Into<DialogId>) {
        let mut spoken = self.spoken.lock().unwrap_or_else(PoisonError::into_inner);
        spoken.previous = spoken.last.take();
        spoken.last = Some(id.into());
    }

    pub fn set_speaking(&self, speaking: bool) {
        self.spoken.lock().unwrap_or_else(PoisonError::into_inner).speaking = speaking;
    }
}

impl DialogHistory for DialogLog {
    fn last_spoken(&self) -> Option<DialogId> {
        self.spoken.lock().unwrap_or_else(PoisonError::into_inner).last.clone()
    }

    fn previous_to_last_spoken(&self) -> Option<DialogId> {
        self.spoken.lock().unwrap_or_else(PoisonError::into_inner).previous.clone()
    }

    fn is_speaking(&self) -> bool {
        self.spoken.lock().unwrap_or_else(PoisonError::into_inner).speaking
    }
}

/// A fixed dialog history.
#[derive(Debug, Clone, Default)]
pub struct RecordedHistory {
    pub last: Option<DialogId>,
    pub previous: Option<DialogId>,
    pub speaking: bool,
}

impl RecordedHistory {
    pub fn last(id: impl Into<DialogId>) -> Self {
        RecordedHistory { last: Some(id.into()), ..Self::default() }
    }

    /// Freeze what `dialogs` reports right now.
    pub fn capture(dialogs: &dyn DialogHistory) -> Self {
        RecordedHistory {
            last: dialogs.last_spoken(),
            previous: dialogs.previous_to_last_spoken(),
            speaking: dialogs.is_speaking(),
        }
    }
}

impl DialogHistory for RecordedHistory {
    fn last_spoken(&self) -> Option<DialogId> {
        self.last.clone()
    }

    fn previous_to_last_spoken(&self) -> Option<DialogId> {
        self.previous.clone()
    }

    fn is_speaking(&self) -> bool {
        self.speaking
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_reports_newest_first() {
        let tracker = ActionTracker::new();
        tracker.begin("speaking_to_user");
        tracker.begin("ask_profile_question");
        assert_eq!(
            tracker.currently_occurring().unwrap(),
            vec![ActionTag::from("ask_profile_question"), ActionTag::from("speaking_to_user")]
        );
        assert!(tracker.is_occurring(&ActionTag::from("speaking_to_user")).unwrap());

        assert!(tracker.finish(&ActionTag::from("speaking_to_user")));
        assert!(!tracker.finish(&ActionTag::from("speaking_to_user")));
        assert_eq!(tracker.currently_occurring().unwrap(), vec![ActionTag::from("ask_profile_question")]);
    }

    #[test]
    fn tracker_survives_a_panic_while_locked() {
        use crate::engine::registry::{Registry, Triggers};
        use crate::engine::resolver::{Context, Resolver};
        use crate::{Options, Pattern, Reaction, Utterance, WordMatcher};

        let tracker = Arc::new(ActionTracker::new());
        let poisoner = Arc::clone(&tracker);
        let joined = std::thread::spawn(move || {
            let _guard = poisoner.started.lock().unwrap();
            panic!("panic while holding the tracker lock");
        })
        .join();
        assert!(joined.is_err());
        assert!(tracker.started.is_poisoned());

        let busy = ActionTag::from("busy");
        tracker.begin(busy.clone());
        tracker.begin("idle");
        assert!(tracker.finish(&ActionTag::from("idle")));
        assert_eq!(tracker.currently_occurring().unwrap(), vec![busy.clone()]);

        let mut registry = Registry::new();
        registry.register(
            Reaction::builder("while busy")
                .pattern(Pattern::words("stop"))
                .handler(|resume| resume.continue_existing_train()),
            Triggers::new().during([busy]),
        );
        let history = RecordedHistory::default();
        let context = Context::new(&history, &*tracker);
        let inquiry = Resolver::new(&registry, &WordMatcher)
            .resolve(&Utterance::confirmed(["stop"]), &context, &Options::default())
            .unwrap();
        assert_eq!(inquiry.map(|i| i.reaction()), Some("while busy"));
    }

    #[test]
    fn snapshot_collapses_duplicates_for_membership() {
        let busy = ActionTag::from("busy");
        let actions = ActiveActions::from_newest_first(vec![busy.clone(), "idle".into(), busy.clone()]);
        assert_eq!(actions.iter().count(), 3);
        assert!(actions.contains(&busy));
        assert!(!actions.contains(&ActionTag::from("away")));
        assert!(actions.contains_any(&[ActionTag::from("away"), ActionTag::from("idle")]));
    }

    #[test]
    fn dialog_log_keeps_the_last_two_lines() {
        let log = DialogLog::new();
        assert_eq!(log.last_spoken(), None);
        log.spoke("hello");
        log.spoke("welcome_back");
        log.spoke("how_are_you");
        assert_eq!(log.last_spoken(), Some(DialogId::from("how_are_you")));
        assert_eq!(log.previous_to_last_spoken(), Some(DialogId::from("welcome_back")));
        assert!(!log.is_speaking());
        log.set_speaking(true);
        assert!(log.is_speaking());
    }
}
