extern crate self as interject;

use std::borrow::Cow;
use std::fmt;

use chrono::TimeDelta;

#[macro_use]
mod macros;
mod api;
mod engine;
mod error;
mod pattern;
mod resume;
pub mod rules;

pub use api::{Conversation, InquiryRecord, Options, ResolveDetails, ResolveVerbose};
pub use engine::{
    ActionState, ActionTracker, ActiveActions, Context, DialogHistory, DialogLog, Handler, Inquiry, MatchTrace,
    Precondition, Reaction, ReactionBuilder, RecordedHistory, Registry, ResolveMetrics, Resolver, RunResult, Situation,
    Tier, TierMetrics, Tiers, TriggerIndex, Triggers, Verdict,
};
pub use error::{ActionStateError, MatchError, ResolveError, Result, ResumeError};
pub use pattern::{Pattern, PatternMatcher, WordMatcher};
pub use resume::{Resume, Resumption};

// --- Trigger keys -----------------------------------------------------------

/// Identifies one dialog line the agent can speak.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DialogId(Cow<'static, str>);

impl DialogId {
    pub const fn from_static(id: &'static str) -> Self {
        DialogId(Cow::Borrowed(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifies a class of ongoing agent activity ("speaking to user",
/// "asking a profile question", ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionTag(Cow<'static, str>);

impl ActionTag {
    pub const fn from_static(tag: &'static str) -> Self {
        ActionTag(Cow::Borrowed(tag))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! key_conversions {
    ($ty:ident) => {
        impl From<&'static str> for $ty {
            fn from(value: &'static str) -> Self {
                $ty(Cow::Borrowed(value))
            }
        }

        impl From<String> for $ty {
            fn from(value: String) -> Self {
                $ty(Cow::Owned(value))
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

key_conversions!(DialogId);
key_conversions!(ActionTag);

/// A lookup key that gates when a reaction is considered.
///
/// Triggers are only ever used to find reactions (and to report which key
/// fired in a trace); reactions do not hold on to them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Trigger {
    Dialog(DialogId),
    Action(ActionTag),
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Dialog(id) => write!(f, "dialog:{id}"),
            Trigger::Action(tag) => write!(f, "action:{tag}"),
        }
    }
}

// --- Classification and resume directives -----------------------------------

/// What kind of inquiry a matched reaction represents.
///
/// Callers use this for their own bookkeeping (for example "was the previous
/// inquiry a request to repeat?").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum Classification {
    #[default]
    Custom,
    RequestAskQuestion,
    RequestMoveOn,
    IGetIt,
    WhatDidYouSay,
    BeforeThat,
}

impl Classification {
    pub fn name(self) -> &'static str {
        match self {
            Classification::Custom => "custom",
            Classification::RequestAskQuestion => "request_ask_question",
            Classification::RequestMoveOn => "request_move_on",
            Classification::IGetIt => "i_get_it",
            Classification::WhatDidYouSay => "what_did_you_say",
            Classification::BeforeThat => "before_that",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How the conversation driver should pick up again once a handler is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ResumeDirective {
    /// Carry on where the interrupted conversation was heading.
    ContinueExistingTrain,
    /// Speak the dialog that was interrupted again before carrying on.
    RepeatCurrentDialog,
}

/// Interruptions longer than this make the user lose track of the current line.
pub const REPEAT_AFTER: TimeDelta = TimeDelta::seconds(4);

impl ResumeDirective {
    /// Pick a directive from how long the handler kept the conversation on a
    /// side track.
    pub fn after_interruption(elapsed: TimeDelta) -> Self {
        if elapsed > REPEAT_AFTER { ResumeDirective::RepeatCurrentDialog } else { ResumeDirective::ContinueExistingTrain }
    }
}

// --- Utterance ----------------------------------------------------------------

/// Recognizer output for one resolution attempt.
///
/// Hypotheses are ordered newest first: index 0 is the latest transcript and
/// everything behind it is an older interim guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    hypotheses: Vec<String>,
    is_final: bool,
}

impl Utterance {
    pub fn new<I, S>(hypotheses: I, is_final: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Utterance { hypotheses: hypotheses.into_iter().map(Into::into).collect(), is_final }
    }

    /// A confirmed transcript (plus any interim guesses that preceded it).
    pub fn confirmed<I, S>(hypotheses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(hypotheses, true)
    }

    /// A still-changing interim transcript.
    pub fn interim<I, S>(hypotheses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(hypotheses, false)
    }

    pub fn hypotheses(&self) -> &[String] {
        &self.hypotheses
    }

    pub fn newest(&self) -> Option<&str> {
        self.hypotheses.first().map(String::as_str)
    }

    /// Every hypothesis except the newest one.
    pub fn older(&self) -> &[String] {
        self.hypotheses.get(1..).unwrap_or(&[])
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn is_empty(&self) -> bool {
        self.hypotheses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utterance_splits_newest_from_older() {
        let utterance = Utterance::confirmed(["good", "a good question", "a good"]);
        assert_eq!(utterance.newest(), Some("good"));
        assert_eq!(utterance.older(), &["a good question".to_string(), "a good".to_string()]);
        assert!(utterance.is_final());

        let empty = Utterance::interim(Vec::<String>::new());
        assert_eq!(empty.newest(), None);
        assert!(empty.older().is_empty());
    }

    #[test]
    fn long_interruptions_repeat_the_current_dialog() {
        assert_eq!(ResumeDirective::after_interruption(TimeDelta::seconds(1)), ResumeDirective::ContinueExistingTrain);
        assert_eq!(ResumeDirective::after_interruption(REPEAT_AFTER), ResumeDirective::ContinueExistingTrain);
        assert_eq!(
            ResumeDirective::after_interruption(TimeDelta::milliseconds(4_500)),
            ResumeDirective::RepeatCurrentDialog
        );
    }

    #[test]
    fn keys_compare_by_content() {
        const WELCOME: DialogId = DialogId::from_static("welcome");
        assert_eq!(WELCOME, DialogId::from("welcome".to_string()));
        assert_eq!(Trigger::Action(ActionTag::from("busy")).to_string(), "action:busy");
    }
}
