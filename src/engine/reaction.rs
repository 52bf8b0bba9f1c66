//! Reactions: the unit of conversational rule.
//!
//! A reaction pairs a match condition with a one-shot response:
//!
//! ```text
//! Reaction
//!   ├─ precondition?   Fn(&Situation) -> bool   (cheap; runs first)
//!   ├─ patterns        any must match            ┐ matching.rs
//!   ├─ exclusions      none may match            ┘
//!   ├─ classification  reported with the match
//!   └─ handler         Fn(Resume), invoked later by the caller
//! ```
//!
//! Pattern matching is the expensive part, so the precondition is checked
//! first and a failing precondition skips the matcher entirely.
//!
//! A matched reaction produces an [`Inquiry`]. The inquiry does nothing on its
//! own; the caller decides when to run it with [`Inquiry::respond`].

use std::fmt;
use std::sync::Arc;

use super::matching::first_match;
use super::providers::{ActiveActions, DialogHistory};
use crate::error::MatchError;
use crate::{
    ActionTag, Classification, DialogId, InquiryRecord, Options, Pattern, PatternMatcher, Resume, Resumption, Utterance,
};

/// Guard evaluated before any pattern matching.
pub type Precondition = Box<dyn Fn(&Situation<'_>) -> bool + Send + Sync>;

/// Response run by the caller once it decides to act on a match. Must invoke
/// the supplied [`Resume`] exactly once on every path.
pub type Handler = Arc<dyn Fn(Resume) + Send + Sync>;

/// What a precondition can see: the utterance and the state of the agent at
/// the time of resolution.
#[derive(Clone, Copy)]
pub struct Situation<'a> {
    pub(crate) utterance: &'a Utterance,
    pub(crate) actions: &'a ActiveActions,
    pub(crate) dialogs: &'a dyn DialogHistory,
    pub(crate) previous_inquiry: Option<&'a InquiryRecord>,
}

impl<'a> Situation<'a> {
    pub fn utterance(&self) -> &'a Utterance {
        self.utterance
    }

    pub fn last_spoken(&self) -> Option<DialogId> {
        self.dialogs.last_spoken()
    }

    pub fn is_occurring(&self, tag: &ActionTag) -> bool {
        self.actions.contains(tag)
    }

    pub fn any_occurring<'t>(&self, tags: impl IntoIterator<Item = &'t ActionTag>) -> bool {
        self.actions.contains_any(tags)
    }

    pub fn is_speaking(&self) -> bool {
        self.dialogs.is_speaking()
    }

    /// Whether the inquiry the caller resolved before this one was any of
    /// `kinds`.
    pub fn previous_inquiry_was(&self, kinds: &[Classification]) -> bool {
        self.previous_inquiry.is_some_and(|record| kinds.contains(&record.classification))
    }
}

impl fmt::Debug for Situation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Situation")
            .field("utterance", self.utterance)
            .field("actions", self.actions)
            .field("speaking", &self.dialogs.is_speaking())
            .field("previous_inquiry", &self.previous_inquiry)
            .finish()
    }
}

/// Outcome of evaluating one reaction.
#[derive(Debug, Clone, Copy)]
pub enum Verdict<'r> {
    /// The precondition failed; no pattern was tested.
    Unmet,
    NoMatch,
    /// A positive pattern matched but so did an exclusion.
    Excluded,
    Matched(&'r Pattern),
}

impl Verdict<'_> {
    pub fn is_match(&self) -> bool {
        matches!(self, Verdict::Matched(_))
    }
}

pub struct Reaction {
    name: &'static str,
    patterns: Vec<Pattern>,
    exclusions: Vec<Pattern>,
    precondition: Option<Precondition>,
    classification: Classification,
    handler: Handler,
}

impl Reaction {
    pub fn builder(name: &'static str) -> ReactionBuilder {
        ReactionBuilder {
            name,
            patterns: Vec::new(),
            exclusions: Vec::new(),
            precondition: None,
            classification: Classification::default(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    /// Decide whether this reaction applies to `situation`.
    ///
    /// Matched iff the precondition passes, a positive pattern matches and no
    /// exclusion pattern matches.
    pub fn evaluate<'r>(
        &'r self,
        situation: &Situation<'_>,
        matcher: &dyn PatternMatcher,
        options: &Options,
    ) -> Result<Verdict<'r>, MatchError> {
        if let Some(precondition) = &self.precondition {
            if !precondition(situation) {
                return Ok(Verdict::Unmet);
            }
        }

        let utterance = situation.utterance;
        let Some(pattern) = first_match(utterance, &self.patterns, matcher, options.stale_hypotheses)? else {
            return Ok(Verdict::NoMatch);
        };

        if let Some(veto) = first_match(utterance, &self.exclusions, matcher, options.stale_hypotheses)? {
            tracing::trace!(reaction = self.name, exclusion = %veto, "vetoed by exclusion");
            return Ok(Verdict::Excluded);
        }

        Ok(Verdict::Matched(pattern))
    }

    /// Package this reaction as the result of a resolution.
    pub(crate) fn inquiry(&self) -> Inquiry {
        Inquiry { classification: self.classification, reaction: self.name, handler: Arc::clone(&self.handler) }
    }
}

impl fmt::Debug for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reaction")
            .field("name", &self.name)
            .field("patterns", &self.patterns)
            .field("exclusions", &self.exclusions)
            .field("precondition", &self.precondition.as_ref().map(|_| "<function>"))
            .field("classification", &self.classification)
            .field("handler", &"<function>")
            .finish()
    }
}

/// Builder returned by [`Reaction::builder`]. Finishing requires a handler.
pub struct ReactionBuilder {
    name: &'static str,
    patterns: Vec<Pattern>,
    exclusions: Vec<Pattern>,
    precondition: Option<Precondition>,
    classification: Classification,
}

impl ReactionBuilder {
    pub fn pattern(mut self, pattern: Pattern) -> Self {
        self.patterns.push(pattern);
        self
    }

    pub fn patterns(mut self, patterns: impl IntoIterator<Item = Pattern>) -> Self {
        self.patterns.extend(patterns);
        self
    }

    pub fn exclude(mut self, pattern: Pattern) -> Self {
        self.exclusions.push(pattern);
        self
    }

    pub fn exclusions(mut self, patterns: impl IntoIterator<Item = Pattern>) -> Self {
        self.exclusions.extend(patterns);
        self
    }

    pub fn classification(mut self, classification: Classification) -> Self {
        self.classification = classification;
        self
    }

    pub fn precondition<F>(mut self, precondition: F) -> Self
    where
        F: Fn(&Situation<'_>) -> bool + Send + Sync + 'static,
    {
        self.precondition = Some(Box::new(precondition));
        self
    }

    pub fn handler<F>(self, handler: F) -> Reaction
    where
        F: Fn(Resume) + Send + Sync + 'static,
    {
        Reaction {
            name: self.name,
            patterns: self.patterns,
            exclusions: self.exclusions,
            precondition: self.precondition,
            classification: self.classification,
            handler: Arc::new(handler),
        }
    }
}

/// The result of a successful resolution: which kind of inquiry the user made
/// and the handler that answers it.
pub struct Inquiry {
    classification: Classification,
    reaction: &'static str,
    handler: Handler,
}

impl Inquiry {
    pub fn classification(&self) -> Classification {
        self.classification
    }

    /// Name of the reaction that matched.
    pub fn reaction(&self) -> &'static str {
        self.reaction
    }

    /// Run the handler. It will call `resume` when the interaction is over,
    /// possibly much later and from another thread.
    pub fn respond(self, resume: Resume) {
        tracing::debug!(reaction = self.reaction, classification = %self.classification, "responding to inquiry");
        (self.handler)(resume);
    }

    /// Run the handler and return a future for its resume directive.
    pub fn respond_async(self) -> Resumption {
        let (resume, resumption) = Resume::channel();
        self.respond(resume);
        resumption
    }
}

impl fmt::Debug for Inquiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inquiry")
            .field("classification", &self.classification)
            .field("reaction", &self.reaction)
            .field("handler", &"<function>")
            .finish()
    }
}
