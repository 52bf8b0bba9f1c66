use crate::engine::{
    ActionState, Context, DialogHistory, Inquiry, MatchTrace, Reaction, Registry, Resolver, TierMetrics, Tiers, Triggers,
};
use crate::{ActionTag, Classification, DialogId, PatternMatcher, Result, Utterance, WordMatcher};
use chrono::{Local, NaiveDateTime};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Options that affect resolution behavior.
///
/// The defaults are what a running agent wants. The knobs exist for
/// diagnostics: the CLI uses them to isolate a tier or to check whether a
/// match only came from a stale hypothesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Tiers the resolver walks. All four by default.
    pub tiers: Tiers,
    /// On final utterances, also test the older interim hypotheses.
    pub stale_hypotheses: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options { tiers: Tiers::all(), stale_hypotheses: true }
    }
}

/// Bookkeeping for an inquiry the conversation already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InquiryRecord {
    pub classification: Classification,
    /// Name of the reaction that matched.
    pub reaction: &'static str,
    pub resolved_at: NaiveDateTime,
}

/// Result from [`Conversation::resolve_verbose`].
#[derive(Debug)]
pub struct ResolveVerbose {
    pub utterance: Utterance,
    pub inquiry: Option<Inquiry>,
    pub elapsed: Duration,
    pub details: ResolveDetails,
}

/// Additional details returned by [`Conversation::resolve_verbose`].
///
/// Compact on purpose: enough to see why a reaction did (or did not) fire.
#[derive(Debug, Clone)]
pub struct ResolveDetails {
    pub total: Duration,
    /// One entry per tier walked, in walk order.
    pub tiers: Vec<TierMetrics>,
    pub matched: Option<MatchTrace>,
    /// Ongoing actions at resolution time, newest first.
    pub active_actions: Vec<ActionTag>,
    pub last_spoken: Option<DialogId>,
    pub previous_to_last_spoken: Option<DialogId>,
    pub speaking: bool,
    /// Inquiry visible to preconditions during this resolution.
    pub previous_inquiry: Option<InquiryRecord>,
}

/// Entry point for an agent: owns the rules and the collaborators, resolves
/// utterances and remembers what it resolved last.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use interject::{ActionTracker, Conversation, DialogLog, Reaction, Triggers, words};
///
/// let dialogs = Arc::new(DialogLog::new());
/// let actions = Arc::new(ActionTracker::new());
/// let mut conversation = Conversation::new(dialogs, actions);
/// conversation.register(
///     Reaction::builder("greeting").pattern(words!("hello")).handler(|resume| resume.continue_existing_train()),
///     Triggers::always(),
/// );
///
/// let inquiry = conversation.resolve(&["hello there"], true).unwrap();
/// assert_eq!(inquiry.map(|i| i.reaction()), Some("greeting"));
/// ```
pub struct Conversation<M: PatternMatcher = WordMatcher> {
    registry: Registry,
    matcher: M,
    dialogs: Arc<dyn DialogHistory + Send + Sync>,
    actions: Arc<dyn ActionState + Send + Sync>,
    options: Options,
    last_inquiry: Option<InquiryRecord>,
}

impl Conversation<WordMatcher> {
    pub fn new(dialogs: Arc<dyn DialogHistory + Send + Sync>, actions: Arc<dyn ActionState + Send + Sync>) -> Self {
        Conversation::with_matcher(WordMatcher, dialogs, actions)
    }
}

impl<M: PatternMatcher> Conversation<M> {
    pub fn with_matcher(
        matcher: M,
        dialogs: Arc<dyn DialogHistory + Send + Sync>,
        actions: Arc<dyn ActionState + Send + Sync>,
    ) -> Self {
        Conversation { registry: Registry::new(), matcher, dialogs, actions, options: Options::default(), last_inquiry: None }
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn register(&mut self, reaction: Reaction, triggers: Triggers) -> &mut Self {
        self.registry.register(reaction, triggers);
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// The most recent inquiry this conversation resolved, if any.
    pub fn last_inquiry(&self) -> Option<&InquiryRecord> {
        self.last_inquiry.as_ref()
    }

    /// Resolve the recognizer's hypotheses (newest first).
    ///
    /// `Ok(None)` means no reaction applies; collaborator failures come back
    /// as `Err` and leave the last inquiry untouched.
    pub fn resolve<S: AsRef<str>>(&mut self, hypotheses: &[S], is_final: bool) -> Result<Option<Inquiry>> {
        let utterance = Utterance::new(hypotheses.iter().map(|h| h.as_ref().to_string()), is_final);
        self.resolve_utterance(&utterance)
    }

    pub fn resolve_utterance(&mut self, utterance: &Utterance) -> Result<Option<Inquiry>> {
        let context = Context::new(&*self.dialogs, &*self.actions).with_previous_inquiry(self.last_inquiry.as_ref());
        let inquiry = Resolver::new(&self.registry, &self.matcher).resolve(utterance, &context, &self.options)?;
        if let Some(inquiry) = &inquiry {
            self.remember(inquiry);
        }
        Ok(inquiry)
    }

    /// Resolve and return per-tier metrics and the match trace as well.
    ///
    /// Records the last inquiry exactly like [`resolve`](Self::resolve).
    pub fn resolve_verbose(&mut self, utterance: Utterance) -> Result<ResolveVerbose> {
        let previous_inquiry = self.last_inquiry.clone();
        let context = Context::new(&*self.dialogs, &*self.actions).with_previous_inquiry(previous_inquiry.as_ref());
        let run = Resolver::new(&self.registry, &self.matcher).run_with_metrics(&utterance, &context, &self.options)?;

        let details = ResolveDetails {
            total: run.metrics.total,
            tiers: run.metrics.tiers,
            matched: run.trace,
            active_actions: run.actions,
            last_spoken: run.history.last,
            previous_to_last_spoken: run.history.previous,
            speaking: run.history.speaking,
            previous_inquiry,
        };
        if let Some(inquiry) = &run.inquiry {
            self.remember(inquiry);
        }

        Ok(ResolveVerbose { utterance, inquiry: run.inquiry, elapsed: details.total, details })
    }

    fn remember(&mut self, inquiry: &Inquiry) {
        self.last_inquiry = Some(InquiryRecord {
            classification: inquiry.classification(),
            reaction: inquiry.reaction(),
            resolved_at: Local::now().naive_local(),
        });
    }
}

impl<M: PatternMatcher> fmt::Debug for Conversation<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conversation")
            .field("registry", &self.registry)
            .field("options", &self.options)
            .field("last_inquiry", &self.last_inquiry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ActionTracker, DialogLog, Pattern, ResolveError};

    fn conversation() -> (Conversation, Arc<DialogLog>, Arc<ActionTracker>) {
        let dialogs = Arc::new(DialogLog::new());
        let actions = Arc::new(ActionTracker::new());
        let conversation = Conversation::new(dialogs.clone(), actions.clone());
        (conversation, dialogs, actions)
    }

    fn reaction(name: &'static str, pattern: &str, classification: Classification) -> Reaction {
        Reaction::builder(name)
            .pattern(Pattern::words(pattern))
            .classification(classification)
            .handler(|resume| resume.continue_existing_train())
    }

    #[test]
    fn resolve_records_the_last_inquiry() {
        let (mut conversation, _, _) = conversation();
        conversation.register(reaction("repeat", "repeat that", Classification::WhatDidYouSay), Triggers::always());

        assert!(conversation.resolve(&["hello"], true).unwrap().is_none());
        assert!(conversation.last_inquiry().is_none());

        let inquiry = conversation.resolve(&["can you repeat that"], true).unwrap().unwrap();
        assert_eq!(inquiry.classification(), Classification::WhatDidYouSay);
        let record = conversation.last_inquiry().unwrap();
        assert_eq!(record.reaction, "repeat");
        assert_eq!(record.classification, Classification::WhatDidYouSay);

        // A miss does not forget what came before.
        assert!(conversation.resolve(&["hmm"], true).unwrap().is_none());
        assert_eq!(conversation.last_inquiry().map(|r| r.reaction), Some("repeat"));
    }

    #[test]
    fn previous_inquiry_reaches_preconditions() {
        let (mut conversation, _, _) = conversation();
        conversation
            .register(reaction("repeat", "repeat that", Classification::WhatDidYouSay), Triggers::always())
            .register(
                Reaction::builder("before that")
                    .pattern(Pattern::words("before that"))
                    .classification(Classification::BeforeThat)
                    .precondition(|situation| {
                        situation.previous_inquiry_was(&[Classification::WhatDidYouSay, Classification::BeforeThat])
                    })
                    .handler(|resume| resume.repeat_current_dialog()),
                Triggers::always(),
            );

        assert!(conversation.resolve(&["and before that"], true).unwrap().is_none());
        assert!(conversation.resolve(&["repeat that"], true).unwrap().is_some());
        let first = conversation.resolve(&["and before that"], true).unwrap();
        assert_eq!(first.map(|i| i.reaction()), Some("before that"));
        let again = conversation.resolve(&["before that"], true).unwrap();
        assert_eq!(again.map(|i| i.classification()), Some(Classification::BeforeThat));
    }

    #[test]
    fn conversation_reads_live_collaborators() {
        let (mut conversation, dialogs, actions) = conversation();
        conversation
            .register(reaction("welcome reply", "thanks", Classification::Custom), Triggers::new().while_speaking(["welcome"]))
            .register(reaction("busy reply", "thanks", Classification::Custom), Triggers::new().during(["busy"]));

        assert!(conversation.resolve(&["thanks"], true).unwrap().is_none());

        actions.begin("busy");
        assert_eq!(conversation.resolve(&["thanks"], true).unwrap().map(|i| i.reaction()), Some("busy reply"));

        dialogs.spoke("welcome");
        assert_eq!(conversation.resolve(&["thanks"], true).unwrap().map(|i| i.reaction()), Some("welcome reply"));
    }

    #[test]
    fn resolve_verbose_reports_the_walk() {
        let (mut conversation, dialogs, actions) = conversation();
        conversation.register(reaction("hello", "hello", Classification::Custom), Triggers::always());
        dialogs.spoke("welcome");
        actions.begin("speaking_to_user");

        let out = conversation.resolve_verbose(Utterance::confirmed(["hello there"])).unwrap();
        assert_eq!(out.inquiry.as_ref().map(|i| i.reaction()), Some("hello"));
        assert_eq!(out.elapsed, out.details.total);
        assert_eq!(out.details.tiers.len(), 4);
        assert_eq!(out.details.last_spoken, Some(DialogId::from("welcome")));
        assert_eq!(out.details.active_actions, vec![ActionTag::from("speaking_to_user")]);
        assert!(out.details.previous_inquiry.is_none());
        assert_eq!(conversation.last_inquiry().map(|r| r.reaction), Some("hello"));
    }

    #[test]
    fn resolve_verbose_reports_the_history_it_resolved_against() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        /// Says something new every time it is asked.
        struct Chatty(AtomicUsize);
        impl DialogHistory for Chatty {
            fn last_spoken(&self) -> Option<DialogId> {
                let n = self.0.fetch_add(1, Ordering::SeqCst);
                Some(DialogId::from(if n == 0 { "welcome" } else { "goodbye" }))
            }

            fn previous_to_last_spoken(&self) -> Option<DialogId> {
                None
            }
        }

        let mut conversation = Conversation::new(Arc::new(Chatty(AtomicUsize::new(0))), Arc::new(ActionTracker::new()));
        conversation.register(reaction("welcome reply", "thanks", Classification::Custom), Triggers::new().while_speaking(["welcome"]));

        let out = conversation.resolve_verbose(Utterance::confirmed(["thanks"])).unwrap();
        assert_eq!(out.inquiry.map(|i| i.reaction()), Some("welcome reply"));
        assert_eq!(out.details.last_spoken, Some(DialogId::from("welcome")));
        assert_eq!(out.details.previous_to_last_spoken, None);
        assert!(!out.details.speaking);
    }

    #[test]
    fn options_toggle_stale_hypotheses() {
        let (conversation, _, _) = conversation();
        let mut conversation = conversation.with_options(Options { stale_hypotheses: false, ..Options::default() });
        conversation.register(reaction("compliment", "good question", Classification::Custom), Triggers::always());

        assert!(conversation.resolve(&["good", "a good question"], true).unwrap().is_none());
        assert!(conversation.resolve(&["a good question"], true).unwrap().is_some());
    }

    #[test]
    fn matcher_errors_leave_bookkeeping_alone() {
        struct Broken;
        impl PatternMatcher for Broken {
            fn matches(&self, _: &str, pattern: &Pattern) -> std::result::Result<bool, crate::MatchError> {
                Err(crate::MatchError::new(pattern, "unsupported"))
            }
        }

        let mut conversation =
            Conversation::with_matcher(Broken, Arc::new(DialogLog::new()), Arc::new(ActionTracker::new()));
        conversation.register(reaction("any", "hello", Classification::Custom), Triggers::always());
        let err = conversation.resolve(&["hello"], true).unwrap_err();
        assert!(matches!(err, ResolveError::Match(_)));
        assert!(conversation.last_inquiry().is_none());
    }
}
