//! The tier walk.
//!
//! Given an utterance, the resolver looks for the first reaction that matches,
//! walking four tiers in a fixed order:
//!
//! ```text
//! (1) dialog         last spoken id, then previous-to-last   ── dialog index
//! (2) active action  each ongoing action, newest first       ── active-action index
//! (3) absent action  each registered key NOT ongoing         ── absent-action index
//! (4) constant       every time                              ── constant list
//! ```
//!
//! Inside a tier, reactions are tried in registration order. The first match
//! ends the whole walk. Given the same registry and inputs, the same reaction
//! is always selected.
//!
//! The action-state provider is queried exactly once per call. Its snapshot
//! serves tiers 2 and 3 and every precondition, so all of them agree on what
//! was going on. The dialog history is captured the same way.
//!
//! ## Failure
//!
//! There are no "soft" failures: no history, no actions and no match are all
//! `Ok(None)`. A collaborator error (matcher or action state) aborts the
//! attempt and is returned as is.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use super::metrics::{MatchTrace, ResolveMetrics, RunResult, TierMetrics};
use super::providers::{ActionState, ActiveActions, DialogHistory, RecordedHistory};
use super::reaction::{Inquiry, Reaction, Situation, Verdict};
use super::registry::Registry;
use crate::error::{MatchError, ResolveError};
use crate::{InquiryRecord, Options, PatternMatcher, Trigger, Utterance};

/// One of the four priority levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Dialog,
    ActiveAction,
    AbsentAction,
    Constant,
}

impl Tier {
    /// Walk order.
    pub const ORDER: [Tier; 4] = [Tier::Dialog, Tier::ActiveAction, Tier::AbsentAction, Tier::Constant];

    pub fn flag(self) -> Tiers {
        match self {
            Tier::Dialog => Tiers::DIALOG,
            Tier::ActiveAction => Tiers::ACTIVE_ACTION,
            Tier::AbsentAction => Tiers::ABSENT_ACTION,
            Tier::Constant => Tiers::CONSTANT,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Tier::Dialog => "dialog",
            Tier::ActiveAction => "active-action",
            Tier::AbsentAction => "absent-action",
            Tier::Constant => "constant",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags::bitflags! {
    /// Set of tiers the resolver is allowed to walk.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Tiers: u8 {
        const DIALOG        = 1 << 0;
        const ACTIVE_ACTION = 1 << 1;
        const ABSENT_ACTION = 1 << 2;
        const CONSTANT      = 1 << 3;
    }
}

/// State of the agent consulted during one resolution.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    pub dialogs: &'a dyn DialogHistory,
    pub actions: &'a dyn ActionState,
    /// The inquiry resolved before this one, exposed to preconditions.
    pub previous_inquiry: Option<&'a InquiryRecord>,
}

impl<'a> Context<'a> {
    pub fn new(dialogs: &'a dyn DialogHistory, actions: &'a dyn ActionState) -> Self {
        Context { dialogs, actions, previous_inquiry: None }
    }

    pub fn with_previous_inquiry(mut self, previous: Option<&'a InquiryRecord>) -> Self {
        self.previous_inquiry = previous;
        self
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("last_spoken", &self.dialogs.last_spoken())
            .field("previous_to_last_spoken", &self.dialogs.previous_to_last_spoken())
            .field("previous_inquiry", &self.previous_inquiry)
            .finish()
    }
}

/// A reaction that matched, with where it was found.
struct Hit<'r> {
    reaction: &'r Reaction,
    trigger: Option<Trigger>,
    pattern: String,
}

/// Resolves utterances against a registry.
///
/// Usage: `Resolver::new(&registry, &matcher).resolve(&utterance, &context, &options)`.
pub struct Resolver<'a> {
    registry: &'a Registry,
    matcher: &'a dyn PatternMatcher,
}

impl<'a> Resolver<'a> {
    pub fn new(registry: &'a Registry, matcher: &'a dyn PatternMatcher) -> Self {
        Resolver { registry, matcher }
    }

    /// Find the first matching reaction, if any.
    pub fn resolve(
        &self,
        utterance: &Utterance,
        context: &Context<'_>,
        options: &Options,
    ) -> Result<Option<Inquiry>, ResolveError> {
        Ok(self.run_with_metrics(utterance, context, options)?.inquiry)
    }

    /// Like [`resolve`](Self::resolve), plus per-tier metrics and a trace of
    /// the match.
    pub fn run_with_metrics(
        &self,
        utterance: &Utterance,
        context: &Context<'_>,
        options: &Options,
    ) -> Result<RunResult, ResolveError> {
        let total_start = Instant::now();
        let actions = ActiveActions::from_newest_first(context.actions.currently_occurring()?);
        let history = RecordedHistory::capture(context.dialogs);
        let situation =
            Situation { utterance, actions: &actions, dialogs: &history, previous_inquiry: context.previous_inquiry };

        tracing::debug!(
            hypotheses = utterance.hypotheses().len(),
            is_final = utterance.is_final(),
            actions = ?actions.to_vec(),
            "resolving utterance"
        );

        let mut metrics = ResolveMetrics::default();
        let mut found: Option<(Tier, Hit<'_>)> = None;

        for tier in Tier::ORDER {
            if !options.tiers.contains(tier.flag()) {
                continue;
            }

            let tier_start = Instant::now();
            let mut tally = TierMetrics::new(tier);
            let hit = match tier {
                Tier::Dialog => self.walk_dialogs(&situation, options, &mut tally)?,
                Tier::ActiveAction => self.walk_active(&situation, options, &mut tally)?,
                Tier::AbsentAction => self.walk_absent(&situation, options, &mut tally)?,
                Tier::Constant => {
                    tally.keys += 1;
                    self.first_in(self.registry.constant(), None, &situation, options, &mut tally)?
                }
            };
            tally.duration = tier_start.elapsed();
            tracing::trace!(tier = %tier, evaluated = tally.evaluated, matched = hit.is_some(), "tier walked");
            metrics.tiers.push(tally);

            if let Some(hit) = hit {
                found = Some((tier, hit));
                break;
            }
        }

        let (inquiry, trace) = match found {
            Some((tier, hit)) => {
                tracing::debug!(
                    tier = %tier,
                    trigger = ?hit.trigger,
                    reaction = hit.reaction.name(),
                    classification = %hit.reaction.classification(),
                    "reaction matched"
                );
                let trace = MatchTrace {
                    tier,
                    trigger: hit.trigger,
                    reaction: hit.reaction.name(),
                    classification: hit.reaction.classification(),
                    pattern: hit.pattern,
                };
                (Some(hit.reaction.inquiry()), Some(trace))
            }
            None => {
                tracing::debug!("no reaction matched");
                (None, None)
            }
        };

        metrics.total = total_start.elapsed();
        Ok(RunResult { inquiry, trace, actions: actions.to_vec(), history, metrics })
    }

    fn walk_dialogs(
        &self,
        situation: &Situation<'_>,
        options: &Options,
        tally: &mut TierMetrics,
    ) -> Result<Option<Hit<'a>>, MatchError> {
        let dialogs = situation.dialogs;
        for id in [dialogs.last_spoken(), dialogs.previous_to_last_spoken()].into_iter().flatten() {
            tally.keys += 1;
            let reactions = self.registry.dialog_index().get(&id);
            if let Some(hit) = self.first_in(reactions, Some(Trigger::Dialog(id)), situation, options, tally)? {
                return Ok(Some(hit));
            }
        }
        Ok(None)
    }

    fn walk_active(
        &self,
        situation: &Situation<'_>,
        options: &Options,
        tally: &mut TierMetrics,
    ) -> Result<Option<Hit<'a>>, MatchError> {
        for tag in situation.actions.iter() {
            tally.keys += 1;
            let reactions = self.registry.active_index().get(tag);
            if let Some(hit) = self.first_in(reactions, Some(Trigger::Action(tag.clone())), situation, options, tally)? {
                return Ok(Some(hit));
            }
        }
        Ok(None)
    }

    fn walk_absent(
        &self,
        situation: &Situation<'_>,
        options: &Options,
        tally: &mut TierMetrics,
    ) -> Result<Option<Hit<'a>>, MatchError> {
        for (tag, reactions) in self.registry.absent_index().iter() {
            if situation.actions.contains(tag) {
                continue;
            }
            tally.keys += 1;
            if let Some(hit) = self.first_in(reactions, Some(Trigger::Action(tag.clone())), situation, options, tally)? {
                return Ok(Some(hit));
            }
        }
        Ok(None)
    }

    /// Evaluate `reactions` in order and return the first match.
    fn first_in(
        &self,
        reactions: &'a [Arc<Reaction>],
        trigger: Option<Trigger>,
        situation: &Situation<'_>,
        options: &Options,
        tally: &mut TierMetrics,
    ) -> Result<Option<Hit<'a>>, MatchError> {
        for reaction in reactions {
            tally.evaluated += 1;
            let verdict = reaction.evaluate(situation, self.matcher, options)?;
            tracing::trace!(reaction = reaction.name(), ?verdict, "evaluated reaction");
            match verdict {
                Verdict::Matched(pattern) => {
                    return Ok(Some(Hit { reaction, trigger, pattern: pattern.to_string() }));
                }
                Verdict::Unmet => tally.unmet += 1,
                Verdict::Excluded => tally.excluded += 1,
                Verdict::NoMatch => {}
            }
        }
        Ok(None)
    }
}
