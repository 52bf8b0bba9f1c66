//! Resolution metrics.
//!
//! `Resolver::resolve` returns only the inquiry. `Resolver::run_with_metrics`
//! additionally reports how the tier walk went, which is what the CLI prints
//! and what tests use to check short-circuiting.
//!
//! - One `TierMetrics` per tier actually walked, in walk order. Tiers after
//!   the matching one are absent.
//! - `MatchTrace` says where the winning reaction was found.

use std::time::Duration;

use super::providers::RecordedHistory;
use super::reaction::Inquiry;
use super::resolver::Tier;
use crate::{ActionTag, Classification, Trigger};

#[derive(Debug, Default, Clone)]
pub struct ResolveMetrics {
    /// Total elapsed time for the resolution.
    pub total: Duration,
    pub tiers: Vec<TierMetrics>,
}

impl ResolveMetrics {
    /// Reactions evaluated across all tiers.
    pub fn evaluated(&self) -> usize {
        self.tiers.iter().map(|t| t.evaluated).sum()
    }
}

#[derive(Debug, Clone)]
pub struct TierMetrics {
    pub tier: Tier,
    pub duration: Duration,
    /// Trigger keys whose reaction lists were walked.
    pub keys: usize,
    /// Reactions evaluated.
    pub evaluated: usize,
    /// Reactions whose precondition failed (no pattern matching done).
    pub unmet: usize,
    /// Reactions vetoed by an exclusion pattern.
    pub excluded: usize,
}

impl TierMetrics {
    pub(crate) fn new(tier: Tier) -> Self {
        TierMetrics { tier, duration: Duration::ZERO, keys: 0, evaluated: 0, unmet: 0, excluded: 0 }
    }
}

/// Where the winning reaction was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchTrace {
    pub tier: Tier,
    /// `None` for the constant tier.
    pub trigger: Option<Trigger>,
    pub reaction: &'static str,
    pub classification: Classification,
    /// Display form of the positive pattern that matched.
    pub pattern: String,
}

/// Resolver output bundled with timing information.
#[derive(Debug)]
pub struct RunResult {
    pub inquiry: Option<Inquiry>,
    pub trace: Option<MatchTrace>,
    /// The active actions the resolution saw, newest first.
    pub actions: Vec<ActionTag>,
    /// The dialog history the resolution saw.
    pub history: RecordedHistory,
    pub metrics: ResolveMetrics,
}
