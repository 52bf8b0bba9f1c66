//! Reaction resolution engine.
//!
//! This module is the entry point for the tiered trigger/reaction engine. It is
//! split into focused submodules under `src/engine/`, with the public types
//! re-exported here.
//!
//! ## How the parts work together
//!
//! ```text
//! installation                         resolution (one call per utterance)
//! ────────────                         ───────────────────────────────────
//! Reaction::builder / reaction!        Resolver::resolve(utterance, context, options)
//!   (reaction.rs)                        (resolver.rs)
//!          │                               │
//!          v                               ├─ tier 1: last / previous dialog ids ─┐
//! Registry::register(reaction, triggers)   ├─ tier 2: active actions, newest first ├─ TriggerIndex lookups
//!   (registry.rs)                          ├─ tier 3: absent actions               ┘   (trigger.rs)
//!     ├─ constant list                     └─ tier 4: constant list
//!     ├─ dialog index        ──────────────────────────┐
//!     ├─ active-action index                           v
//!     └─ absent-action index               Reaction::evaluate (reaction.rs)
//!                                            - precondition (cheap, first)
//!                                            - positive patterns  ┐ matching.rs
//!                                            - exclusion patterns ┘ (stale-hypothesis fallback)
//!                                                      │
//!                                                      v
//!                                          first match ──▶ Inquiry { classification, handler }
//! ```
//!
//! Resolution is synchronous and deterministic: tier order is fixed and,
//! within a tier, reactions are tried in registration order. The first
//! reaction that matches wins and nothing after it is evaluated.
//!
//! ## Responsibilities by module
//!
//! - `reaction.rs`: the reaction closure contract (precondition, patterns,
//!   exclusions, classification, handler) and the `Inquiry` handed back.
//! - `matching.rs`: how a pattern set is tested against an utterance,
//!   including final-only patterns and the stale-hypothesis fallback.
//! - `trigger.rs`: the append-only, insertion-ordered trigger index.
//! - `registry.rs`: the four rule collections and `register`.
//! - `resolver.rs`: the tier walk.
//! - `providers.rs`: collaborator contracts for action state and dialog
//!   history, with reference implementations.
//! - `metrics.rs`: per-tier timing and counters, plus the match trace.
//!
//! ## Debugging
//!
//! The engine emits `tracing` events. With the CLI, set
//! `RUST_LOG=interject=trace` to see every reaction verdict.

#[path = "engine/matching.rs"]
mod matching;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/providers.rs"]
mod providers;
#[path = "engine/reaction.rs"]
mod reaction;
#[path = "engine/registry.rs"]
mod registry;
#[path = "engine/resolver.rs"]
mod resolver;
#[path = "engine/trigger.rs"]
mod trigger;

pub use metrics::{MatchTrace, ResolveMetrics, RunResult, TierMetrics};
pub use providers::{ActionState, ActionTracker, ActiveActions, DialogHistory, DialogLog, RecordedHistory};
pub use reaction::{Handler, Inquiry, Precondition, Reaction, ReactionBuilder, Situation, Verdict};
pub use registry::{Registry, Triggers};
pub use resolver::{Context, Resolver, Tier, Tiers};
pub use trigger::TriggerIndex;
