//! Pattern-set matching with stale-hypothesis recovery.
//!
//! Speech recognizers revise themselves. An interim transcript may contain the
//! words a pattern wants ("good question") while the corrected final
//! transcript drops them ("good"). Testing only the final text would lose a
//! genuine user intent at the moment it is confirmed, so once the utterance is
//! final every older hypothesis is tested as well.
//!
//! ```text
//! hypotheses: ["good", "a good question", "a good"]   (newest first)
//!                 │            │               │
//! interim:     tested          ·               ·
//! final:       tested       tested          tested
//! ```
//!
//! Per pattern:
//!
//! - final-only patterns are skipped while the utterance is interim;
//! - the newest hypothesis is always tested;
//! - when final, the older hypotheses are tested too.
//!
//! Any hypothesis matching any pattern wins. There is no scoring.

use crate::error::MatchError;
use crate::{Pattern, PatternMatcher, Utterance};

/// Return the first pattern of `patterns` that matches `utterance`.
///
/// Exclusion sets go through the same procedure as positive sets.
pub(crate) fn first_match<'p>(
    utterance: &Utterance,
    patterns: &'p [Pattern],
    matcher: &dyn PatternMatcher,
    stale_hypotheses: bool,
) -> Result<Option<&'p Pattern>, MatchError> {
    let Some(newest) = utterance.newest() else {
        return Ok(None);
    };

    for pattern in patterns {
        if pattern.is_final_only() && !utterance.is_final() {
            continue;
        }

        if matcher.matches(newest, pattern)? {
            return Ok(Some(pattern));
        }

        if utterance.is_final() && stale_hypotheses {
            for older in utterance.older() {
                if matcher.matches(older, pattern)? {
                    tracing::trace!(%pattern, hypothesis = %older, "matched a stale hypothesis");
                    return Ok(Some(pattern));
                }
            }
        }
    }

    Ok(None)
}
