//! Tiered identities and nearest-candidate selection.
//!
//! A [`TieredIdentity`] lists an endpoint's locality tiers from most specific
//! (closest, e.g. `node`) to least specific (farthest, e.g. `zone`). Given a
//! list of candidate identities, [`TieredIdentity::nearest`] picks the one
//! sharing the most specific tier with the reference identity.
//!
//! # Algorithm
//!
//! 1. For each tier position, most specific first, scan the candidates in
//!    order and return the first whose tier at that position matches.
//! 2. If nothing matches at any position, return the first candidate.
//!
//! Cost is at most `tiers * candidates` tier comparisons.

use std::fmt;

use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::codec::record::IdentityRecord;
use crate::context::MatchContext;
use crate::tier::{LocalityTier, TierMatcher};

/// Ordered locality descriptor of one endpoint.
///
/// Identities are immutable values; equality and hashing are structural over
/// the tier sequence. Serde support uses the record shape
/// `{"tiers": [{"tier": ..., "value": ...}]}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "IdentityRecord", try_from = "IdentityRecord")]
pub struct TieredIdentity {
    tiers: Vec<LocalityTier>,
}

impl TieredIdentity {
    pub fn new(tiers: Vec<LocalityTier>) -> Self {
        Self { tiers }
    }

    /// Builds an identity from already-split `(tier, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        pairs
            .into_iter()
            .map(|(name, value)| LocalityTier::new(name, value))
            .collect()
    }

    pub fn tiers(&self) -> &[LocalityTier] {
        &self.tiers
    }

    pub fn tier(&self, index: usize) -> Option<&LocalityTier> {
        self.tiers.get(index)
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Returns the candidate topologically closest to `self`.
    ///
    /// `None` only when `candidates` is empty. See the module docs for the
    /// selection order.
    pub fn nearest<'a>(
        &self,
        candidates: &'a [TieredIdentity],
        ctx: &MatchContext,
    ) -> Option<&'a TieredIdentity> {
        self.nearest_index(candidates, ctx)
            .map(|index| &candidates[index])
    }

    /// Same as [`nearest`](Self::nearest) but returns the candidate's position.
    pub fn nearest_index(&self, candidates: &[TieredIdentity], ctx: &MatchContext) -> Option<usize> {
        if candidates.is_empty() {
            return None;
        }

        for (level, tier) in self.tiers.iter().enumerate() {
            let matcher = TierMatcher::new(tier, ctx);
            let found = candidates.iter().position(|candidate| {
                candidate
                    .tier(level)
                    .is_some_and(|other| matcher.matches(other))
            });
            if let Some(index) = found {
                trace!(identity = %self, level, index, "nearest candidate matched on tier");
                return Some(index);
            }
        }

        counter!("locality_nearest_fallback_total").increment(1);
        trace!(identity = %self, "no tier matched, using first candidate");
        Some(0)
    }
}

impl FromIterator<LocalityTier> for TieredIdentity {
    fn from_iter<I: IntoIterator<Item = LocalityTier>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl From<Vec<LocalityTier>> for TieredIdentity {
    fn from(tiers: Vec<LocalityTier>) -> Self {
        Self::new(tiers)
    }
}

impl fmt::Display for TieredIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TieredIdentity(")?;
        for (i, tier) in self.tiers.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", tier)?;
        }
        f.write_str(")")
    }
}
