//! Locality tiers.
//!
//! A tier is one `(name, value)` pair describing where an endpoint sits at a
//! single level of the cluster topology, for example `node=host-17` or
//! `rack=r2`.

use std::fmt;
use std::net::IpAddr;

use metrics::counter;
use tracing::debug;

use crate::context::{CompareMode, MatchContext};
use crate::error::ResolveError;

/// Name of the tier whose values are network identities (host names or IPs).
pub const NODE_TIER: &str = "node";

/// One level of a tiered identity.
///
/// An empty `value` means the position at this level is unknown; such a tier
/// never matches anything.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LocalityTier {
    tier_name: String,
    value: String,
}

impl LocalityTier {
    pub fn new(tier_name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            tier_name: tier_name.into(),
            value: value.into(),
        }
    }

    /// Topology level, e.g. `"node"` or `"rack"`.
    pub fn tier_name(&self) -> &str {
        &self.tier_name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// True if the value at this level is unknown.
    pub fn is_unset(&self) -> bool {
        self.value.is_empty()
    }

    /// Returns true if both tiers name the same level and hold the same value.
    ///
    /// Under [`CompareMode::ResolvedAddress`], `node` tiers are compared by the
    /// addresses their values resolve to. If either lookup fails the raw
    /// strings are compared instead, so this never fails.
    pub fn matches(&self, other: &LocalityTier, ctx: &MatchContext) -> bool {
        if self.tier_name != other.tier_name || other.is_unset() {
            return false;
        }
        TierMatcher::new(self, ctx).matches(other)
    }
}

/// A reference tier prepared for matching against many others.
///
/// The reference value is resolved at most once, however many tiers it is
/// compared with.
pub(crate) struct TierMatcher<'a> {
    tier: &'a LocalityTier,
    ctx: &'a MatchContext,
    resolved: Option<Result<IpAddr, ResolveError>>,
}

impl<'a> TierMatcher<'a> {
    pub(crate) fn new(tier: &'a LocalityTier, ctx: &'a MatchContext) -> Self {
        let resolved = (tier.tier_name == NODE_TIER
            && ctx.mode() == CompareMode::ResolvedAddress
            && !tier.is_unset())
        .then(|| ctx.resolver().resolve(&tier.value));
        if let Some(Err(err)) = &resolved {
            resolution_failed(&tier.value, err);
        }
        Self { tier, ctx, resolved }
    }

    pub(crate) fn matches(&self, other: &LocalityTier) -> bool {
        if self.tier.tier_name != other.tier_name {
            return false;
        }
        if self.tier.is_unset() || other.is_unset() {
            return false;
        }
        if let Some(Ok(left)) = &self.resolved {
            match self.ctx.resolver().resolve(&other.value) {
                Ok(right) => return *left == right,
                Err(err) => resolution_failed(&other.value, &err),
            }
        }
        self.tier.value == other.value
    }
}

fn resolution_failed(host: &str, err: &ResolveError) {
    counter!("locality_resolve_fallback_total").increment(1);
    debug!(host, error = %err, "node address resolution failed, comparing raw values");
}

impl fmt::Display for LocalityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.tier_name, self.value)
    }
}
