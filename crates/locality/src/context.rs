//! Match context: how tier values are compared.
//!
//! The comparison mode is an explicit value threaded through
//! [`LocalityTier::matches`](crate::tier::LocalityTier::matches) and
//! [`TieredIdentity::nearest`](crate::identity::TieredIdentity::nearest)
//! rather than a process-global flag.

use std::sync::Arc;
use std::time::Duration;

use crate::config::LocalityConfig;
use crate::resolver::{AddressResolver, SystemResolver};

/// How `node` tier values are compared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CompareMode {
    /// Exact, case-sensitive string equality.
    #[default]
    Literal,
    /// Resolve both values to network addresses and compare those, falling
    /// back to string equality when resolution fails.
    ResolvedAddress,
}

impl CompareMode {
    /// Maps the "compare node tier by IP" flag to a mode.
    pub fn from_flag(compare_node_ip: bool) -> Self {
        if compare_node_ip {
            CompareMode::ResolvedAddress
        } else {
            CompareMode::Literal
        }
    }
}

/// Comparison settings for one or many match/nearest calls.
///
/// Cheap to clone and safe to share across threads.
#[derive(Clone, Debug)]
pub struct MatchContext {
    mode: CompareMode,
    resolver: Arc<dyn AddressResolver>,
}

impl MatchContext {
    /// Plain string comparison for every tier.
    pub fn literal() -> Self {
        Self {
            mode: CompareMode::Literal,
            resolver: Arc::new(SystemResolver::default()),
        }
    }

    /// Builds a context from configuration, using the system resolver.
    pub fn from_config(config: &LocalityConfig) -> Self {
        Self {
            mode: config.compare_mode(),
            resolver: Arc::new(SystemResolver::new(config.resolve_timeout())),
        }
    }

    pub fn with_resolver(mode: CompareMode, resolver: impl AddressResolver + 'static) -> Self {
        Self {
            mode,
            resolver: Arc::new(resolver),
        }
    }

    /// System resolver with an explicit lookup timeout.
    pub fn resolving(timeout: Duration) -> Self {
        Self::with_resolver(CompareMode::ResolvedAddress, SystemResolver::new(timeout))
    }

    pub fn mode(&self) -> CompareMode {
        self.mode
    }

    pub fn resolver(&self) -> &dyn AddressResolver {
        self.resolver.as_ref()
    }
}

impl Default for MatchContext {
    fn default() -> Self {
        Self::literal()
    }
}
