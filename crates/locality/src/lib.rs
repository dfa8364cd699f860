//! Hierarchical locality for topology-aware placement.
//!
//! This crate provides:
//! - Locality tiers and tiered identities (node, rack, zone, ...)
//! - Tier matching, optionally by resolved network address
//! - Nearest-candidate selection over a list of identities
//! - Record (JSON) and compact wire encodings

pub mod codec;
pub mod config;
pub mod context;
pub mod error;
pub mod identity;
pub mod resolver;
pub mod tier;

pub use config::LocalityConfig;
pub use context::{CompareMode, MatchContext};
pub use error::{ConfigError, DecodeError, Error, ResolveError, Result};
pub use identity::TieredIdentity;
pub use resolver::{AddressResolver, StaticResolver, SystemResolver};
pub use tier::{LocalityTier, NODE_TIER};
