//! Encodings of a [`TieredIdentity`](crate::identity::TieredIdentity).
//!
//! - **record**: JSON-shaped `{"tiers": [{"tier", "value"}]}` for persistence
//!   and HTTP-style transport
//! - **wire**: compact bincode struct for cluster-internal messages
//!
//! Both decoders are all-or-nothing and report the malformed field.

pub mod record;
pub mod wire;

pub use record::{from_json, from_record, to_json, to_record, IdentityRecord, TierRecord};
pub use wire::{decode_wire, encode_wire, from_wire, to_wire, WireIdentity};
