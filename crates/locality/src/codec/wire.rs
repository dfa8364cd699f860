//! Compact wire form of a tiered identity.
//!
//! Layout (bincode, varint integers):
//!
//! ```text
//! version: u8 | tiers: len, (tier name, value)*
//! ```
//!
//! Decoding rejects unknown versions, trailing bytes, payloads larger than
//! [`MAX_WIRE_BYTES`] and empty tier names.

use bincode::Options;
use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, Error, Result};
use crate::identity::TieredIdentity;
use crate::tier::LocalityTier;

/// Current wire format version.
pub const WIRE_VERSION: u8 = 1;

/// Upper bound on an encoded identity.
pub const MAX_WIRE_BYTES: u64 = 64 * 1024;

/// Wire struct exchanged between nodes and the coordinator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireIdentity {
    pub version: u8,
    /// `(tier name, value)` pairs, most specific first.
    pub tiers: Vec<(String, String)>,
}

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_limit(MAX_WIRE_BYTES)
        .reject_trailing_bytes()
}

impl WireIdentity {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        options()
            .serialize(self)
            .map_err(|err| Error::Encode(err.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> std::result::Result<Self, DecodeError> {
        match bytes.first() {
            None => return Err(DecodeError::malformed("version", "empty payload")),
            Some(&version) if version != WIRE_VERSION => {
                return Err(DecodeError::malformed(
                    "version",
                    format!("unsupported wire version {}", version),
                ))
            }
            Some(_) => {}
        }
        options()
            .deserialize(bytes)
            .map_err(|err| DecodeError::malformed("tiers", err.to_string()))
    }
}

/// Converts an identity to its wire struct.
pub fn to_wire(identity: &TieredIdentity) -> WireIdentity {
    WireIdentity {
        version: WIRE_VERSION,
        tiers: identity
            .tiers()
            .iter()
            .map(|tier| (tier.tier_name().to_owned(), tier.value().to_owned()))
            .collect(),
    }
}

/// Converts a wire struct back into an identity.
pub fn from_wire(wire: WireIdentity) -> std::result::Result<TieredIdentity, DecodeError> {
    if wire.version != WIRE_VERSION {
        return Err(DecodeError::malformed(
            "version",
            format!("unsupported wire version {}", wire.version),
        ));
    }
    wire.tiers
        .into_iter()
        .enumerate()
        .map(|(i, (name, value))| {
            if name.is_empty() {
                return Err(DecodeError::malformed(
                    format!("tiers[{}].tier", i),
                    "tier name must not be empty",
                ));
            }
            Ok(LocalityTier::new(name, value))
        })
        .collect::<std::result::Result<Vec<_>, _>>()
        .map(TieredIdentity::new)
}

/// Encodes `identity` to bytes.
///
/// Fails with [`Error::Encode`] when the encoding would exceed
/// [`MAX_WIRE_BYTES`]; such identities can still use the
/// [`to_wire`]/[`from_wire`] struct path.
pub fn encode_wire(identity: &TieredIdentity) -> Result<Vec<u8>> {
    to_wire(identity).to_bytes()
}

pub fn decode_wire(bytes: &[u8]) -> std::result::Result<TieredIdentity, DecodeError> {
    from_wire(WireIdentity::from_bytes(bytes)?)
}
