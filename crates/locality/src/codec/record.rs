//! Record (JSON) form of a tiered identity.
//!
//! Shape: `{"tiers": [{"tier": "node", "value": "A"}, ...]}`. Tier order is
//! preserved. Decoding is strict: unknown fields, wrong types, missing fields
//! and empty tier names are rejected.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::DecodeError;
use crate::identity::TieredIdentity;
use crate::tier::LocalityTier;

/// Serde mirror of the record form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentityRecord {
    pub tiers: Vec<TierRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TierRecord {
    pub tier: String,
    pub value: String,
}

impl From<TieredIdentity> for IdentityRecord {
    fn from(identity: TieredIdentity) -> Self {
        Self {
            tiers: identity
                .tiers()
                .iter()
                .map(|tier| TierRecord {
                    tier: tier.tier_name().to_owned(),
                    value: tier.value().to_owned(),
                })
                .collect(),
        }
    }
}

impl TryFrom<IdentityRecord> for TieredIdentity {
    type Error = DecodeError;

    fn try_from(record: IdentityRecord) -> Result<Self, Self::Error> {
        record
            .tiers
            .into_iter()
            .enumerate()
            .map(|(i, entry)| {
                if entry.tier.is_empty() {
                    return Err(empty_tier_name(i));
                }
                Ok(LocalityTier::new(entry.tier, entry.value))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(TieredIdentity::new)
    }
}

/// Encodes `identity` as a record value.
pub fn to_record(identity: &TieredIdentity) -> Value {
    let tiers: Vec<Value> = identity
        .tiers()
        .iter()
        .map(|tier| json!({ "tier": tier.tier_name(), "value": tier.value() }))
        .collect();
    json!({ "tiers": tiers })
}

/// Decodes a record value, naming the offending field on failure.
pub fn from_record(record: &Value) -> Result<TieredIdentity, DecodeError> {
    let root = record
        .as_object()
        .ok_or_else(|| DecodeError::malformed("record", "expected an object"))?;
    reject_unknown(root, &["tiers"], "")?;

    let entries = root
        .get("tiers")
        .ok_or_else(|| DecodeError::malformed("tiers", "missing field"))?
        .as_array()
        .ok_or_else(|| DecodeError::malformed("tiers", "expected an array"))?;

    let mut tiers = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let path = format!("tiers[{}]", i);
        let entry = entry
            .as_object()
            .ok_or_else(|| DecodeError::malformed(path.as_str(), "expected an object"))?;
        reject_unknown(entry, &["tier", "value"], &path)?;

        let name = string_field(entry, "tier", &path)?;
        if name.is_empty() {
            return Err(empty_tier_name(i));
        }
        let value = string_field(entry, "value", &path)?;
        tiers.push(LocalityTier::new(name, value));
    }
    Ok(TieredIdentity::new(tiers))
}

/// Record form rendered as a JSON string.
pub fn to_json(identity: &TieredIdentity) -> String {
    to_record(identity).to_string()
}

pub fn from_json(text: &str) -> Result<TieredIdentity, DecodeError> {
    let value: Value =
        serde_json::from_str(text).map_err(|err| DecodeError::malformed("record", err.to_string()))?;
    from_record(&value)
}

fn string_field<'a>(
    object: &'a Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<&'a str, DecodeError> {
    let field = format!("{}.{}", path, key);
    object
        .get(key)
        .ok_or_else(|| DecodeError::malformed(field.as_str(), "missing field"))?
        .as_str()
        .ok_or_else(|| DecodeError::malformed(field.as_str(), "expected a string"))
}

fn reject_unknown(object: &Map<String, Value>, known: &[&str], path: &str) -> Result<(), DecodeError> {
    match object.keys().find(|key| !known.contains(&key.as_str())) {
        Some(key) if path.is_empty() => Err(DecodeError::malformed(key.as_str(), "unknown field")),
        Some(key) => Err(DecodeError::malformed(format!("{}.{}", path, key), "unknown field")),
        None => Ok(()),
    }
}

fn empty_tier_name(index: usize) -> DecodeError {
    DecodeError::malformed(format!("tiers[{}].tier", index), "tier name must not be empty")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TieredIdentity {
        TieredIdentity::from_pairs([("node", "A"), ("rack", "r1")])
    }

    #[test]
    fn test_record_shape() {
        assert_eq!(
            to_json(&sample()),
            r#"{"tiers":[{"tier":"node","value":"A"},{"tier":"rack","value":"r1"}]}"#
        );
    }

    #[test]
    fn test_record_round_trip() {
        let identity = sample();
        assert_eq!(from_record(&to_record(&identity)).unwrap(), identity);
        assert_eq!(from_json(&to_json(&identity)).unwrap(), identity);
    }

    #[test]
    fn test_serde_matches_record_form() {
        let identity = sample();
        let text = serde_json::to_string(&identity).unwrap();
        assert_eq!(text, to_json(&identity));
        let back: TieredIdentity = serde_json::from_str(&text).unwrap();
        assert_eq!(back, identity);
    }

    #[test]
    fn test_malformed_fields_are_named() {
        let cases = [
            (json!([]), "record"),
            (json!({}), "tiers"),
            (json!({"tiers": {}}), "tiers"),
            (json!({"tiers": [], "extra": 1}), "extra"),
            (json!({"tiers": [7]}), "tiers[0]"),
            (json!({"tiers": [{"value": "A"}]}), "tiers[0].tier"),
            (json!({"tiers": [{"tier": "node", "value": "A"}, {"tier": "rack"}]}), "tiers[1].value"),
            (json!({"tiers": [{"tier": "node", "value": 3}]}), "tiers[0].value"),
            (json!({"tiers": [{"tier": "", "value": "A"}]}), "tiers[0].tier"),
            (json!({"tiers": [{"tier": "node", "value": "A", "x": true}]}), "tiers[0].x"),
        ];
        for (record, field) in cases {
            let err = from_record(&record).unwrap_err();
            assert_eq!(err.field(), field, "record {}", record);
        }
    }

    #[test]
    fn test_invalid_json_text() {
        let err = from_json("{\"tiers\": [").unwrap_err();
        assert_eq!(err.field(), "record");
    }

    #[test]
    fn test_serde_rejects_empty_tier_name() {
        let result: Result<TieredIdentity, _> =
            serde_json::from_str(r#"{"tiers":[{"tier":"","value":"A"}]}"#);
        assert!(result.is_err());
    }
}
