//! Persisted profile schema upgrades
//!
//! Profiles written by earlier releases lack the address, banking and
//! identity-detail fields. Before a stored record is deserialized it is
//! passed through [`upgrade_profile`], which backfills every missing field
//! from a fixed default table. Stored values always win over defaults.

use serde_json::{Map, Value};

use super::result::{Error, Result};
use super::user::UserProfile;

/// Current persisted profile schema version.
///
/// Version 1 records carry no `schemaVersion` field at all.
pub const PROFILE_SCHEMA_VERSION: u32 = 2;

pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_COUNTRY: &str = "Saudi Arabia";

/// Field defaults applied to records missing them (camelCase keys, as
/// persisted).
pub const PROFILE_DEFAULTS: &[(&str, &str)] = &[
    ("title", "Mr"),
    ("firstName", ""),
    ("lastName", ""),
    ("address", ""),
    ("city", ""),
    ("region", ""),
    ("postcode", ""),
    ("country", DEFAULT_COUNTRY),
    ("bankName", ""),
    ("iban", ""),
    ("language", "en"),
];

/// Outcome of upgrading one stored record
#[derive(Debug, Clone)]
pub struct ProfileUpgrade {
    pub profile: UserProfile,
    /// Fields that were absent (or null) and received their default
    pub backfilled: Vec<&'static str>,
    /// Schema version the record was stored with
    pub from_version: u32,
}

impl ProfileUpgrade {
    /// Whether the stored record differs from what would be written now
    pub fn changed(&self) -> bool {
        !self.backfilled.is_empty() || self.from_version != PROFILE_SCHEMA_VERSION
    }
}

/// Backfill defaults into a raw record object. Pure: no I/O.
///
/// Null values count as absent. Fields already present are never
/// touched.
pub fn backfill_defaults(record: &mut Map<String, Value>) -> Vec<&'static str> {
    let mut backfilled = Vec::new();
    for (field, default) in PROFILE_DEFAULTS {
        let missing = record.get(*field).map_or(true, Value::is_null);
        if missing {
            record.insert((*field).to_string(), Value::from(*default));
            backfilled.push(*field);
        }
    }
    backfilled
}

/// Upgrade a raw persisted record to the current schema and deserialize it
pub fn upgrade_profile(raw: Value) -> Result<ProfileUpgrade> {
    let Value::Object(mut record) = raw else {
        return Err(Error::validation("stored profile is not a JSON object"));
    };

    let from_version = record
        .get("schemaVersion")
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(1);

    let backfilled = backfill_defaults(&mut record);
    record.insert(
        "schemaVersion".to_string(),
        Value::from(PROFILE_SCHEMA_VERSION),
    );

    let profile: UserProfile = serde_json::from_value(Value::Object(record))?;

    Ok(ProfileUpgrade {
        profile,
        backfilled,
        from_version,
    })
}

/// Parse a stored JSON string and upgrade it
pub fn parse_profile(stored: &str) -> Result<ProfileUpgrade> {
    let raw: Value = serde_json::from_str(stored)?;
    upgrade_profile(raw)
}
