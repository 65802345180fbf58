//! Account key derivation from phone numbers

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Storage slot holding the currently active profile
pub const SESSION_KEY: &str = "active-session";

/// Prefix for per-account profile records
pub const ACCOUNT_PREFIX: &str = "account:";

/// Prefix for per-account virtual card collections
pub const CARDS_PREFIX: &str = "cards:";

fn non_digits() -> &'static Regex {
    static NON_DIGITS: OnceLock<Regex> = OnceLock::new();
    NON_DIGITS.get_or_init(|| Regex::new(r"[^0-9]").expect("static regex"))
}

/// Identity of a persisted account: the digits of a phone number
///
/// `"+1 555-0100"` and `"1 (555) 0100"` both normalize to `15550100` and
/// therefore address the same records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountKey(String);

impl AccountKey {
    /// Keep only ASCII digits. Empty input yields an empty key.
    pub fn from_phone(raw_phone: &str) -> Self {
        Self(non_digits().replace_all(raw_phone, "").into_owned())
    }

    pub fn digits(&self) -> &str {
        &self.0
    }

    /// Key of the profile record
    pub fn profile_key(&self) -> String {
        format!("{}{}", ACCOUNT_PREFIX, self.0)
    }

    /// Key of the virtual card collection
    pub fn cards_key(&self) -> String {
        format!("{}{}", CARDS_PREFIX, self.0)
    }

    /// Recover the key from a profile storage key (`account:...`)
    pub fn from_profile_key(key: &str) -> Option<Self> {
        key.strip_prefix(ACCOUNT_PREFIX).map(|d| Self(d.to_string()))
    }

    /// Recover the key from a card storage key (`cards:...`)
    pub fn from_cards_key(key: &str) -> Option<Self> {
        key.strip_prefix(CARDS_PREFIX).map(|d| Self(d.to_string()))
    }

    /// Last four digits with the rest hidden, for display and logs
    pub fn masked(&self) -> String {
        let len = self.0.len();
        if len <= 4 {
            return "*".repeat(len);
        }
        format!("{}{}", "*".repeat(len - 4), &self.0[len - 4..])
    }
}

impl fmt::Display for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
