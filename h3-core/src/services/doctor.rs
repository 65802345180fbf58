//! Doctor service - key-value store health checks
//!
//! Reads every H3 record and reports what the account store would
//! discard or ignore. Nothing is modified.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use crate::domain::phone::{ACCOUNT_PREFIX, CARDS_PREFIX, SESSION_KEY};
use crate::domain::result::Result;
use crate::domain::schema::parse_profile;
use crate::domain::{AccountKey, VirtualCard};
use crate::ports::KeyValueStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Warning,
    Error,
}

/// Doctor service for health checks
pub struct DoctorService {
    kv: Arc<dyn KeyValueStore>,
}

impl DoctorService {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Run all health checks
    pub fn run_checks(&self) -> Result<DoctorResult> {
        let mut checks = BTreeMap::new();

        checks.insert("session".to_string(), self.check_session()?);
        checks.insert("account_records".to_string(), self.check_accounts()?);
        checks.insert("card_lists".to_string(), self.check_cards()?);

        let count = |status: CheckStatus| checks.values().filter(|c| c.status == status).count();
        let summary = DoctorSummary {
            passed: count(CheckStatus::Pass),
            warnings: count(CheckStatus::Warning),
            errors: count(CheckStatus::Error),
        };

        Ok(DoctorResult { checks, summary })
    }

    fn check_session(&self) -> Result<CheckResult> {
        let Some(stored) = self.kv.get(SESSION_KEY)? else {
            return Ok(CheckResult::pass("No active session"));
        };

        let upgrade = match parse_profile(&stored) {
            Ok(upgrade) => upgrade,
            Err(e) => {
                return Ok(CheckResult::error(
                    "Session record is unreadable and will be discarded",
                    vec![json!({ "error": e.to_string() })],
                ))
            }
        };

        let key = upgrade.profile.account_key();
        if !self.kv.contains(&key.profile_key())? {
            return Ok(CheckResult::warning(
                "Session has no matching account record",
                vec![json!({ "account": key.masked() })],
            ));
        }

        Ok(CheckResult::pass("Session record is valid"))
    }

    fn check_accounts(&self) -> Result<CheckResult> {
        let keys = self.kv.keys_with_prefix(ACCOUNT_PREFIX)?;
        if keys.is_empty() {
            return Ok(CheckResult::pass("No account records"));
        }

        let mut unreadable = Vec::new();
        let mut outdated = Vec::new();
        for key in &keys {
            let Some(stored) = self.kv.get(key)? else {
                continue;
            };
            let masked = AccountKey::from_profile_key(key)
                .map(|k| k.masked())
                .unwrap_or_default();
            match parse_profile(&stored) {
                Ok(upgrade) if upgrade.changed() => outdated.push(json!({
                    "account": masked,
                    "from_version": upgrade.from_version,
                    "backfilled": upgrade.backfilled,
                })),
                Ok(_) => {}
                Err(e) => unreadable.push(json!({ "account": masked, "error": e.to_string() })),
            }
        }

        if !unreadable.is_empty() {
            return Ok(CheckResult::error(
                format!(
                    "{} of {} account record(s) are unreadable",
                    unreadable.len(),
                    keys.len()
                ),
                unreadable,
            ));
        }
        if !outdated.is_empty() {
            return Ok(CheckResult::warning(
                format!(
                    "{} account record(s) will be upgraded on next login",
                    outdated.len()
                ),
                outdated,
            ));
        }
        Ok(CheckResult::pass(format!(
            "All {} account record(s) are valid",
            keys.len()
        )))
    }

    fn check_cards(&self) -> Result<CheckResult> {
        let keys = self.kv.keys_with_prefix(CARDS_PREFIX)?;
        if keys.is_empty() {
            return Ok(CheckResult::pass("No card lists"));
        }

        let mut unreadable = Vec::new();
        let mut orphaned = Vec::new();
        for key in &keys {
            let Some(stored) = self.kv.get(key)? else {
                continue;
            };
            let Some(account) = AccountKey::from_cards_key(key) else {
                continue;
            };
            if let Err(e) = serde_json::from_str::<Vec<VirtualCard>>(&stored) {
                unreadable.push(json!({ "account": account.masked(), "error": e.to_string() }));
                continue;
            }
            if !self.kv.contains(&account.profile_key())? {
                orphaned.push(json!({ "account": account.masked() }));
            }
        }

        if !unreadable.is_empty() {
            return Ok(CheckResult::error(
                format!("{} card list(s) are unreadable", unreadable.len()),
                unreadable,
            ));
        }
        if !orphaned.is_empty() {
            return Ok(CheckResult::warning(
                format!("{} card list(s) have no account record", orphaned.len()),
                orphaned,
            ));
        }
        Ok(CheckResult::pass(format!(
            "All {} card list(s) are valid",
            keys.len()
        )))
    }
}

#[derive(Debug, Serialize)]
pub struct DoctorResult {
    pub checks: BTreeMap<String, CheckResult>,
    pub summary: DoctorSummary,
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub status: CheckStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<serde_json::Value>>,
}

impl CheckResult {
    fn pass(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Pass,
            message: message.into(),
            details: None,
        }
    }

    fn warning(message: impl Into<String>, details: Vec<serde_json::Value>) -> Self {
        Self {
            status: CheckStatus::Warning,
            message: message.into(),
            details: Some(details),
        }
    }

    fn error(message: impl Into<String>, details: Vec<serde_json::Value>) -> Self {
        Self {
            status: CheckStatus::Error,
            message: message.into(),
            details: Some(details),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DoctorSummary {
    pub passed: usize,
    pub warnings: usize,
    pub errors: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;

    #[test]
    fn test_empty_store_passes() {
        let doctor = DoctorService::new(Arc::new(MemoryStore::new()));
        let result = doctor.run_checks().unwrap();
        assert_eq!(result.summary.passed, 3);
        assert_eq!(result.summary.errors, 0);
    }

    #[test]
    fn test_corrupt_and_orphaned_records() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(SESSION_KEY, "{not json").unwrap();
        kv.set("account:15550100", r#"{"name":"A"}"#).unwrap();
        kv.set("cards:966501234567", "[]").unwrap();

        let result = DoctorService::new(kv).run_checks().unwrap();

        assert_eq!(result.checks["session"].status, CheckStatus::Error);
        assert_eq!(result.checks["account_records"].status, CheckStatus::Error);
        assert_eq!(result.checks["card_lists"].status, CheckStatus::Warning);
        assert_eq!(result.summary.errors, 2);
    }

    #[test]
    fn test_legacy_record_is_a_warning() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(
            "account:5550100",
            r#"{"name":"Amir Hassan","email":"a@example.com","phoneNumber":"5550100",
               "kycVerified":true,"biometricEnabled":false,"balance":10,"currency":"USD"}"#,
        )
        .unwrap();

        let result = DoctorService::new(kv).run_checks().unwrap();
        let accounts = &result.checks["account_records"];
        assert_eq!(accounts.status, CheckStatus::Warning);
        assert_eq!(accounts.details.as_ref().unwrap()[0]["account"], "***0100");
    }
}
