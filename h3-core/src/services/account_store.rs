//! Account store - the active session and its per-account collections
//!
//! Holds the logged-in profile, the session's transactions and the
//! account's virtual cards, and writes every mutation through to the
//! key-value store:
//!
//! | Key                  | Value                        |
//! |----------------------|------------------------------|
//! | `active-session`     | current profile (JSON)       |
//! | `account:{digits}`   | profile for one phone number |
//! | `cards:{digits}`     | card list for one account    |
//!
//! `{digits}` is the phone number with everything but `0-9` removed, so
//! differently formatted entries of one number share a record.
//! Transactions are session state only and are never persisted.

use std::sync::Arc;

use chrono::Datelike;
use rand::RngCore;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::adapters::demo::{demo_profile, demo_transactions};
use crate::domain::phone::SESSION_KEY;
use crate::domain::result::{Error, Result};
use crate::domain::schema::parse_profile;
use crate::domain::{
    AccountKey, CardColor, CardNetwork, CardStatus, Language, ProfileUpdate, Transaction,
    UserProfile, VirtualCard,
};
use crate::ports::KeyValueStore;

/// Id draws per issuance before giving up on a colliding random source
const MAX_CARD_ID_ATTEMPTS: usize = 8;

/// What `login` found under the account key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginOutcome {
    /// No usable record existed; a new profile was written
    Created,
    /// An existing record was loaded (and upgraded if needed)
    Resumed,
}

/// What `restore` found in the session slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    NoSession,
    Resumed,
    /// The stored session could not be read and was deleted
    Discarded { reason: String },
}

pub struct AccountStore {
    kv: Arc<dyn KeyValueStore>,
    rng: Box<dyn RngCore + Send>,
    demo_mode: bool,
    user: Option<UserProfile>,
    transactions: Vec<Transaction>,
    cards: Vec<VirtualCard>,
}

impl AccountStore {
    /// Create a store with no active session. Call [`Self::restore`] to
    /// pick up a session left by a previous run.
    pub fn new(kv: Arc<dyn KeyValueStore>, rng: Box<dyn RngCore + Send>, demo_mode: bool) -> Self {
        Self {
            kv,
            rng,
            demo_mode,
            user: None,
            transactions: Vec::new(),
            cards: Vec::new(),
        }
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    /// Session transactions, newest first
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn cards(&self) -> &[VirtualCard] {
        &self.cards
    }

    pub fn card(&self, id: Uuid) -> Option<&VirtualCard> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn demo_mode(&self) -> bool {
        self.demo_mode
    }

    /// Resume the session left in the session slot, if any
    pub fn restore(&mut self) -> Result<RestoreOutcome> {
        let Some(stored) = self.kv.get(SESSION_KEY)? else {
            return Ok(RestoreOutcome::NoSession);
        };

        let upgrade = match parse_profile(&stored) {
            Ok(upgrade) => upgrade,
            Err(e) => {
                self.kv.remove(SESSION_KEY)?;
                self.clear_session();
                return Ok(RestoreOutcome::Discarded {
                    reason: e.to_string(),
                });
            }
        };

        if upgrade.changed() {
            self.kv
                .set(SESSION_KEY, &serde_json::to_string(&upgrade.profile)?)?;
        }

        self.cards = self.load_cards(&upgrade.profile.account_key())?;
        self.transactions = self.session_transactions();
        self.user = Some(upgrade.profile);
        Ok(RestoreOutcome::Resumed)
    }

    /// Log in with a phone number, creating the account on first use
    ///
    /// Any input is accepted, including an empty string. A stored record
    /// that cannot be read is discarded and replaced by a new profile.
    pub fn login(&mut self, raw_phone: &str, language: Option<Language>) -> Result<LoginOutcome> {
        let key = AccountKey::from_phone(raw_phone);
        let profile_key = key.profile_key();

        let existing = match self.kv.get(&profile_key)? {
            Some(stored) => match parse_profile(&stored) {
                Ok(upgrade) => Some(upgrade.profile),
                Err(_) => {
                    self.kv.remove(&profile_key)?;
                    None
                }
            },
            None => None,
        };

        let (profile, outcome) = match existing {
            Some(mut profile) => {
                if let Some(language) = language {
                    profile.language = language;
                }
                (profile, LoginOutcome::Resumed)
            }
            None => {
                let language = language.unwrap_or_default();
                let profile = if self.demo_mode {
                    demo_profile(raw_phone, language)
                } else {
                    UserProfile::new(raw_phone, language)
                };
                (profile, LoginOutcome::Created)
            }
        };

        self.write_profile(&key, &profile)?;

        self.cards = self.load_cards(&key)?;
        self.transactions = self.session_transactions();
        self.user = Some(profile);
        Ok(outcome)
    }

    /// End the session. The account record and cards stay in storage.
    pub fn logout(&mut self) -> Result<()> {
        self.clear_session();
        self.kv.remove(SESSION_KEY)
    }

    /// Prepend a transaction to the session history
    pub fn add_transaction(&mut self, tx: Transaction) {
        self.transactions.insert(0, tx);
    }

    /// Add `delta` to the balance. No floor is applied.
    ///
    /// Returns the new balance, or `None` without a session.
    pub fn update_balance(&mut self, delta: Decimal) -> Result<Option<Decimal>> {
        let Some(mut profile) = self.user.clone() else {
            return Ok(None);
        };
        profile.balance += delta;

        self.write_profile(&profile.account_key(), &profile)?;

        let balance = profile.balance;
        self.user = Some(profile);
        Ok(Some(balance))
    }

    /// Merge `update` into the profile. Returns false without a session.
    ///
    /// When the merged phone number normalizes to a different key, the
    /// account record and card list move to the new key and the old keys
    /// are deleted. A key already held by another account is rejected
    /// before anything is written.
    pub fn update_user(&mut self, update: &ProfileUpdate) -> Result<bool> {
        let Some(mut profile) = self.user.clone() else {
            return Ok(false);
        };
        let old_key = profile.account_key();
        update.apply_to(&mut profile);
        let new_key = profile.account_key();

        let moving = new_key != old_key;
        if moving && self.kv.contains(&new_key.profile_key())? {
            return Err(Error::validation(
                "Phone number already belongs to another account",
            ));
        }

        self.write_profile(&new_key, &profile)?;

        if moving {
            // New keys first: a failure in between leaves a copy, not a loss
            self.persist_cards(&new_key)?;
            self.kv.remove(&old_key.cards_key())?;
            self.kv.remove(&old_key.profile_key())?;
        }

        self.user = Some(profile);
        Ok(true)
    }

    /// Issue a new ACTIVE card to the logged-in user
    pub fn add_virtual_card(
        &mut self,
        network: CardNetwork,
        color: CardColor,
    ) -> Result<Option<VirtualCard>> {
        let Some(profile) = self.user.as_ref() else {
            return Ok(None);
        };
        let key = profile.account_key();
        let holder_name = profile.card_holder_name();
        let issue_year = chrono::Local::now().year();

        let mut issued = None;
        for _ in 0..MAX_CARD_ID_ATTEMPTS {
            let card = VirtualCard::generate(
                self.rng.as_mut(),
                network,
                color,
                holder_name.clone(),
                issue_year,
            );
            if self.card(card.id).is_none() {
                issued = Some(card);
                break;
            }
        }
        let card = issued.ok_or_else(|| Error::storage("Could not generate a unique card id"))?;

        self.cards.push(card.clone());
        self.persist_cards(&key)?;
        Ok(Some(card))
    }

    /// Remove a card. Returns false when there is no session or no such
    /// card.
    pub fn remove_virtual_card(&mut self, id: Uuid) -> Result<bool> {
        let Some(key) = self.user.as_ref().map(UserProfile::account_key) else {
            return Ok(false);
        };
        let before = self.cards.len();
        self.cards.retain(|c| c.id != id);
        if self.cards.len() == before {
            return Ok(false);
        }

        self.persist_cards(&key)?;
        Ok(true)
    }

    /// Flip a card between ACTIVE and FROZEN. Returns the new status.
    pub fn toggle_card_status(&mut self, id: Uuid) -> Result<Option<CardStatus>> {
        let Some(key) = self.user.as_ref().map(UserProfile::account_key) else {
            return Ok(None);
        };
        let Some(card) = self.cards.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        card.status = card.status.toggled();
        let status = card.status;

        self.persist_cards(&key)?;
        Ok(Some(status))
    }

    /// Whether an account record exists for this phone number
    pub fn account_exists(&self, raw_phone: &str) -> Result<bool> {
        self.kv
            .contains(&AccountKey::from_phone(raw_phone).profile_key())
    }

    fn clear_session(&mut self) {
        self.user = None;
        self.transactions.clear();
        self.cards.clear();
    }

    /// Transactions a fresh session starts with
    fn session_transactions(&self) -> Vec<Transaction> {
        if self.demo_mode {
            demo_transactions()
        } else {
            Vec::new()
        }
    }

    /// Write the session slot and the account record
    fn write_profile(&self, key: &AccountKey, profile: &UserProfile) -> Result<()> {
        let json = serde_json::to_string(profile)?;
        self.kv.set(SESSION_KEY, &json)?;
        self.kv.set(&key.profile_key(), &json)
    }

    /// Persisted cards for an account. An unreadable list counts as empty.
    fn load_cards(&self, key: &AccountKey) -> Result<Vec<VirtualCard>> {
        Ok(self
            .kv
            .get(&key.cards_key())?
            .and_then(|stored| serde_json::from_str(&stored).ok())
            .unwrap_or_default())
    }

    fn persist_cards(&self, key: &AccountKey) -> Result<()> {
        self.kv
            .set(&key.cards_key(), &serde_json::to_string(&self.cards)?)
    }
}
