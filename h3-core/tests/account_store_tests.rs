//! Account store behaviour across sessions and accounts
//!
//! Runs against the in-memory key-value store with a seeded random source,
//! so card numbers are reproducible between runs.
//!
//! Run with: cargo test --test account_store_tests

use std::sync::Arc;

use rand::rngs::mock::StepRng;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use serde_json::json;

use h3_core::adapters::memory::MemoryStore;
use h3_core::domain::phone::SESSION_KEY;
use h3_core::domain::schema::PROFILE_SCHEMA_VERSION;
use h3_core::ports::KeyValueStore;
use h3_core::services::{AccountStore, LoginOutcome, RestoreOutcome};
use h3_core::{
    AccountKey, CardColor, CardNetwork, CardStatus, Error, Language, ProfileUpdate,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn create_store(kv: &Arc<MemoryStore>) -> AccountStore {
    create_store_with_seed(kv, 42)
}

fn create_store_with_seed(kv: &Arc<MemoryStore>, seed: u64) -> AccountStore {
    AccountStore::new(kv.clone(), Box::new(StdRng::seed_from_u64(seed)), false)
}

fn stored_json(kv: &MemoryStore, key: &str) -> serde_json::Value {
    let stored = kv.get(key).unwrap().expect("key should be present");
    serde_json::from_str(&stored).unwrap()
}

// ============================================================================
// Login and Normalization
// ============================================================================

#[test]
fn test_first_login_creates_blank_profile() {
    let kv = Arc::new(MemoryStore::new());
    let mut store = create_store(&kv);

    let outcome = store.login("+1 555-0100", None).unwrap();
    assert_eq!(outcome, LoginOutcome::Created);

    let user = store.user().unwrap();
    assert_eq!(user.balance, Decimal::ZERO);
    assert_eq!(user.phone_number, "+1 555-0100");
    assert_eq!(user.language, Language::En);
    assert!(store.transactions().is_empty());
    assert!(store.cards().is_empty());

    assert!(kv.contains("account:15550100").unwrap());
    assert!(kv.contains(SESSION_KEY).unwrap());
}

#[test]
fn test_formatting_variants_resolve_to_same_account() {
    let kv = Arc::new(MemoryStore::new());
    let mut store = create_store(&kv);

    store.login("+1 555-0100", None).unwrap();
    store.update_balance(Decimal::new(10000, 2)).unwrap();
    store.logout().unwrap();

    let outcome = store.login("1 (555) 0100", None).unwrap();
    assert_eq!(outcome, LoginOutcome::Resumed);
    assert_eq!(store.user().unwrap().balance, Decimal::new(10000, 2));
    assert_eq!(kv.keys_with_prefix("account:").unwrap().len(), 1);
}

#[test]
fn test_login_language_applies_to_existing_account() {
    let kv = Arc::new(MemoryStore::new());
    let mut store = create_store(&kv);

    store.login("5550100", None).unwrap();
    store.logout().unwrap();
    store.login("5550100", Some(Language::Ar)).unwrap();

    assert_eq!(store.user().unwrap().language, Language::Ar);
    let record = stored_json(&kv, "account:5550100");
    assert_eq!(record["language"], "ar");
}

#[test]
fn test_legacy_record_is_upgraded_and_persisted_on_login() {
    let kv = Arc::new(MemoryStore::new());
    let legacy = json!({
        "name": "Amir Hassan",
        "email": "amir.hassan@example.com",
        "phoneNumber": "+1 555-0100",
        "kycVerified": true,
        "biometricEnabled": false,
        "balance": "250.00",
        "currency": "USD"
    });
    kv.set("account:15550100", &legacy.to_string()).unwrap();

    let mut store = create_store(&kv);
    assert_eq!(store.login("15550100", None).unwrap(), LoginOutcome::Resumed);

    let user = store.user().unwrap();
    assert_eq!(user.name, "Amir Hassan");
    assert_eq!(user.balance, Decimal::new(25000, 2));
    assert_eq!(user.country, "Saudi Arabia");

    let record = stored_json(&kv, "account:15550100");
    assert_eq!(record["schemaVersion"], PROFILE_SCHEMA_VERSION);
    assert_eq!(record["city"], "");
}

#[test]
fn test_corrupt_account_record_is_replaced() {
    let kv = Arc::new(MemoryStore::new());
    kv.set("account:5550100", "{not json").unwrap();

    let mut store = create_store(&kv);
    assert_eq!(store.login("5550100", None).unwrap(), LoginOutcome::Created);
    assert_eq!(store.user().unwrap().balance, Decimal::ZERO);
    assert_eq!(stored_json(&kv, "account:5550100")["phoneNumber"], "5550100");
}

// ============================================================================
// Session Restore
// ============================================================================

#[test]
fn test_restore_resumes_previous_session() {
    let kv = Arc::new(MemoryStore::new());
    {
        let mut store = create_store(&kv);
        store.login("5550100", None).unwrap();
        store.update_balance(Decimal::new(4200, 2)).unwrap();
        store.add_virtual_card(CardNetwork::Visa, CardColor::Silver).unwrap();
    }

    let mut store = create_store(&kv);
    assert_eq!(store.restore().unwrap(), RestoreOutcome::Resumed);
    assert_eq!(store.user().unwrap().balance, Decimal::new(4200, 2));
    assert_eq!(store.cards().len(), 1);
}

#[test]
fn test_restore_without_session() {
    let kv = Arc::new(MemoryStore::new());
    let mut store = create_store(&kv);
    assert_eq!(store.restore().unwrap(), RestoreOutcome::NoSession);
    assert!(!store.is_logged_in());
}

#[test]
fn test_restore_discards_corrupt_session() {
    let kv = Arc::new(MemoryStore::new());
    kv.set(SESSION_KEY, "[1, 2, 3]").unwrap();

    let mut store = create_store(&kv);
    let outcome = store.restore().unwrap();
    assert!(matches!(outcome, RestoreOutcome::Discarded { .. }));
    assert!(!store.is_logged_in());
    assert!(!kv.contains(SESSION_KEY).unwrap());
}

// ============================================================================
// Balance
// ============================================================================

#[test]
fn test_balance_deltas_are_additive() {
    let kv_a = Arc::new(MemoryStore::new());
    let mut a = create_store(&kv_a);
    a.login("5550100", None).unwrap();
    a.update_balance(Decimal::new(12345, 2)).unwrap();
    a.update_balance(Decimal::new(-2345, 2)).unwrap();

    let kv_b = Arc::new(MemoryStore::new());
    let mut b = create_store(&kv_b);
    b.login("5550100", None).unwrap();
    b.update_balance(Decimal::new(10000, 2)).unwrap();

    assert_eq!(a.user().unwrap().balance, b.user().unwrap().balance);
}

#[test]
fn test_debit_persists_under_same_key() {
    let kv = Arc::new(MemoryStore::new());
    let mut store = create_store(&kv);
    store.login("+1 555-0100", None).unwrap();
    store.update_balance(Decimal::new(10000, 2)).unwrap();

    let balance = store.update_balance(Decimal::new(-50, 0)).unwrap();
    assert_eq!(balance, Some(Decimal::new(5000, 2)));

    let record = stored_json(&kv, "account:15550100");
    let persisted: Decimal = serde_json::from_value(record["balance"].clone()).unwrap();
    assert_eq!(persisted, Decimal::new(5000, 2));
    assert_eq!(kv.keys_with_prefix("account:").unwrap().len(), 1);
}

#[test]
fn test_balance_may_go_negative() {
    let kv = Arc::new(MemoryStore::new());
    let mut store = create_store(&kv);
    store.login("5550100", None).unwrap();

    let balance = store.update_balance(Decimal::new(-1000, 2)).unwrap();
    assert_eq!(balance, Some(Decimal::new(-1000, 2)));
    assert_eq!(store.user().unwrap().zakat_due(), Decimal::ZERO);
}

// ============================================================================
// Profile Updates
// ============================================================================

#[test]
fn test_empty_update_rewrites_unchanged_record() {
    let kv = Arc::new(MemoryStore::new());
    let mut store = create_store(&kv);
    store.login("5550100", None).unwrap();
    let before = store.user().unwrap().clone();

    kv.remove("account:5550100").unwrap();
    assert!(store.update_user(&ProfileUpdate::default()).unwrap());

    assert_eq!(store.user().unwrap(), &before);
    assert!(kv.contains("account:5550100").unwrap());
}

#[test]
fn test_update_merges_only_present_fields() {
    let kv = Arc::new(MemoryStore::new());
    let mut store = create_store(&kv);
    store.login("5550100", None).unwrap();

    let update = ProfileUpdate {
        city: Some("Riyadh".to_string()),
        email: Some("sara@example.com".to_string()),
        ..Default::default()
    };
    store.update_user(&update).unwrap();

    let user = store.user().unwrap();
    assert_eq!(user.city, "Riyadh");
    assert_eq!(user.email, "sara@example.com");
    assert_eq!(user.country, "Saudi Arabia");
    assert_eq!(stored_json(&kv, "account:5550100")["city"], "Riyadh");
}

#[test]
fn test_phone_change_moves_account_and_cards() {
    let kv = Arc::new(MemoryStore::new());
    let mut store = create_store(&kv);
    store.login("5550100", None).unwrap();
    store.update_balance(Decimal::new(700, 0)).unwrap();
    let card = store
        .add_virtual_card(CardNetwork::Mastercard, CardColor::Gold)
        .unwrap()
        .unwrap();

    let update = ProfileUpdate {
        phone_number: Some("+966 50 000 0001".to_string()),
        ..Default::default()
    };
    store.update_user(&update).unwrap();

    let new_key = AccountKey::from_phone("+966 50 000 0001");
    assert!(kv.contains(&new_key.profile_key()).unwrap());
    assert!(kv.contains(&new_key.cards_key()).unwrap());
    assert!(!kv.contains("account:5550100").unwrap());
    assert!(!kv.contains("cards:5550100").unwrap());

    store.logout().unwrap();
    assert_eq!(
        store.login("966500000001", None).unwrap(),
        LoginOutcome::Resumed
    );
    assert_eq!(store.user().unwrap().balance, Decimal::new(700, 0));
    assert_eq!(store.cards()[0].id, card.id);
}

#[test]
fn test_phone_change_onto_existing_account_is_rejected() {
    let kv = Arc::new(MemoryStore::new());
    let mut store = create_store(&kv);
    store.login("2220000", None).unwrap();
    store
        .add_virtual_card(CardNetwork::Visa, CardColor::Silver)
        .unwrap()
        .unwrap();
    store.logout().unwrap();
    let existing = kv.get("account:2220000").unwrap();

    store.login("1110000", None).unwrap();
    let update = ProfileUpdate {
        phone_number: Some("222-0000".to_string()),
        ..Default::default()
    };
    let err = store.update_user(&update).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    assert_eq!(kv.get("account:2220000").unwrap(), existing);
    assert_eq!(stored_json(&kv, "cards:2220000").as_array().unwrap().len(), 1);
    assert!(kv.contains("account:1110000").unwrap());
    assert_eq!(store.user().unwrap().phone_number, "1110000");
}

#[test]
fn test_phone_change_without_cards_writes_empty_list() {
    let kv = Arc::new(MemoryStore::new());
    let mut store = create_store(&kv);
    store.login("5550100", None).unwrap();
    // Stale list left behind under the target key
    kv.set("cards:5550199", r#"[{"stale":true}]"#).unwrap();

    let update = ProfileUpdate {
        phone_number: Some("5550199".to_string()),
        ..Default::default()
    };
    assert!(store.update_user(&update).unwrap());

    assert_eq!(stored_json(&kv, "cards:5550199"), json!([]));
    assert!(!kv.contains("account:5550100").unwrap());
}

// ============================================================================
// Virtual Cards
// ============================================================================

#[test]
fn test_card_id_generation_gives_up_on_repeated_collisions() {
    let kv = Arc::new(MemoryStore::new());
    // A constant source yields the same id on every draw
    let mut store = AccountStore::new(kv.clone(), Box::new(StepRng::new(0, 0)), false);
    store.login("5550100", None).unwrap();

    assert!(store
        .add_virtual_card(CardNetwork::Visa, CardColor::Black)
        .unwrap()
        .is_some());
    let err = store
        .add_virtual_card(CardNetwork::Visa, CardColor::Black)
        .unwrap_err();
    assert!(matches!(err, Error::Storage(_)));
    assert_eq!(store.cards().len(), 1);
}

#[test]
fn test_card_numbers_follow_network() {
    let kv = Arc::new(MemoryStore::new());
    let mut store = create_store(&kv);
    store.login("5550100", None).unwrap();

    let visa = store
        .add_virtual_card(CardNetwork::Visa, CardColor::Black)
        .unwrap()
        .unwrap();
    let mastercard = store
        .add_virtual_card(CardNetwork::Mastercard, CardColor::Gold)
        .unwrap()
        .unwrap();

    assert!(visa.card_number.starts_with('4'));
    assert!(mastercard.card_number.starts_with('5'));
    assert_eq!(visa.card_number.len(), 16);
    assert_eq!(visa.cvv.len(), 3);
    assert_eq!(visa.status, CardStatus::Active);
    assert_ne!(visa.id, mastercard.id);
}

#[test]
fn test_seeded_rng_reproduces_cards() {
    let issue = |seed: u64| {
        let kv = Arc::new(MemoryStore::new());
        let mut store = create_store_with_seed(&kv, seed);
        store.login("5550100", None).unwrap();
        store
            .add_virtual_card(CardNetwork::Visa, CardColor::Black)
            .unwrap()
            .unwrap()
    };

    let a = issue(99);
    let b = issue(99);
    assert_eq!(a.id, b.id);
    assert_eq!(a.card_number, b.card_number);
    assert_eq!(a.cvv, b.cvv);
    assert_eq!(a.expiry, b.expiry);
}

#[test]
fn test_card_ids_are_unique_within_session() {
    let kv = Arc::new(MemoryStore::new());
    let mut store = create_store(&kv);
    store.login("5550100", None).unwrap();

    for _ in 0..20 {
        store.add_virtual_card(CardNetwork::Visa, CardColor::Silver).unwrap();
    }
    let mut ids: Vec<_> = store.cards().iter().map(|c| c.id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 20);
}

#[test]
fn test_second_remove_is_noop() {
    let kv = Arc::new(MemoryStore::new());
    let mut store = create_store(&kv);
    store.login("5550100", None).unwrap();
    let card = store
        .add_virtual_card(CardNetwork::Visa, CardColor::Black)
        .unwrap()
        .unwrap();

    assert!(store.remove_virtual_card(card.id).unwrap());
    assert!(!store.remove_virtual_card(card.id).unwrap());
    assert!(store.cards().is_empty());
    assert_eq!(stored_json(&kv, "cards:5550100"), json!([]));
}

#[test]
fn test_toggle_twice_restores_status() {
    let kv = Arc::new(MemoryStore::new());
    let mut store = create_store(&kv);
    store.login("5550100", None).unwrap();
    let card = store
        .add_virtual_card(CardNetwork::Visa, CardColor::Black)
        .unwrap()
        .unwrap();

    assert_eq!(
        store.toggle_card_status(card.id).unwrap(),
        Some(CardStatus::Frozen)
    );
    assert_eq!(
        store.toggle_card_status(card.id).unwrap(),
        Some(CardStatus::Active)
    );

    let stored = store.card(card.id).unwrap();
    assert_eq!(stored.card_number, card.card_number);
    assert_eq!(stored.cvv, card.cvv);
}

#[test]
fn test_cards_follow_normalized_phone() {
    let kv = Arc::new(MemoryStore::new());
    let mut store = create_store(&kv);
    store.login("+1 555-0100", None).unwrap();
    store.add_virtual_card(CardNetwork::Visa, CardColor::Black).unwrap();
    store.logout().unwrap();

    store.login("1 (555) 0100", None).unwrap();
    assert_eq!(store.cards().len(), 1);
    assert!(kv.contains("cards:15550100").unwrap());
}

// ============================================================================
// Demo Mode
// ============================================================================

#[test]
fn test_demo_mode_seeds_new_accounts() {
    let kv = Arc::new(MemoryStore::new());
    let mut store = AccountStore::new(kv.clone(), Box::new(StdRng::seed_from_u64(1)), true);

    assert_eq!(store.login("5550100", None).unwrap(), LoginOutcome::Created);
    let user = store.user().unwrap();
    assert_eq!(user.name, "Amir Hassan");
    assert_eq!(user.balance, Decimal::new(2450000, 2));
    assert_eq!(store.transactions().len(), 4);
}
