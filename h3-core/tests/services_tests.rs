//! End-to-end service flows through `H3Context`
//!
//! Storage is in memory and latency is disabled; the verifier and
//! assistant are mocked at the trait level.
//!
//! Run with: cargo test --test services_tests

use std::sync::Arc;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;

use h3_core::adapters::delay::NoDelay;
use h3_core::adapters::memory::MemoryStore;
use h3_core::adapters::mock_identity::{MockIdentityVerifier, MOCK_SMS_CODE};
use h3_core::config::Config;
use h3_core::ports::{IdentityVerifier, KeyValueStore, SmsChallenge, SupportAssistant};
use h3_core::services::{
    CheckStatus, LoginChallenge, LoginOutcome, ProfileForm, ReplySource, RestoreOutcome,
};
use h3_core::{
    CardColor, CardNetwork, CardStatus, ChatMessage, Error, H3Context, Language, TransactionType,
};

// ============================================================================
// Test Helpers
// ============================================================================

/// Verifier that knows no users and never verifies an email
struct EmptyDirectory;

#[async_trait]
impl IdentityVerifier for EmptyDirectory {
    fn name(&self) -> &str {
        "empty"
    }

    async fn check_user_exists(&self, _phone: &str) -> h3_core::domain::result::Result<bool> {
        Ok(false)
    }

    async fn sign_in_with_phone_number(
        &self,
        _phone: &str,
    ) -> h3_core::domain::result::Result<SmsChallenge> {
        Err(Error::verification("unreachable"))
    }

    async fn verify_sms_code(&self, _id: &str, _code: &str) -> h3_core::domain::result::Result<bool> {
        Ok(false)
    }

    async fn send_email_verification(&self, _email: &str) -> h3_core::domain::result::Result<()> {
        Ok(())
    }

    async fn check_email_verified(&self, _email: &str) -> h3_core::domain::result::Result<bool> {
        Ok(false)
    }
}

/// Assistant that always fails
struct Offline;

#[async_trait]
impl SupportAssistant for Offline {
    fn name(&self) -> &str {
        "offline"
    }

    async fn generate_support_response(
        &self,
        _message: &str,
        _history: &[ChatMessage],
    ) -> h3_core::domain::result::Result<Option<String>> {
        Err(Error::Assistant("connection refused".to_string()))
    }
}

/// Assistant that echoes the message and counts the history it saw
struct Echo;

#[async_trait]
impl SupportAssistant for Echo {
    fn name(&self) -> &str {
        "echo"
    }

    async fn generate_support_response(
        &self,
        message: &str,
        history: &[ChatMessage],
    ) -> h3_core::domain::result::Result<Option<String>> {
        Ok(Some(format!("{} ({})", message, history.len())))
    }
}

fn context_with(
    kv: Arc<MemoryStore>,
    verifier: Arc<dyn IdentityVerifier>,
    assistant: Option<Arc<dyn SupportAssistant>>,
    demo_mode: bool,
) -> H3Context {
    let mut config = Config::default();
    config.demo_mode = demo_mode;
    H3Context::with_components(
        config,
        kv,
        Box::new(StdRng::seed_from_u64(3)),
        verifier,
        assistant,
        Arc::new(NoDelay),
    )
    .unwrap()
}

fn create_context() -> H3Context {
    context_with(
        Arc::new(MemoryStore::new()),
        Arc::new(MockIdentityVerifier::new()),
        None,
        false,
    )
}

async fn login(ctx: &mut H3Context, phone: &str) -> LoginOutcome {
    let challenge = ctx.auth_service.request_login_code(phone).await.unwrap();
    ctx.auth_service
        .confirm_login(&mut ctx.store, &challenge, MOCK_SMS_CODE, None)
        .await
        .unwrap()
}

/// Logged-in context holding `balance`
async fn funded_context(balance: Decimal) -> H3Context {
    let mut ctx = create_context();
    login(&mut ctx, "+1 555-0100").await;
    ctx.store.update_balance(balance).unwrap();
    ctx
}

fn signup_form() -> ProfileForm {
    ProfileForm {
        first_name: "Layla".to_string(),
        last_name: "Karim".to_string(),
        address: "12 Olaya St".to_string(),
        city: "Riyadh".to_string(),
        region: "Riyadh Province".to_string(),
        postcode: "12211".to_string(),
        bank_name: "H3".to_string(),
        iban: "SA0380000000608010167519".to_string(),
        email: "layla@example.com".to_string(),
        mobile_number: "+966 50 123 4567".to_string(),
        ..ProfileForm::default()
    }
}

// ============================================================================
// Auth Flows
// ============================================================================

#[tokio::test]
async fn test_login_with_mock_code() {
    let mut ctx = create_context();
    assert_eq!(ctx.restore_outcome, RestoreOutcome::NoSession);

    assert_eq!(login(&mut ctx, "+1 555-0100").await, LoginOutcome::Created);
    assert!(ctx.store.is_logged_in());

    ctx.store.logout().unwrap();
    assert_eq!(login(&mut ctx, "1 (555) 0100").await, LoginOutcome::Resumed);
}

#[tokio::test]
async fn test_short_phone_is_rejected() {
    let ctx = create_context();
    let err = ctx.auth_service.request_login_code("12345").await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn test_wrong_code_does_not_log_in() {
    let mut ctx = create_context();
    let challenge = ctx
        .auth_service
        .request_login_code("+1 555-0100")
        .await
        .unwrap();

    let err = ctx
        .auth_service
        .confirm_login(&mut ctx.store, &challenge, "654321", None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Verification(_)));

    let err = ctx
        .auth_service
        .confirm_login(&mut ctx.store, &challenge, "123", None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(!ctx.store.is_logged_in());
}

#[tokio::test]
async fn test_forged_challenge_is_rejected() {
    let mut ctx = create_context();
    let challenge = LoginChallenge {
        phone: "+1 555-0100".to_string(),
        verification_id: "forged".to_string(),
    };
    let result = ctx
        .auth_service
        .confirm_login(&mut ctx.store, &challenge, MOCK_SMS_CODE, None)
        .await;
    assert!(result.is_err());
    assert!(!ctx.store.is_logged_in());
}

#[tokio::test]
async fn test_unknown_user_gets_not_found() {
    let ctx = context_with(
        Arc::new(MemoryStore::new()),
        Arc::new(EmptyDirectory),
        None,
        false,
    );
    let err = ctx
        .auth_service
        .request_login_code("+1 555-0100")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_signup_completes_profile() {
    let mut ctx = create_context();
    ctx.auth_service.start_signup("layla@example.com").await.unwrap();

    let outcome = ctx
        .auth_service
        .complete_profile(&mut ctx.store, &signup_form(), Some(Language::Ar))
        .await
        .unwrap();
    assert_eq!(outcome, LoginOutcome::Created);

    let user = ctx.store.user().unwrap();
    assert_eq!(user.name, "Layla Karim");
    assert_eq!(user.phone_number, "+966 50 123 4567");
    assert_eq!(user.language, Language::Ar);
    assert!(user.kyc_verified);
    assert!(ctx.store.account_exists("966501234567").unwrap());
}

#[tokio::test]
async fn test_signup_requires_email_and_fields() {
    let mut ctx = create_context();
    assert!(ctx.auth_service.start_signup("not-an-email").await.is_err());

    let mut form = signup_form();
    form.city = String::new();
    let err = ctx
        .auth_service
        .complete_profile(&mut ctx.store, &form, None)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("All fields are mandatory."));
    assert!(!ctx.store.is_logged_in());
}

#[tokio::test]
async fn test_unverified_email_blocks_signup() {
    let mut ctx = context_with(
        Arc::new(MemoryStore::new()),
        Arc::new(EmptyDirectory),
        None,
        false,
    );
    let err = ctx
        .auth_service
        .complete_profile(&mut ctx.store, &signup_form(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Verification(_)));
    assert!(!ctx.store.is_logged_in());
}

// ============================================================================
// Transfers and Zakat
// ============================================================================

#[tokio::test]
async fn test_transfer_debits_and_records() {
    let mut ctx = funded_context(Decimal::new(10000, 2)).await;

    let tx = ctx
        .transfer_service
        .transfer(&mut ctx.store, "Sara", Decimal::new(2550, 2))
        .await
        .unwrap();

    assert_eq!(tx.tx_type, TransactionType::Transfer);
    assert_eq!(tx.amount, Decimal::new(-2550, 2));
    assert_eq!(ctx.store.user().unwrap().balance, Decimal::new(7450, 2));
    assert_eq!(ctx.store.transactions()[0].id, tx.id);
}

#[tokio::test]
async fn test_rejected_transfer_leaves_store_untouched() {
    let mut ctx = funded_context(Decimal::new(10000, 2)).await;

    for (recipient, amount) in [
        ("Sara", Decimal::new(10001, 2)),
        ("Sara", Decimal::ZERO),
        ("Sara", Decimal::new(-5, 0)),
        ("  ", Decimal::ONE),
    ] {
        let err = ctx
            .transfer_service
            .transfer(&mut ctx.store, recipient, amount)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    assert_eq!(ctx.store.user().unwrap().balance, Decimal::new(10000, 2));
    assert!(ctx.store.transactions().is_empty());
}

#[tokio::test]
async fn test_transfer_of_whole_balance() {
    let mut ctx = funded_context(Decimal::new(10000, 2)).await;
    ctx.transfer_service
        .transfer(&mut ctx.store, "Sara", Decimal::new(100, 0))
        .await
        .unwrap();
    assert_eq!(ctx.store.user().unwrap().balance, Decimal::ZERO);
}

#[tokio::test]
async fn test_transfer_requires_session() {
    let mut ctx = create_context();
    let err = ctx
        .transfer_service
        .transfer(&mut ctx.store, "Sara", Decimal::ONE)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NoActiveSession));
}

#[tokio::test]
async fn test_pay_zakat() {
    let mut ctx = funded_context(Decimal::new(2450000, 2)).await;
    assert_eq!(ctx.store.user().unwrap().zakat_due(), Decimal::new(61250, 2));

    let tx = ctx
        .transfer_service
        .pay_zakat(&mut ctx.store, "Global Relief Fund")
        .await
        .unwrap();

    assert_eq!(tx.tx_type, TransactionType::Zakat);
    assert_eq!(tx.amount, Decimal::new(-61250, 2));
    assert_eq!(ctx.store.user().unwrap().balance, Decimal::new(2388750, 2));
}

#[tokio::test]
async fn test_no_zakat_on_empty_balance() {
    let mut ctx = funded_context(Decimal::ZERO).await;
    let err = ctx
        .transfer_service
        .pay_zakat(&mut ctx.store, "Global Relief Fund")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

// ============================================================================
// Cards
// ============================================================================

#[tokio::test]
async fn test_card_lifecycle() {
    let mut ctx = funded_context(Decimal::ZERO).await;

    let card = ctx
        .card_service
        .issue(&mut ctx.store, CardNetwork::Mastercard, CardColor::Gold)
        .await
        .unwrap();
    assert!(card.card_number.starts_with('5'));

    let prefix: String = card.id.to_string().chars().take(8).collect();
    let found = ctx.card_service.find(&ctx.store, &prefix).unwrap().id;
    assert_eq!(found, card.id);

    assert_eq!(
        ctx.card_service.toggle(&mut ctx.store, card.id).unwrap(),
        CardStatus::Frozen
    );
    ctx.card_service.remove(&mut ctx.store, card.id).unwrap();
    assert!(matches!(
        ctx.card_service.remove(&mut ctx.store, card.id),
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn test_issue_requires_session() {
    let mut ctx = create_context();
    let result = ctx
        .card_service
        .issue(&mut ctx.store, CardNetwork::Visa, CardColor::Black)
        .await;
    assert!(matches!(result, Err(Error::NoActiveSession)));
}

#[tokio::test]
async fn test_find_unknown_card() {
    let ctx = funded_context(Decimal::ZERO).await;
    assert!(matches!(
        ctx.card_service.find(&ctx.store, "ffffffff"),
        Err(Error::NotFound(_))
    ));
    assert!(ctx.card_service.find(&ctx.store, "  ").is_err());
}

// ============================================================================
// Support Chat
// ============================================================================

#[tokio::test]
async fn test_chat_falls_back_when_assistant_fails() {
    let mut ctx = context_with(
        Arc::new(MemoryStore::new()),
        Arc::new(MockIdentityVerifier::new()),
        Some(Arc::new(Offline) as Arc<dyn SupportAssistant>),
        false,
    );

    let (reply, source) = ctx.support_service.send("hello").await.unwrap();
    assert_eq!(source, ReplySource::ErrorFallback);
    assert!(!reply.text.is_empty());
    assert!(ctx.support_service.last_error().is_some());
    assert_eq!(ctx.support_service.messages().len(), 3);
}

#[tokio::test]
async fn test_chat_passes_history() {
    let mut ctx = context_with(
        Arc::new(MemoryStore::new()),
        Arc::new(MockIdentityVerifier::new()),
        Some(Arc::new(Echo) as Arc<dyn SupportAssistant>),
        false,
    );

    let (reply, _) = ctx.support_service.send("first").await.unwrap();
    assert_eq!(reply.text, "first (1)");
    let (reply, source) = ctx.support_service.send("second").await.unwrap();
    assert_eq!(reply.text, "second (3)");
    assert_eq!(source, ReplySource::Assistant);
    assert_eq!(ctx.support_service.exchange_count(), 2);

    assert!(ctx.support_service.send("   ").await.is_none());
}

// ============================================================================
// Context Restore, Status and Doctor
// ============================================================================

#[tokio::test]
async fn test_context_restores_session() {
    let kv = Arc::new(MemoryStore::new());
    {
        let mut ctx = context_with(
            kv.clone(),
            Arc::new(MockIdentityVerifier::new()),
            None,
            false,
        );
        login(&mut ctx, "+1 555-0100").await;
        ctx.store.update_balance(Decimal::new(1000, 0)).unwrap();
    }

    let ctx = context_with(kv, Arc::new(MockIdentityVerifier::new()), None, false);
    assert_eq!(ctx.restore_outcome, RestoreOutcome::Resumed);

    let status = ctx.status_service.summary(&ctx.store);
    let user = status.user.unwrap();
    assert!(status.logged_in);
    assert_eq!(user.balance, Decimal::new(1000, 0));
    assert_eq!(user.zakat_due, Decimal::new(2500, 2));
    assert!(!user.masked_phone.contains("555"));
}

#[tokio::test]
async fn test_demo_context_seeds_account() {
    let mut ctx = context_with(
        Arc::new(MemoryStore::new()),
        Arc::new(MockIdentityVerifier::new()),
        None,
        true,
    );
    assert_eq!(login(&mut ctx, "+1 555-0100").await, LoginOutcome::Created);

    let status = ctx.status_service.summary(&ctx.store);
    assert!(status.demo_mode);
    assert_eq!(status.user.unwrap().transaction_count, 4);
}

#[tokio::test]
async fn test_doctor_reports_orphaned_cards() {
    let kv = Arc::new(MemoryStore::new());
    let mut ctx = context_with(
        kv.clone(),
        Arc::new(MockIdentityVerifier::new()),
        None,
        false,
    );
    login(&mut ctx, "+1 555-0100").await;
    ctx.card_service
        .issue(&mut ctx.store, CardNetwork::Visa, CardColor::Black)
        .await
        .unwrap();

    let result = ctx.doctor_service.run_checks().unwrap();
    assert_eq!(result.summary.errors, 0);
    assert_eq!(result.summary.warnings, 0);

    kv.remove("account:15550100").unwrap();
    let result = ctx.doctor_service.run_checks().unwrap();
    assert_eq!(result.checks["card_lists"].status, CheckStatus::Warning);
    assert_eq!(result.checks["session"].status, CheckStatus::Warning);
}
