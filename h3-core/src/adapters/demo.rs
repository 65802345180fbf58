//! Demo seed data
//!
//! Demo mode gives every first login a filled-in placeholder identity and
//! a short transaction history, so the dashboard has something to show
//! without any real onboarding.

use rust_decimal::Decimal;

use crate::domain::{Language, Transaction, TransactionStatus, TransactionType, UserProfile};

pub const DEMO_NAME: &str = "Amir Hassan";
pub const DEMO_FIRST_NAME: &str = "Amir";
pub const DEMO_LAST_NAME: &str = "Hassan";
pub const DEMO_EMAIL: &str = "amir.hassan@example.com";

/// Opening balance for demo accounts ($24,500.00)
pub fn demo_balance() -> Decimal {
    Decimal::new(2450000, 2)
}

/// Placeholder profile for a first demo login on `phone_number`
pub fn demo_profile(phone_number: &str, language: Language) -> UserProfile {
    let mut profile = UserProfile::new(phone_number, language);
    profile.first_name = DEMO_FIRST_NAME.to_string();
    profile.last_name = DEMO_LAST_NAME.to_string();
    profile.name = DEMO_NAME.to_string();
    profile.email = DEMO_EMAIL.to_string();
    profile.kyc_verified = true;
    profile.biometric_enabled = true;
    profile.balance = demo_balance();
    profile
}

fn seed(
    id: &str,
    tx_type: TransactionType,
    amount: Decimal,
    date: &str,
    counterparty: &str,
    description: &str,
) -> Transaction {
    let mut tx = Transaction::new(tx_type, amount)
        .with_date(date)
        .with_status(TransactionStatus::Completed);
    tx.id = id.to_string();
    if amount.is_sign_negative() {
        tx.recipient = Some(counterparty.to_string());
    } else {
        tx.sender = Some(counterparty.to_string());
    }
    tx.description = Some(description.to_string());
    tx
}

/// Seed history shown after every demo login, newest first
pub fn demo_transactions() -> Vec<Transaction> {
    vec![
        seed(
            "1",
            TransactionType::Payment,
            Decimal::new(-1250, 2),
            "2023-10-25",
            "Downtown Cafe",
            "Coffee & Snacks",
        ),
        seed(
            "2",
            TransactionType::Deposit,
            Decimal::new(450000, 2),
            "2023-10-24",
            "Tech Solutions LLC",
            "Monthly Salary",
        ),
        seed(
            "3",
            TransactionType::Transfer,
            Decimal::new(-20000, 2),
            "2023-10-22",
            "Family Support",
            "Transfer to Mother",
        ),
        seed(
            "4",
            TransactionType::Zakat,
            Decimal::new(-120000, 2),
            "2023-09-01",
            "Global Relief Fund",
            "Annual Zakat",
        ),
    ]
}
