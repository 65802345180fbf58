//! Status service - dashboard summary of the active session

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{CardStatus, Language};
use crate::services::account_store::AccountStore;

/// Status service for the dashboard summary
#[derive(Debug, Default)]
pub struct StatusService;

impl StatusService {
    pub fn new() -> Self {
        Self
    }

    /// Summarize the session. Phone numbers are masked.
    pub fn summary(&self, store: &AccountStore) -> StatusSummary {
        let user = store.user().map(|user| {
            let frozen = store
                .cards()
                .iter()
                .filter(|c| c.status == CardStatus::Frozen)
                .count();
            UserSummary {
                name: user.name.clone(),
                masked_phone: user.account_key().masked(),
                balance: user.balance,
                currency: user.currency.clone(),
                zakat_due: user.zakat_due(),
                kyc_verified: user.kyc_verified,
                language: user.language,
                transaction_count: store.transactions().len(),
                cards: CardCounts {
                    active: store.cards().len() - frozen,
                    frozen,
                },
            }
        });

        StatusSummary {
            logged_in: user.is_some(),
            demo_mode: store.demo_mode(),
            user,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub logged_in: bool,
    pub demo_mode: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub name: String,
    pub masked_phone: String,
    pub balance: Decimal,
    pub currency: String,
    pub zakat_due: Decimal,
    pub kyc_verified: bool,
    pub language: Language,
    pub transaction_count: usize,
    pub cards: CardCounts,
}

#[derive(Debug, Serialize)]
pub struct CardCounts {
    pub active: usize,
    pub frozen: usize,
}
