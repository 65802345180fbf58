//! Transfer service - outgoing transfers and zakat payments

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::domain::result::{Error, Result};
use crate::domain::Transaction;
use crate::ports::{Delay, SimulatedOp};
use crate::services::account_store::AccountStore;

pub struct TransferService {
    delay: Arc<dyn Delay>,
}

impl TransferService {
    pub fn new(delay: Arc<dyn Delay>) -> Self {
        Self { delay }
    }

    /// Send `amount` to `recipient`
    ///
    /// Validation happens before the confirmation delay; a rejected
    /// transfer leaves the store untouched.
    pub async fn transfer(
        &self,
        store: &mut AccountStore,
        recipient: &str,
        amount: Decimal,
    ) -> Result<Transaction> {
        let recipient = recipient.trim();
        let balance = store.user().ok_or(Error::NoActiveSession)?.balance;

        if recipient.is_empty() {
            return Err(Error::validation("Recipient is required"));
        }
        if amount <= Decimal::ZERO {
            return Err(Error::validation("Amount must be greater than zero"));
        }
        if amount > balance {
            return Err(Error::validation("Insufficient funds"));
        }

        self.delay.wait(SimulatedOp::Transfer).await;
        Self::debit(store, Transaction::transfer(recipient, amount))
    }

    /// Pay the zakat currently due on the balance to `recipient`
    pub async fn pay_zakat(&self, store: &mut AccountStore, recipient: &str) -> Result<Transaction> {
        let recipient = recipient.trim();
        let due = store.user().ok_or(Error::NoActiveSession)?.zakat_due();

        if recipient.is_empty() {
            return Err(Error::validation("Recipient is required"));
        }
        if due <= Decimal::ZERO {
            return Err(Error::validation("No zakat is due on the current balance"));
        }

        self.delay.wait(SimulatedOp::Transfer).await;
        Self::debit(store, Transaction::zakat(recipient, due))
    }

    /// Record an outflow and apply it to the balance
    fn debit(store: &mut AccountStore, tx: Transaction) -> Result<Transaction> {
        store.add_transaction(tx.clone());
        store
            .update_balance(tx.amount)?
            .ok_or(Error::NoActiveSession)?;
        Ok(tx)
    }
}
