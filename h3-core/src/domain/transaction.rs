//! Transaction domain model

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Counter for ids generated within the same millisecond
static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Kind of money movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Deposit,
    Transfer,
    Payment,
    Zakat,
    Receive,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionType::Deposit => "DEPOSIT",
            TransactionType::Transfer => "TRANSFER",
            TransactionType::Payment => "PAYMENT",
            TransactionType::Zakat => "ZAKAT",
            TransactionType::Receive => "RECEIVE",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Completed => "COMPLETED",
            TransactionStatus::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// A single money movement on the active account
///
/// Amounts are signed: negative is an outflow, positive an inflow.
/// `date` is a display string and is not guaranteed to sort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    pub date: String,
    pub status: TransactionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Transaction {
    /// Create a completed transaction dated today with a fresh id
    pub fn new(tx_type: TransactionType, amount: Decimal) -> Self {
        Self {
            id: next_id(),
            tx_type,
            amount,
            recipient: None,
            sender: None,
            date: format_date(Local::now().date_naive()),
            status: TransactionStatus::Completed,
            description: None,
        }
    }

    /// Outgoing transfer to a named recipient
    pub fn transfer(recipient: impl Into<String>, amount: Decimal) -> Self {
        let recipient = recipient.into();
        Self {
            description: Some(format!("Transfer to {}", recipient)),
            recipient: Some(recipient),
            ..Self::new(TransactionType::Transfer, -amount.abs())
        }
    }

    /// Zakat payment to a named recipient
    pub fn zakat(recipient: impl Into<String>, amount: Decimal) -> Self {
        Self {
            recipient: Some(recipient.into()),
            description: Some("Zakat".to_string()),
            ..Self::new(TransactionType::Zakat, -amount.abs())
        }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_outflow(&self) -> bool {
        self.amount.is_sign_negative()
    }

    /// Counterparty label: recipient for outflows, sender for inflows
    pub fn counterparty(&self) -> Option<&str> {
        if self.is_outflow() {
            self.recipient.as_deref()
        } else {
            self.sender.as_deref()
        }
    }
}

/// Generate a transaction id whose numeric order follows creation order
///
/// Lower 16 bits count within a millisecond, the rest hold the
/// timestamp.
pub fn next_id() -> String {
    let timestamp = chrono::Utc::now().timestamp_millis().max(0) as u64;
    let counter = ID_COUNTER.fetch_add(1, Ordering::Relaxed) & 0xFFFF;
    ((timestamp << 16) | counter).to_string()
}

/// Display format for transaction dates
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
