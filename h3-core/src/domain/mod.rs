//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation and derivation logic - no I/O.

mod card;
mod chat;
pub mod phone;
pub mod result;
pub mod schema;
mod transaction;
mod user;

pub use card::{
    CardColor, CardExpiry, CardNetwork, CardStatus, VirtualCard, CARD_NUMBER_LENGTH,
    MAX_EXPIRY_YEARS,
};
pub use chat::{ChatMessage, ChatRole};
pub use phone::AccountKey;
pub use transaction::{format_date, next_id, Transaction, TransactionStatus, TransactionType};
pub use user::{Language, ProfileUpdate, Title, UserProfile, ZAKAT_RATE};
