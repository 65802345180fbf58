//! Virtual card domain model

use std::fmt;
use std::str::FromStr;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::result::Error;

/// Digits in a generated card number, network digit included
pub const CARD_NUMBER_LENGTH: usize = 16;

/// Expiry years are drawn from `issue_year + 1 ..= issue_year + MAX_EXPIRY_YEARS`
pub const MAX_EXPIRY_YEARS: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CardNetwork {
    Visa,
    Mastercard,
}

impl CardNetwork {
    /// First digit of every number issued on this network
    pub fn leading_digit(&self) -> char {
        match self {
            CardNetwork::Visa => '4',
            CardNetwork::Mastercard => '5',
        }
    }
}

impl FromStr for CardNetwork {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "VISA" => Ok(CardNetwork::Visa),
            "MASTERCARD" | "MC" => Ok(CardNetwork::Mastercard),
            other => Err(Error::validation(format!("Unknown card network: {}", other))),
        }
    }
}

impl fmt::Display for CardNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardNetwork::Visa => f.write_str("VISA"),
            CardNetwork::Mastercard => f.write_str("MASTERCARD"),
        }
    }
}

/// Card status; toggled only, never set directly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CardStatus {
    Active,
    Frozen,
}

impl CardStatus {
    pub fn toggled(self) -> Self {
        match self {
            CardStatus::Active => CardStatus::Frozen,
            CardStatus::Frozen => CardStatus::Active,
        }
    }
}

impl fmt::Display for CardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardStatus::Active => f.write_str("ACTIVE"),
            CardStatus::Frozen => f.write_str("FROZEN"),
        }
    }
}

/// Card face design
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CardColor {
    Silver,
    Black,
    Gold,
}

impl FromStr for CardColor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SILVER" => Ok(CardColor::Silver),
            "BLACK" => Ok(CardColor::Black),
            "GOLD" => Ok(CardColor::Gold),
            other => Err(Error::validation(format!("Unknown card color: {}", other))),
        }
    }
}

impl fmt::Display for CardColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardColor::Silver => f.write_str("SILVER"),
            CardColor::Black => f.write_str("BLACK"),
            CardColor::Gold => f.write_str("GOLD"),
        }
    }
}

/// Card expiry, displayed as `MM/YY`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardExpiry {
    pub month: u32,
    pub year: i32,
}

impl fmt::Display for CardExpiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}", self.month, self.year.rem_euclid(100))
    }
}

/// A virtual payment card attached to an account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualCard {
    pub id: Uuid,
    pub card_number: String,
    pub expiry: CardExpiry,
    pub cvv: String,
    pub holder_name: String,
    #[serde(rename = "type")]
    pub network: CardNetwork,
    pub status: CardStatus,
    pub color: CardColor,
}

impl VirtualCard {
    /// Issue a new card. Every random component comes from `rng`, so a
    /// seeded generator reproduces the same card.
    pub fn generate(
        rng: &mut dyn RngCore,
        network: CardNetwork,
        color: CardColor,
        holder_name: impl Into<String>,
        issue_year: i32,
    ) -> Self {
        let mut id_bytes = [0u8; 16];
        rng.fill_bytes(&mut id_bytes);
        let id = uuid::Builder::from_random_bytes(id_bytes).into_uuid();

        let mut card_number = String::with_capacity(CARD_NUMBER_LENGTH);
        card_number.push(network.leading_digit());
        for _ in 1..CARD_NUMBER_LENGTH {
            let digit = rng.gen_range(0..10u32);
            card_number.push(char::from_digit(digit, 10).unwrap_or('0'));
        }

        let expiry = CardExpiry {
            month: rng.gen_range(1..=12),
            year: issue_year + rng.gen_range(1..=MAX_EXPIRY_YEARS),
        };

        let cvv = format!("{:03}", rng.gen_range(0..1000u32));

        Self {
            id,
            card_number,
            expiry,
            cvv,
            holder_name: holder_name.into(),
            network,
            status: CardStatus::Active,
            color,
        }
    }

    /// Card number grouped in fours
    pub fn formatted_number(&self) -> String {
        self.card_number
            .as_bytes()
            .chunks(4)
            .map(|c| String::from_utf8_lossy(c).into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Card number with all but the last four digits hidden
    pub fn masked_number(&self) -> String {
        let count = self.card_number.chars().count();
        let tail: String = self.card_number.chars().skip(count.saturating_sub(4)).collect();
        format!("•••• •••• •••• {}", tail)
    }

    pub fn is_frozen(&self) -> bool {
        self.status == CardStatus::Frozen
    }
}
