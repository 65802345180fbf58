//! User profile domain model

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::phone::AccountKey;
use super::result::Error;
use super::schema::{
    PROFILE_SCHEMA_VERSION, DEFAULT_COUNTRY, DEFAULT_CURRENCY,
};

/// Zakat rate applied to qualifying wealth (2.5%)
pub const ZAKAT_RATE: Decimal = Decimal::from_parts(25, 0, 0, false, 3);

/// Honorific shown on cards and statements
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Title {
    #[default]
    Mr,
    Mrs,
}

impl FromStr for Title {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().trim_end_matches('.') {
            "mr" => Ok(Title::Mr),
            "mrs" => Ok(Title::Mrs),
            other => Err(Error::validation(format!("Unknown title: {}", other))),
        }
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Title::Mr => f.write_str("Mr"),
            Title::Mrs => f.write_str("Mrs"),
        }
    }
}

/// Interface language preference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
        }
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "ar" | "arabic" => Ok(Language::Ar),
            other => Err(Error::validation(format!("Unsupported language: {}", other))),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity and financial profile for one account
///
/// Persisted as camelCase JSON under both the session pointer and the
/// account record. Records written by older versions are brought up to
/// date by [`super::schema::upgrade_profile`] before deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub schema_version: u32,

    // Identity
    pub title: Title,
    pub first_name: String,
    pub last_name: String,
    /// Display name. Profile completion derives it as "first last".
    pub name: String,

    // Contact
    pub email: String,
    /// Phone number as entered, formatting preserved
    pub phone_number: String,

    // Status
    pub kyc_verified: bool,
    pub biometric_enabled: bool,

    // Financial
    pub balance: Decimal,
    pub currency: String,
    pub bank_name: String,
    pub iban: String,

    // Settings
    pub language: Language,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,

    // Address
    pub address: String,
    pub city: String,
    pub region: String,
    pub postcode: String,
    pub country: String,
}

impl UserProfile {
    /// Blank profile for a first login on this phone number
    pub fn new(phone_number: impl Into<String>, language: Language) -> Self {
        Self {
            schema_version: PROFILE_SCHEMA_VERSION,
            title: Title::default(),
            first_name: String::new(),
            last_name: String::new(),
            name: String::new(),
            email: String::new(),
            phone_number: phone_number.into(),
            kyc_verified: false,
            biometric_enabled: false,
            balance: Decimal::ZERO,
            currency: DEFAULT_CURRENCY.to_string(),
            bank_name: String::new(),
            iban: String::new(),
            language,
            profile_image: None,
            address: String::new(),
            city: String::new(),
            region: String::new(),
            postcode: String::new(),
            country: DEFAULT_COUNTRY.to_string(),
        }
    }

    /// Storage identity derived from the stored phone number
    pub fn account_key(&self) -> AccountKey {
        AccountKey::from_phone(&self.phone_number)
    }

    /// Zakat due on the current balance. Nothing is due on a deficit.
    pub fn zakat_due(&self) -> Decimal {
        if self.balance <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        (self.balance * ZAKAT_RATE).round_dp(2)
    }

    /// Holder name as embossed on virtual cards
    pub fn card_holder_name(&self) -> String {
        self.name.trim().to_uppercase()
    }
}

/// Partial profile update: every present field overrides, absent fields
/// are left untouched.
///
/// Balance is deliberately absent; balance only moves through
/// `AccountStore::update_balance`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileUpdate {
    pub title: Option<Title>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub kyc_verified: Option<bool>,
    pub biometric_enabled: Option<bool>,
    pub currency: Option<String>,
    pub bank_name: Option<String>,
    pub iban: Option<String>,
    pub language: Option<Language>,
    pub profile_image: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Shallow merge onto an existing profile
    pub fn apply_to(&self, profile: &mut UserProfile) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }

        set(&mut profile.title, &self.title);
        set(&mut profile.first_name, &self.first_name);
        set(&mut profile.last_name, &self.last_name);
        set(&mut profile.name, &self.name);
        set(&mut profile.email, &self.email);
        set(&mut profile.phone_number, &self.phone_number);
        set(&mut profile.kyc_verified, &self.kyc_verified);
        set(&mut profile.biometric_enabled, &self.biometric_enabled);
        set(&mut profile.currency, &self.currency);
        set(&mut profile.bank_name, &self.bank_name);
        set(&mut profile.iban, &self.iban);
        set(&mut profile.language, &self.language);
        set(&mut profile.address, &self.address);
        set(&mut profile.city, &self.city);
        set(&mut profile.region, &self.region);
        set(&mut profile.postcode, &self.postcode);
        set(&mut profile.country, &self.country);
        if let Some(image) = &self.profile_image {
            profile.profile_image = Some(image.clone());
        }
    }
}
