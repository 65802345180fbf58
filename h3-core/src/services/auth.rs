//! Auth service - login and signup flows
//!
//! Existing users sign in by phone: request an SMS code, then confirm it.
//! New users verify an email address and complete a profile. Both paths
//! end in `AccountStore::login`; the verifier only gates progression.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};
use crate::domain::schema::DEFAULT_COUNTRY;
use crate::domain::{Language, ProfileUpdate, Title};
use crate::ports::{Delay, IdentityVerifier, SimulatedOp};
use crate::services::account_store::{AccountStore, LoginOutcome};

/// Minimum characters in a phone number before a code is requested
pub const MIN_PHONE_LENGTH: usize = 8;

/// Characters in an SMS verification code
pub const SMS_CODE_LENGTH: usize = 6;

/// An SMS code has been sent to `phone`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginChallenge {
    pub phone: String,
    pub verification_id: String,
}

/// Signup form; every field is mandatory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileForm {
    pub title: Title,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub region: String,
    pub postcode: String,
    pub country: String,
    pub bank_name: String,
    pub iban: String,
    pub email: String,
    pub mobile_number: String,
}

impl Default for ProfileForm {
    fn default() -> Self {
        Self {
            title: Title::Mr,
            first_name: String::new(),
            last_name: String::new(),
            address: String::new(),
            city: String::new(),
            region: String::new(),
            postcode: String::new(),
            country: DEFAULT_COUNTRY.to_string(),
            bank_name: String::new(),
            iban: String::new(),
            email: String::new(),
            mobile_number: String::new(),
        }
    }
}

impl ProfileForm {
    pub fn validate(&self) -> Result<()> {
        let fields = [
            &self.first_name,
            &self.last_name,
            &self.address,
            &self.city,
            &self.region,
            &self.postcode,
            &self.country,
            &self.bank_name,
            &self.iban,
            &self.email,
            &self.mobile_number,
        ];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(Error::validation("All fields are mandatory."));
        }
        Ok(())
    }

    /// Profile fields written once the account exists
    pub fn to_update(&self) -> ProfileUpdate {
        let first_name = self.first_name.trim().to_string();
        let last_name = self.last_name.trim().to_string();
        ProfileUpdate {
            title: Some(self.title),
            name: Some(format!("{} {}", first_name, last_name)),
            first_name: Some(first_name),
            last_name: Some(last_name),
            email: Some(self.email.trim().to_string()),
            phone_number: Some(self.mobile_number.clone()),
            kyc_verified: Some(true),
            address: Some(self.address.clone()),
            city: Some(self.city.clone()),
            region: Some(self.region.clone()),
            postcode: Some(self.postcode.clone()),
            country: Some(self.country.clone()),
            bank_name: Some(self.bank_name.clone()),
            iban: Some(self.iban.clone()),
            ..ProfileUpdate::default()
        }
    }
}

pub struct AuthService {
    verifier: Arc<dyn IdentityVerifier>,
    delay: Arc<dyn Delay>,
}

impl AuthService {
    pub fn new(verifier: Arc<dyn IdentityVerifier>, delay: Arc<dyn Delay>) -> Self {
        Self { verifier, delay }
    }

    pub fn verifier_name(&self) -> &str {
        self.verifier.name()
    }

    /// Send an SMS code to an existing user
    pub async fn request_login_code(&self, phone: &str) -> Result<LoginChallenge> {
        let phone = phone.trim();
        if phone.chars().count() < MIN_PHONE_LENGTH {
            return Err(Error::validation(format!(
                "Phone number must be at least {} characters",
                MIN_PHONE_LENGTH
            )));
        }

        self.delay.wait(SimulatedOp::UserCheck).await;
        if !self.verifier.check_user_exists(phone).await? {
            return Err(Error::not_found("Account not found"));
        }

        self.delay.wait(SimulatedOp::SmsSend).await;
        let sms = self.verifier.sign_in_with_phone_number(phone).await?;

        Ok(LoginChallenge {
            phone: phone.to_string(),
            verification_id: sms.verification_id,
        })
    }

    /// Check the SMS code and log in on success
    pub async fn confirm_login(
        &self,
        store: &mut AccountStore,
        challenge: &LoginChallenge,
        code: &str,
        language: Option<Language>,
    ) -> Result<LoginOutcome> {
        let code = code.trim();
        if code.chars().count() != SMS_CODE_LENGTH {
            return Err(Error::validation(format!(
                "Verification code must be {} digits",
                SMS_CODE_LENGTH
            )));
        }

        self.delay.wait(SimulatedOp::SmsVerify).await;
        if !self
            .verifier
            .verify_sms_code(&challenge.verification_id, code)
            .await?
        {
            return Err(Error::verification("Invalid verification code"));
        }

        self.delay.wait(SimulatedOp::Login).await;
        store.login(&challenge.phone, language)
    }

    /// Send a verification email to a new user
    pub async fn start_signup(&self, email: &str) -> Result<()> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(Error::validation("A valid email address is required"));
        }

        self.delay.wait(SimulatedOp::EmailSend).await;
        self.verifier.send_email_verification(email).await
    }

    /// Create the account from a completed signup form
    ///
    /// Logs in with the form's mobile number, then writes the form onto
    /// the profile with KYC marked complete.
    pub async fn complete_profile(
        &self,
        store: &mut AccountStore,
        form: &ProfileForm,
        language: Option<Language>,
    ) -> Result<LoginOutcome> {
        form.validate()?;

        if !self.verifier.check_email_verified(form.email.trim()).await? {
            return Err(Error::verification("Email address has not been verified"));
        }

        self.delay.wait(SimulatedOp::ProfileSave).await;
        let outcome = store.login(&form.mobile_number, language)?;
        store.update_user(&form.to_update())?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> ProfileForm {
        ProfileForm {
            title: Title::Mrs,
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

    #[test]
    fn test_form_validation() {
        assert!(filled_form().validate().is_ok());

        let mut form = filled_form();
        form.iban = "  ".to_string();
        let err = form.validate().unwrap_err();
        assert!(err.to_string().contains("All fields are mandatory."));

        assert!(ProfileForm::default().validate().is_err());
    }

    #[test]
    fn test_form_to_update() {
        let update = filled_form().to_update();
        assert_eq!(update.name.as_deref(), Some("Layla Karim"));
        assert_eq!(update.phone_number.as_deref(), Some("+966 50 123 4567"));
        assert_eq!(update.kyc_verified, Some(true));
        assert_eq!(update.title, Some(Title::Mrs));
        assert!(update.language.is_none());
    }
}
