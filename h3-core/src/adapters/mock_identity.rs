//! Mock identity verifier
//!
//! Stands in for a hosted phone/email auth provider. Every phone number
//! belongs to an existing user, every email counts as verified, and the
//! only accepted SMS code is [`MOCK_SMS_CODE`].

use async_trait::async_trait;

use crate::domain::result::Result;
use crate::ports::{IdentityVerifier, SmsChallenge};

/// The SMS code the mock accepts
pub const MOCK_SMS_CODE: &str = "123456";

const VERIFICATION_ID_PREFIX: &str = "mock_sms_id_";

#[derive(Debug, Clone, Copy, Default)]
pub struct MockIdentityVerifier;

impl MockIdentityVerifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl IdentityVerifier for MockIdentityVerifier {
    fn name(&self) -> &str {
        "mock"
    }

    async fn check_user_exists(&self, _phone: &str) -> Result<bool> {
        Ok(true)
    }

    async fn sign_in_with_phone_number(&self, _phone: &str) -> Result<SmsChallenge> {
        Ok(SmsChallenge {
            verification_id: format!(
                "{}{}",
                VERIFICATION_ID_PREFIX,
                chrono::Utc::now().timestamp_millis()
            ),
        })
    }

    async fn verify_sms_code(&self, verification_id: &str, code: &str) -> Result<bool> {
        Ok(verification_id.starts_with(VERIFICATION_ID_PREFIX) && code == MOCK_SMS_CODE)
    }

    async fn send_email_verification(&self, _email: &str) -> Result<()> {
        Ok(())
    }

    async fn check_email_verified(&self, _email: &str) -> Result<bool> {
        Ok(true)
    }
}
