//! Identity verification port
//!
//! Phone sign-in for existing users and email verification for new ones.
//! The auth service only uses these answers as gates in front of
//! `AccountStore::login`.

use async_trait::async_trait;

use crate::domain::result::Result;

/// Pending SMS sign-in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsChallenge {
    pub verification_id: String,
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Provider name (e.g., "mock")
    fn name(&self) -> &str;

    async fn check_user_exists(&self, phone: &str) -> Result<bool>;

    async fn sign_in_with_phone_number(&self, phone: &str) -> Result<SmsChallenge>;

    /// Whether `code` is the right answer to the challenge
    async fn verify_sms_code(&self, verification_id: &str, code: &str) -> Result<bool>;

    async fn send_email_verification(&self, email: &str) -> Result<()>;

    async fn check_email_verified(&self, email: &str) -> Result<bool>;
}
