//! Simulated latency port
//!
//! Flows that stand in for network calls (login, transfer, card issuance)
//! wait on a `Delay` before mutating state. Production wiring sleeps;
//! tests inject a zero delay.

use std::time::Duration;

use async_trait::async_trait;

/// Operations that carry simulated latency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulatedOp {
    UserCheck,
    SmsSend,
    SmsVerify,
    EmailSend,
    Login,
    Transfer,
    CardIssue,
    ProfileSave,
}

impl SimulatedOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimulatedOp::UserCheck => "user_check",
            SimulatedOp::SmsSend => "sms_send",
            SimulatedOp::SmsVerify => "sms_verify",
            SimulatedOp::EmailSend => "email_send",
            SimulatedOp::Login => "login",
            SimulatedOp::Transfer => "transfer",
            SimulatedOp::CardIssue => "card_issue",
            SimulatedOp::ProfileSave => "profile_save",
        }
    }
}

/// Delay strategy. A pending delay always completes; there is no
/// cancellation path.
#[async_trait]
pub trait Delay: Send + Sync {
    async fn wait(&self, op: SimulatedOp);

    /// How long `op` would wait, for progress display
    fn duration(&self, op: SimulatedOp) -> Duration;
}
