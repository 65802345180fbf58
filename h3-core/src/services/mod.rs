//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area. Mutating services take
//! the `AccountStore` by `&mut`, so at most one mutation runs at a time.

pub mod account_store;
mod auth;
mod cards;
mod demo;
mod doctor;
pub mod logging;
pub mod migration;
mod status;
pub mod support;
mod transfer;

pub use account_store::{AccountStore, LoginOutcome, RestoreOutcome};
pub use auth::{AuthService, LoginChallenge, ProfileForm, MIN_PHONE_LENGTH, SMS_CODE_LENGTH};
pub use cards::CardService;
pub use demo::DemoService;
pub use doctor::{CheckResult, CheckStatus, DoctorResult, DoctorService, DoctorSummary};
pub use logging::{EntryPoint, LogEntry, LogEvent, LogStats, LoggingService};
pub use migration::{MigrationResult, MigrationService};
pub use status::{CardCounts, StatusService, StatusSummary, UserSummary};
pub use support::{ReplySource, SupportService};
pub use transfer::TransferService;
