//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The store and
//! services depend only on these traits, not on concrete implementations.

mod assistant;
mod delay;
mod identity;
mod key_value;

pub use assistant::SupportAssistant;
pub use delay::{Delay, SimulatedOp};
pub use identity::{IdentityVerifier, SmsChallenge};
pub use key_value::KeyValueStore;
