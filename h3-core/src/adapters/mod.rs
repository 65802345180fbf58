//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - DuckDB and an in-memory map for the KeyValueStore port
//! - Mock phone/email verification for IdentityVerifier
//! - Gemini HTTP client for SupportAssistant
//! - Tokio timer (or nothing) for Delay
//! - Demo seed data

pub mod delay;
pub mod demo;
pub mod duckdb;
pub mod gemini;
pub mod memory;
pub mod mock_identity;
