//! H3 Core - business logic for the H3 neobank client
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core business entities (UserProfile, Transaction, VirtualCard, etc.)
//! - **ports**: Trait definitions for external dependencies (KeyValueStore, IdentityVerifier, ...)
//! - **services**: Business logic orchestration, centered on the AccountStore
//! - **adapters**: Concrete implementations (DuckDB, Gemini, mock verifier, etc.)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use adapters::delay::TokioDelay;
use adapters::duckdb::DuckDbKeyValueStore;
use adapters::gemini::GeminiAssistant;
use adapters::mock_identity::MockIdentityVerifier;
use config::Config;
use ports::{Delay, IdentityVerifier, KeyValueStore, SupportAssistant};
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult};
pub use services::{EntryPoint, LogEvent, LoggingService};
pub use domain::{
    AccountKey, CardColor, CardNetwork, CardStatus, ChatMessage, Language, ProfileUpdate,
    Transaction, TransactionType, UserProfile, VirtualCard,
};

/// Main context for H3 operations
///
/// Holds the configuration, the key-value store, the account store and
/// all services. The session left by a previous run is restored on
/// construction; `restore_outcome` says what was found.
pub struct H3Context {
    pub config: Config,
    pub kv: Arc<dyn KeyValueStore>,
    pub store: AccountStore,
    pub restore_outcome: RestoreOutcome,
    pub delay: Arc<dyn Delay>,
    pub auth_service: AuthService,
    pub transfer_service: TransferService,
    pub card_service: CardService,
    pub support_service: SupportService,
    pub status_service: StatusService,
    pub doctor_service: DoctorService,
}

impl H3Context {
    /// Create a context over the data directory
    ///
    /// Opens `h3.duckdb` (or `demo.duckdb` in demo mode), simulates latency
    /// as configured and enables the Gemini assistant when an API key is
    /// available.
    pub fn new(h3_dir: &Path) -> Result<Self> {
        let config = Config::load(h3_dir)?;

        let db_path = h3_dir.join(config.database_filename());
        let kv: Arc<dyn KeyValueStore> = Arc::new(DuckDbKeyValueStore::open(&db_path)?);

        let delay: Arc<dyn Delay> = Arc::new(TokioDelay::new(config.latency.clone()));
        let assistant = match &config.assistant_api_key {
            Some(key) => {
                let gemini = GeminiAssistant::new(key.clone(), config.assistant_model.clone())?;
                Some(Arc::new(gemini) as Arc<dyn SupportAssistant>)
            }
            None => None,
        };

        Self::with_components(
            config,
            kv,
            Box::new(StdRng::from_entropy()),
            Arc::new(MockIdentityVerifier::new()),
            assistant,
            delay,
        )
    }

    /// Create a context from explicit components
    pub fn with_components(
        config: Config,
        kv: Arc<dyn KeyValueStore>,
        rng: Box<dyn RngCore + Send>,
        verifier: Arc<dyn IdentityVerifier>,
        assistant: Option<Arc<dyn SupportAssistant>>,
        delay: Arc<dyn Delay>,
    ) -> Result<Self> {
        let mut store = AccountStore::new(Arc::clone(&kv), rng, config.demo_mode);
        let restore_outcome = store.restore()?;

        let auth_service = AuthService::new(verifier, Arc::clone(&delay));
        let transfer_service = TransferService::new(Arc::clone(&delay));
        let card_service = CardService::new(Arc::clone(&delay));
        let support_service = SupportService::new(assistant);
        let status_service = StatusService::new();
        let doctor_service = DoctorService::new(Arc::clone(&kv));

        Ok(Self {
            config,
            kv,
            store,
            restore_outcome,
            delay,
            auth_service,
            transfer_service,
            card_service,
            support_service,
            status_service,
            doctor_service,
        })
    }
}
