//! Configuration management
//!
//! Settings live in `settings.json` inside the H3 data directory:
//! ```json
//! {
//!   "app": { "demoMode": false, "language": "en", "latency": { ... } },
//!   "assistant": { "model": "gemini-2.5-flash", "apiKey": null }
//! }
//! ```
//! Fields this crate does not manage are preserved on save.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::Language;
use crate::ports::SimulatedOp;

pub const SETTINGS_FILE: &str = "settings.json";
pub const DEFAULT_ASSISTANT_MODEL: &str = "gemini-2.5-flash";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
    #[serde(default)]
    assistant: AssistantSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default)]
    demo_mode: bool,
    #[serde(default)]
    language: Language,
    #[serde(default)]
    latency: LatencyConfig,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssistantSettings {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    api_key: Option<String>,
}

/// Simulated network latency per operation, in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LatencyConfig {
    pub enabled: bool,
    pub user_check_ms: u64,
    pub sms_send_ms: u64,
    pub sms_verify_ms: u64,
    pub email_send_ms: u64,
    pub login_ms: u64,
    pub transfer_ms: u64,
    pub card_issue_ms: u64,
    pub profile_save_ms: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            user_check_ms: 500,
            sms_send_ms: 1000,
            sms_verify_ms: 1500,
            email_send_ms: 1500,
            login_ms: 1500,
            transfer_ms: 2000,
            card_issue_ms: 1500,
            profile_save_ms: 800,
        }
    }
}

impl LatencyConfig {
    /// All delays zero
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn duration(&self, op: SimulatedOp) -> Duration {
        if !self.enabled {
            return Duration::ZERO;
        }
        let ms = match op {
            SimulatedOp::UserCheck => self.user_check_ms,
            SimulatedOp::SmsSend => self.sms_send_ms,
            SimulatedOp::SmsVerify => self.sms_verify_ms,
            SimulatedOp::EmailSend => self.email_send_ms,
            SimulatedOp::Login => self.login_ms,
            SimulatedOp::Transfer => self.transfer_ms,
            SimulatedOp::CardIssue => self.card_issue_ms,
            SimulatedOp::ProfileSave => self.profile_save_ms,
        };
        Duration::from_millis(ms)
    }
}

/// H3 configuration (simplified view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    /// Demo mode: separate database, placeholder identity, seed transactions
    pub demo_mode: bool,
    pub language: Language,
    pub latency: LatencyConfig,
    pub assistant_model: String,
    pub assistant_api_key: Option<String>,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            demo_mode: false,
            language: Language::default(),
            latency: LatencyConfig::default(),
            assistant_model: DEFAULT_ASSISTANT_MODEL.to_string(),
            assistant_api_key: None,
            _raw_settings: SettingsFile::default(),
        }
    }
}

impl Config {
    /// Load config from the data directory
    ///
    /// Environment overrides (for CI/testing):
    /// - `H3_DEMO_MODE` forces demo mode on or off
    /// - `H3_NO_LATENCY` disables simulated latency
    /// - `GEMINI_API_KEY` supplies the assistant key
    pub fn load(h3_dir: &Path) -> Result<Self> {
        let settings_path = h3_dir.join(SETTINGS_FILE);

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        let demo_mode = match std::env::var("H3_DEMO_MODE").ok().as_deref() {
            Some(v) => parse_flag(v).unwrap_or(raw.app.demo_mode),
            None => raw.app.demo_mode,
        };

        let mut latency = raw.app.latency.clone();
        if let Some(true) = std::env::var("H3_NO_LATENCY").ok().as_deref().and_then(parse_flag) {
            latency.enabled = false;
        }

        let assistant_api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| raw.assistant.api_key.clone());

        Ok(Self {
            demo_mode,
            language: raw.app.language,
            latency,
            assistant_model: raw
                .assistant
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_ASSISTANT_MODEL.to_string()),
            assistant_api_key,
            _raw_settings: raw,
        })
    }

    /// Save config to the data directory
    /// Preserves other settings that this crate doesn't manage
    pub fn save(&self, h3_dir: &Path) -> Result<()> {
        let settings_path = h3_dir.join(SETTINGS_FILE);

        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        settings.app.demo_mode = self.demo_mode;
        settings.app.language = self.language;

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    pub fn enable_demo_mode(&mut self) {
        self.demo_mode = true;
    }

    pub fn disable_demo_mode(&mut self) {
        self.demo_mode = false;
    }

    /// Database file for the current mode
    pub fn database_filename(&self) -> &'static str {
        if self.demo_mode {
            "demo.duckdb"
        } else {
            "h3.duckdb"
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
