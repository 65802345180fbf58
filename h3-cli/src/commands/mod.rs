//! CLI command implementations

pub mod auth;
pub mod card;
pub mod chat;
pub mod demo;
pub mod doctor;
pub mod logs;
pub mod profile;
pub mod status;
pub mod transactions;
pub mod transfer;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use h3_core::services::RestoreOutcome;
use h3_core::{EntryPoint, H3Context, LogEvent, LoggingService};

use crate::output;

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let h3_dir = get_h3_dir().ok()?;
    std::fs::create_dir_all(&h3_dir).ok()?;
    LoggingService::new(&h3_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Get the H3 data directory from environment or default
pub fn get_h3_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("H3_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".h3"))
        .context("Could not find home directory; set H3_DIR")
}

/// Get or create the H3 context
pub fn get_context() -> Result<H3Context> {
    let h3_dir = get_h3_dir()?;
    std::fs::create_dir_all(&h3_dir)
        .with_context(|| format!("Failed to create H3 directory: {:?}", h3_dir))?;

    let ctx = H3Context::new(&h3_dir).context("Failed to initialize H3 context")?;

    if let RestoreOutcome::Discarded { reason } = &ctx.restore_outcome {
        output::warning(&format!(
            "Stored session was unreadable and has been cleared ({})",
            reason
        ));
        log_event(
            &get_logger(),
            LogEvent::new("session_discarded").with_error(reason.clone()),
        );
    }

    Ok(ctx)
}

/// Context with an active session, or a hint to log in
pub fn get_session_context() -> Result<H3Context> {
    let ctx = get_context()?;
    if !ctx.store.is_logged_in() {
        bail!("Not logged in. Run 'h3 login' first.");
    }
    Ok(ctx)
}
