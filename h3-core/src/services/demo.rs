//! Demo service - manage demo mode
//!
//! Demo mode runs against a separate database, gives first logins a
//! placeholder identity and seeds each session with sample transactions.
//! The regular database is never touched.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::config::Config;

const DEMO_DATABASE: &str = "demo.duckdb";

/// Demo service for managing demo mode
pub struct DemoService {
    h3_dir: PathBuf,
}

impl DemoService {
    pub fn new(h3_dir: &Path) -> Self {
        Self {
            h3_dir: h3_dir.to_path_buf(),
        }
    }

    /// Check if demo mode is currently enabled
    pub fn is_enabled(&self) -> Result<bool> {
        let config = Config::load(&self.h3_dir)?;
        Ok(config.demo_mode)
    }

    /// Enable demo mode, starting from an empty demo database
    pub fn enable(&self) -> Result<()> {
        self.remove_demo_database()?;

        let mut config = Config::load(&self.h3_dir).unwrap_or_default();
        config.enable_demo_mode();
        config.save(&self.h3_dir)?;
        Ok(())
    }

    /// Disable demo mode, optionally deleting the demo database
    pub fn disable(&self, clean: bool) -> Result<()> {
        let mut config = Config::load(&self.h3_dir).unwrap_or_default();
        config.disable_demo_mode();
        config.save(&self.h3_dir)?;

        if clean {
            self.remove_demo_database()?;
        }
        Ok(())
    }

    fn remove_demo_database(&self) -> Result<()> {
        let demo_db = self.h3_dir.join(DEMO_DATABASE);
        let demo_wal = self.h3_dir.join(format!("{}.wal", DEMO_DATABASE));
        if demo_db.exists() {
            std::fs::remove_file(&demo_db)?;
        }
        if demo_wal.exists() {
            std::fs::remove_file(&demo_wal)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_enable_resets_demo_database() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(DEMO_DATABASE), b"stale").unwrap();
        std::fs::write(dir.path().join("h3.duckdb"), b"keep").unwrap();

        let service = DemoService::new(dir.path());
        service.enable().unwrap();

        assert!(service.is_enabled().unwrap());
        assert!(!dir.path().join(DEMO_DATABASE).exists());
        assert!(dir.path().join("h3.duckdb").exists());
    }

    #[test]
    fn test_disable_keeps_demo_database_unless_clean() {
        let dir = tempdir().unwrap();
        let service = DemoService::new(dir.path());
        service.enable().unwrap();
        std::fs::write(dir.path().join(DEMO_DATABASE), b"data").unwrap();

        service.disable(false).unwrap();
        assert!(!service.is_enabled().unwrap());
        assert!(dir.path().join(DEMO_DATABASE).exists());

        service.disable(true).unwrap();
        assert!(!dir.path().join(DEMO_DATABASE).exists());
    }
}
