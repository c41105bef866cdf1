//! Pre-flight checks before expensive operations.
//!
//! Validates that required configuration is available before starting
//! operations that would otherwise fail midway.

use crate::config::{Settings, StorageProvider};
use crate::error::{LecternError, Result};
use crate::openai::is_api_key_configured;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Ingestion calls transcription and embedding.
    Ingest,
    /// Asking questions calls embedding and generation.
    Ask,
    /// Search calls embedding.
    Search,
    /// The server needs every capability.
    Serve,
    /// Reading rooms and questions needs only storage.
    Browse,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Ingest | Operation::Ask | Operation::Search => {
            check_api_key()?;
            check_persistent_storage(settings)?;
        }
        Operation::Serve => {
            check_api_key()?;
        }
        Operation::Browse => {
            check_persistent_storage(settings)?;
        }
    }
    Ok(())
}

fn check_api_key() -> Result<()> {
    if is_api_key_configured() {
        Ok(())
    } else {
        Err(LecternError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        ))
    }
}

/// One-shot CLI commands lose everything with in-memory storage.
fn check_persistent_storage(settings: &Settings) -> Result<()> {
    match settings.storage.provider {
        StorageProvider::Sqlite => Ok(()),
        StorageProvider::Memory => Err(LecternError::Config(
            "storage.provider is 'memory'; CLI commands need 'sqlite' (memory storage only lives as long as 'lectern serve')".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browse_with_sqlite_has_no_requirements() {
        assert!(check(Operation::Browse, &Settings::default()).is_ok());
    }

    #[test]
    fn test_browse_rejects_memory_storage() {
        let mut settings = Settings::default();
        settings.storage.provider = StorageProvider::Memory;
        assert!(matches!(
            check(Operation::Browse, &settings),
            Err(LecternError::Config(_))
        ));
    }
}
