//! Driven port for appending duplicate-identity records.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::duplicate::Duplicate;

define_port_error! {
    /// Errors raised by duplicate persistence adapters.
    pub enum DuplicateRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "duplicate persistence connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "duplicate persistence query failed: {message}",
    }
}

/// Port for the append-only duplicate audit log.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DuplicateRepository: Send + Sync {
    /// Append one detected group. Never deduplicates against prior entries.
    async fn insert(&self, duplicate: &Duplicate) -> Result<(), DuplicateRepositoryError>;
}

/// Fixture implementation for tests that do not exercise persistence.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureDuplicateRepository;

#[async_trait]
impl DuplicateRepository for FixtureDuplicateRepository {
    async fn insert(&self, _duplicate: &Duplicate) -> Result<(), DuplicateRepositoryError> {
        Ok(())
    }
}
