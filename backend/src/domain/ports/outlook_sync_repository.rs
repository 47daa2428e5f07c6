//! Driven port for contact-folder sync descriptors.

use async_trait::async_trait;
use uuid::Uuid;

use super::define_port_error;
use crate::domain::outlook::OutlookSync;

define_port_error! {
    /// Errors raised by sync-descriptor persistence adapters.
    pub enum OutlookSyncRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "sync descriptor persistence connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "sync descriptor persistence query failed: {message}",
    }
}

/// Port for reading and self-deleting sync descriptors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OutlookSyncRepository: Send + Sync {
    /// Every descriptor bound to the given list.
    async fn find_for_list(
        &self,
        list: Uuid,
    ) -> Result<Vec<OutlookSync>, OutlookSyncRepositoryError>;

    /// Remove a descriptor whose remote folder no longer exists.
    async fn delete(&self, id: Uuid) -> Result<(), OutlookSyncRepositoryError>;
}

/// Fixture implementation for tests that do not exercise persistence.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureOutlookSyncRepository;

#[async_trait]
impl OutlookSyncRepository for FixtureOutlookSyncRepository {
    async fn find_for_list(
        &self,
        _list: Uuid,
    ) -> Result<Vec<OutlookSync>, OutlookSyncRepositoryError> {
        Ok(Vec::new())
    }

    async fn delete(&self, _id: Uuid) -> Result<(), OutlookSyncRepositoryError> {
        Ok(())
    }
}
