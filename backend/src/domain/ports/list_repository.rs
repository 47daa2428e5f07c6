//! Driven port for list persistence.

use async_trait::async_trait;
use uuid::Uuid;

use super::define_port_error;
use crate::domain::list::{List, ListKind};

define_port_error! {
    /// Errors raised by list persistence adapters.
    pub enum ListRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "list persistence connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "list persistence query failed: {message}",
    }
}

/// Port for reading and writing lists in the backing store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListRepository: Send + Sync {
    /// Look up the list mirroring `(kind, remote_id)`, if one exists.
    async fn find_by_remote(
        &self,
        kind: ListKind,
        remote_id: &str,
    ) -> Result<Option<List>, ListRepositoryError>;

    /// Look up a list by its local identifier.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<List>, ListRepositoryError>;

    /// Insert a newly materialized list.
    ///
    /// This is a plain insert: the importer's preceding existence check is
    /// the only `(kind, remote_id)` uniqueness guard.
    async fn insert(&self, list: &List) -> Result<(), ListRepositoryError>;
}

/// Fixture implementation for tests that do not exercise persistence.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureListRepository;

#[async_trait]
impl ListRepository for FixtureListRepository {
    async fn find_by_remote(
        &self,
        _kind: ListKind,
        _remote_id: &str,
    ) -> Result<Option<List>, ListRepositoryError> {
        Ok(None)
    }

    async fn find_by_id(&self, _id: Uuid) -> Result<Option<List>, ListRepositoryError> {
        Ok(None)
    }

    async fn insert(&self, _list: &List) -> Result<(), ListRepositoryError> {
        Ok(())
    }
}
