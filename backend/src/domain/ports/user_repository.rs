//! Driven port for user queries and reminder bookkeeping writes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::define_port_error;
use crate::domain::user::User;

define_port_error! {
    /// Errors raised by user persistence adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "user persistence connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "user persistence query failed: {message}",
        /// The targeted user or membership does not exist.
        Missing { message: String } =>
            "user record missing: {message}",
    }
}

/// Port for point queries and single-document updates against users.
///
/// All mutations are single-document updates; partial failure mid-job leaves
/// the store valid but incomplete, and the next scheduled run converges.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Look up one user by identifier.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserRepositoryError>;

    /// Every user carrying the exact email address.
    async fn find_by_email(&self, email: &str) -> Result<Vec<User>, UserRepositoryError>;

    /// Every user with an open membership referencing the list.
    async fn members_of_list(&self, list: Uuid) -> Result<Vec<User>, UserRepositoryError>;

    /// Record a sent verification reminder: timestamp plus counter.
    async fn record_verify_reminder(
        &self,
        user: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), UserRepositoryError>;

    /// Record a sent stale-profile reminder.
    async fn record_update_reminder(
        &self,
        user: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), UserRepositoryError>;

    /// Flag one membership as checkout-reminded.
    async fn mark_checkout_reminded(
        &self,
        user: Uuid,
        check_in: Uuid,
    ) -> Result<(), UserRepositoryError>;

    /// Close one membership during automated checkout.
    async fn mark_checked_out(
        &self,
        user: Uuid,
        check_in: Uuid,
    ) -> Result<(), UserRepositoryError>;
}

/// Fixture implementation for tests that do not exercise persistence.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureUserRepository;

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn find_by_id(&self, _id: Uuid) -> Result<Option<User>, UserRepositoryError> {
        Ok(None)
    }

    async fn find_by_email(&self, _email: &str) -> Result<Vec<User>, UserRepositoryError> {
        Ok(Vec::new())
    }

    async fn members_of_list(&self, _list: Uuid) -> Result<Vec<User>, UserRepositoryError> {
        Ok(Vec::new())
    }

    async fn record_verify_reminder(
        &self,
        _user: Uuid,
        _at: DateTime<Utc>,
    ) -> Result<(), UserRepositoryError> {
        Ok(())
    }

    async fn record_update_reminder(
        &self,
        _user: Uuid,
        _at: DateTime<Utc>,
    ) -> Result<(), UserRepositoryError> {
        Ok(())
    }

    async fn mark_checkout_reminded(
        &self,
        _user: Uuid,
        _check_in: Uuid,
    ) -> Result<(), UserRepositoryError> {
        Ok(())
    }

    async fn mark_checked_out(
        &self,
        _user: Uuid,
        _check_in: Uuid,
    ) -> Result<(), UserRepositoryError> {
        Ok(())
    }
}
