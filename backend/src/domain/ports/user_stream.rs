//! Driven port for streaming large user collections.

use chrono::{DateTime, Utc};
use futures_util::stream::BoxStream;

use super::define_port_error;
use crate::domain::user::User;

/// Which slice of the user collection a job streams over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserStreamFilter {
    /// Every account.
    All,
    /// Accounts with `email_verified = false`.
    Unverified,
    /// Accounts not updated since the given instant.
    NotUpdatedSince(DateTime<Utc>),
    /// Accounts with a verified email and at least one open membership that
    /// declared a checkout date and has not been reminded yet.
    CheckoutRemindable,
}

define_port_error! {
    /// Errors raised while streaming users from the store.
    pub enum UserStreamError {
        /// The underlying cursor failed mid-stream.
        Cursor { message: String } =>
            "user stream cursor failed: {message}",
    }
}

/// Port producing one user at a time from a potentially very large query.
///
/// Implementations must not buffer the whole collection; consumers pull
/// records through the serialized stream driver, which guarantees at most one
/// in-flight per-record action per stream.
#[cfg_attr(test, mockall::automock)]
pub trait UserStream: Send + Sync {
    /// Open a stream over the users matching `filter`.
    fn stream(&self, filter: UserStreamFilter) -> BoxStream<'static, Result<User, UserStreamError>>;
}

/// Fixture implementation producing an empty stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureUserStream;

impl UserStream for FixtureUserStream {
    fn stream(
        &self,
        _filter: UserStreamFilter,
    ) -> BoxStream<'static, Result<User, UserStreamError>> {
        Box::pin(futures_util::stream::empty())
    }
}
