//! Driven port for the outbound reminder-email collaborator.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::user::User;

define_port_error! {
    /// Errors raised by the email collaborator.
    pub enum ReminderMailerError {
        /// The message could not be handed to the transport.
        Send { message: String } =>
            "reminder email send failed: {message}",
    }
}

/// Port for the two reminder emails this subsystem produces.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReminderMailer: Send + Sync {
    /// Ask the user to verify their primary email address.
    async fn send_verify_reminder(&self, user: &User) -> Result<(), ReminderMailerError>;

    /// Ask the user to refresh a stale profile.
    async fn send_update_reminder(&self, user: &User) -> Result<(), ReminderMailerError>;
}

/// Fixture implementation swallowing every send.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureReminderMailer;

#[async_trait]
impl ReminderMailer for FixtureReminderMailer {
    async fn send_verify_reminder(&self, _user: &User) -> Result<(), ReminderMailerError> {
        Ok(())
    }

    async fn send_update_reminder(&self, _user: &User) -> Result<(), ReminderMailerError> {
        Ok(())
    }
}
