//! Tracing-backed notifier and mailer adapters.
//!
//! The real notification and email transports belong to an external
//! collaborator. These adapters record each dispatch as a structured log
//! line, which is the default wiring until that collaborator is attached.

use async_trait::async_trait;
use tracing::info;

use crate::domain::ports::{
    Notification, Notifier, NotifierError, ReminderMailer, ReminderMailerError,
};
use crate::domain::user::User;

/// Notifier that logs each dispatch record.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifierError> {
        info!(
            kind = notification.kind.as_str(),
            recipients = notification.recipients.len(),
            params = %notification.params,
            "notification dispatched",
        );
        Ok(())
    }
}

/// Mailer that logs each reminder instead of sending it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMailer;

#[async_trait]
impl ReminderMailer for TracingMailer {
    async fn send_verify_reminder(&self, user: &User) -> Result<(), ReminderMailerError> {
        info!(user = %user.id, "verification reminder dispatched");
        Ok(())
    }

    async fn send_update_reminder(&self, user: &User) -> Result<(), ReminderMailerError> {
        info!(user = %user.id, "profile update reminder dispatched");
        Ok(())
    }
}
