//! Driven port for the notification-sending collaborator.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};
use uuid::Uuid;

use super::define_port_error;
use crate::domain::list::List;
use crate::domain::user::CheckIn;

/// Dispatch categories understood by the notification collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NewDisaster,
    CheckoutReminder,
    AutomatedCheckout,
}

impl NotificationKind {
    /// Stable wire identifier.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NewDisaster => "new_disaster",
            Self::CheckoutReminder => "checkout_reminder",
            Self::AutomatedCheckout => "automated_checkout",
        }
    }
}

/// Ephemeral dispatch record handed to the collaborator; never persisted
/// by this subsystem.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub kind: NotificationKind,
    pub params: Value,
    pub recipients: Vec<Uuid>,
}

impl Notification {
    /// Announcement of a freshly imported disaster to the members of one
    /// affected operation.
    pub fn new_disaster(disaster: &List, recipients: Vec<Uuid>) -> Self {
        Self {
            kind: NotificationKind::NewDisaster,
            params: json!({
                "list": disaster.id,
                "label": disaster.label,
                "remoteId": disaster.remote_id,
            }),
            recipients,
        }
    }

    /// Reminder that a membership's declared departure date has passed.
    pub fn checkout_reminder(user: Uuid, check_in: &CheckIn) -> Self {
        Self {
            kind: NotificationKind::CheckoutReminder,
            params: json!({
                "checkIn": check_in.id,
                "list": check_in.list,
                "checkoutDate": check_in.checkout_date,
            }),
            recipients: vec![user],
        }
    }

    /// Summary of memberships closed by the automated checkout job.
    pub fn automated_checkout(user: Uuid, check_ins: &[&CheckIn]) -> Self {
        let lists: Vec<Uuid> = check_ins.iter().map(|check_in| check_in.list).collect();
        Self {
            kind: NotificationKind::AutomatedCheckout,
            params: json!({ "lists": lists }),
            recipients: vec![user],
        }
    }
}

define_port_error! {
    /// Errors raised by the notification collaborator.
    pub enum NotifierError {
        /// Dispatch could not be handed over.
        Dispatch { message: String } =>
            "notification dispatch failed: {message}",
    }
}

/// Port for handing dispatch records to the notification collaborator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Hand one dispatch record over. Delivery is at-least-once at best;
    /// failures are logged by callers and never retried within a run.
    async fn send(&self, notification: &Notification) -> Result<(), NotifierError>;
}

/// Fixture implementation swallowing every dispatch.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureNotifier;

#[async_trait]
impl Notifier for FixtureNotifier {
    async fn send(&self, _notification: &Notification) -> Result<(), NotifierError> {
        Ok(())
    }
}
