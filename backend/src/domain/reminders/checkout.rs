//! Checkout reminder job.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde_json::json;

use crate::domain::Error;
use crate::domain::ports::{Notification, Notifier, UserRepository, UserStream, UserStreamFilter};
use crate::domain::scheduler::{Job, JobReport};
use crate::domain::stream::drain_serially;
use crate::domain::user::User;

/// Reminds members whose declared departure date has passed.
pub struct CheckoutReminderJob {
    streams: Arc<dyn UserStream>,
    users: Arc<dyn UserRepository>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl CheckoutReminderJob {
    /// Build the job from its ports.
    pub fn new(
        streams: Arc<dyn UserStream>,
        users: Arc<dyn UserRepository>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            streams,
            users,
            notifier,
            clock,
        }
    }

    async fn remind(
        &self,
        user: User,
        now: DateTime<Utc>,
        reminded: &AtomicU64,
    ) -> Result<(), Error> {
        // Reminders go to reachable accounts only; memberships stay pending
        // and the automated checkout still closes them later.
        if !user.has_verified_email() {
            return Ok(());
        }
        for check_in in user.check_ins.iter() {
            if !check_in.needs_checkout_reminder(now) {
                continue;
            }
            self.notifier
                .send(&Notification::checkout_reminder(user.id, check_in))
                .await
                .map_err(|error| Error::service_unavailable(error.to_string()))?;
            self.users
                .mark_checkout_reminded(user.id, check_in.id)
                .await
                .map_err(|error| Error::internal(error.to_string()))?;
            reminded.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

#[async_trait]
impl Job for CheckoutReminderJob {
    fn name(&self) -> &'static str {
        "checkout-reminder"
    }

    async fn run(&self) -> Result<JobReport, Error> {
        let now = self.clock.utc();
        let reminded = AtomicU64::new(0);

        let summary = drain_serially(
            self.streams.stream(UserStreamFilter::CheckoutRemindable),
            self.name(),
            |user| self.remind(user, now, &reminded),
        )
        .await;

        Ok(JobReport::new(
            self.name(),
            json!({
                "processed": summary.processed,
                "failed": summary.failed,
                "reminded": reminded.load(Ordering::SeqCst),
            }),
        ))
    }
}
