//! Email-verification reminder job.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde_json::json;

use crate::domain::Error;
use crate::domain::ports::{ReminderMailer, UserRepository, UserStream, UserStreamFilter};
use crate::domain::scheduler::{Job, JobReport};
use crate::domain::stream::drain_serially;
use crate::domain::user::User;

/// Streams unverified accounts and nudges the eligible ones.
pub struct VerifyReminderJob {
    streams: Arc<dyn UserStream>,
    users: Arc<dyn UserRepository>,
    mailer: Arc<dyn ReminderMailer>,
    clock: Arc<dyn Clock>,
}

impl VerifyReminderJob {
    /// Build the job from its ports.
    pub fn new(
        streams: Arc<dyn UserStream>,
        users: Arc<dyn UserRepository>,
        mailer: Arc<dyn ReminderMailer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            streams,
            users,
            mailer,
            clock,
        }
    }

    async fn remind(
        &self,
        user: User,
        now: DateTime<Utc>,
        sent: &AtomicU64,
    ) -> Result<(), Error> {
        if !user.needs_verify_reminder(now) {
            return Ok(());
        }
        self.mailer
            .send_verify_reminder(&user)
            .await
            .map_err(|error| Error::service_unavailable(error.to_string()))?;
        // Bookkeeping happens only after a successful send so a transport
        // failure leaves the user eligible for the next run.
        self.users
            .record_verify_reminder(user.id, now)
            .await
            .map_err(|error| Error::internal(error.to_string()))?;
        sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl Job for VerifyReminderJob {
    fn name(&self) -> &'static str {
        "verify-reminder"
    }

    async fn run(&self) -> Result<JobReport, Error> {
        let now = self.clock.utc();
        let sent = AtomicU64::new(0);

        let summary = drain_serially(
            self.streams.stream(UserStreamFilter::Unverified),
            self.name(),
            |user| self.remind(user, now, &sent),
        )
        .await;

        Ok(JobReport::new(
            self.name(),
            json!({
                "processed": summary.processed,
                "failed": summary.failed,
                "sent": sent.load(Ordering::SeqCst),
            }),
        ))
    }
}
