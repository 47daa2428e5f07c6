//! Stale-profile reminder job.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use serde_json::json;

use crate::domain::Error;
use crate::domain::ports::{ReminderMailer, UserRepository, UserStream, UserStreamFilter};
use crate::domain::scheduler::{Job, JobReport};
use crate::domain::stream::drain_serially;
use crate::domain::user::{UPDATE_REMINDER_STALE_DAYS, User};

/// Streams accounts untouched for half a year and asks for a refresh.
pub struct UpdateReminderJob {
    streams: Arc<dyn UserStream>,
    users: Arc<dyn UserRepository>,
    mailer: Arc<dyn ReminderMailer>,
    clock: Arc<dyn Clock>,
}

impl UpdateReminderJob {
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
        if !user.needs_update_reminder(now) {
            return Ok(());
        }
        self.mailer
            .send_update_reminder(&user)
            .await
            .map_err(|error| Error::service_unavailable(error.to_string()))?;
        self.users
            .record_update_reminder(user.id, now)
            .await
            .map_err(|error| Error::internal(error.to_string()))?;
        sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl Job for UpdateReminderJob {
    fn name(&self) -> &'static str {
        "update-reminder"
    }

    async fn run(&self) -> Result<JobReport, Error> {
        let now = self.clock.utc();
        let cutoff = now - TimeDelta::days(UPDATE_REMINDER_STALE_DAYS);
        let sent = AtomicU64::new(0);

        let summary = drain_serially(
            self.streams.stream(UserStreamFilter::NotUpdatedSince(cutoff)),
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
