//! Automated checkout job.

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

/// Closes memberships whose departure date expired past the grace period.
pub struct AutoCheckoutJob {
    streams: Arc<dyn UserStream>,
    users: Arc<dyn UserRepository>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl AutoCheckoutJob {
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

    async fn close_overdue(
        &self,
        user: User,
        now: DateTime<Utc>,
        closed: &AtomicU64,
    ) -> Result<(), Error> {
        let overdue = user.overdue_check_ins(now);
        if overdue.is_empty() {
            return Ok(());
        }
        // One summary per user, then the individual closes. A failure between
        // the two leaves the memberships open for the next run.
        self.notifier
            .send(&Notification::automated_checkout(user.id, &overdue))
            .await
            .map_err(|error| Error::service_unavailable(error.to_string()))?;
        for check_in in overdue {
            self.users
                .mark_checked_out(user.id, check_in.id)
                .await
                .map_err(|error| Error::internal(error.to_string()))?;
            closed.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

#[async_trait]
impl Job for AutoCheckoutJob {
    fn name(&self) -> &'static str {
        "auto-checkout"
    }

    async fn run(&self) -> Result<JobReport, Error> {
        let now = self.clock.utc();
        let closed = AtomicU64::new(0);

        let summary = drain_serially(
            self.streams.stream(UserStreamFilter::All),
            self.name(),
            |user| self.close_overdue(user, now, &closed),
        )
        .await;

        Ok(JobReport::new(
            self.name(),
            json!({
                "processed": summary.processed,
                "failed": summary.failed,
                "closed": closed.load(Ordering::SeqCst),
            }),
        ))
    }
}
