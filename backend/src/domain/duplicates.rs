//! Duplicate detector: scans every user for shared email addresses.
//!
//! Streams the whole user collection through the serialized driver and
//! appends one [`Duplicate`] group per colliding address. Groups are an
//! append-only audit log: repeated runs produce overlapping groups by
//! default. `dedupe_within_run` suppresses repeat groups for the same
//! address within a single run without changing the default behaviour.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::info;

use super::Error;
use super::duplicate::Duplicate;
use super::ports::{DuplicateRepository, UserRepository, UserStream, UserStreamFilter};
use super::scheduler::{Job, JobReport};
use super::stream::drain_serially;
use super::user::User;

/// Detector behaviour toggles.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateDetectorConfig {
    /// Skip addresses already grouped earlier in the same run.
    pub dedupe_within_run: bool,
}

/// Totals for one detector run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectorOutcome {
    /// Users pulled from the stream.
    pub scanned: u64,
    /// Duplicate groups appended.
    pub groups: u64,
    /// Records dropped by per-record failures.
    pub failed: u64,
}

/// Port bundle required by the detector.
pub struct DuplicateDetectorPorts {
    /// Streaming access to the full user collection.
    pub streams: Arc<dyn UserStream>,
    /// Point queries for email collisions.
    pub users: Arc<dyn UserRepository>,
    /// Append-only duplicate log.
    pub duplicates: Arc<dyn DuplicateRepository>,
}

/// Streams all users and groups identities sharing an email address.
pub struct DuplicateDetector {
    streams: Arc<dyn UserStream>,
    users: Arc<dyn UserRepository>,
    duplicates: Arc<dyn DuplicateRepository>,
    clock: Arc<dyn Clock>,
    config: DuplicateDetectorConfig,
}

impl DuplicateDetector {
    /// Build a detector from its ports.
    pub fn new(
        ports: DuplicateDetectorPorts,
        clock: Arc<dyn Clock>,
        config: DuplicateDetectorConfig,
    ) -> Self {
        Self {
            streams: ports.streams,
            users: ports.users,
            duplicates: ports.duplicates,
            clock,
            config,
        }
    }

    /// Execute one full scan.
    pub async fn sweep(&self) -> Result<DetectorOutcome, Error> {
        let groups = AtomicU64::new(0);
        let grouped_emails: Mutex<HashSet<String>> = Mutex::new(HashSet::new());

        let summary = drain_serially(
            self.streams.stream(UserStreamFilter::All),
            "duplicate-detect",
            |user| self.scan_user(user, &groups, &grouped_emails),
        )
        .await;

        let outcome = DetectorOutcome {
            scanned: summary.processed + summary.failed,
            groups: groups.load(Ordering::SeqCst),
            failed: summary.failed,
        };
        info!(
            scanned = outcome.scanned,
            groups = outcome.groups,
            failed = outcome.failed,
            "duplicate detection finished",
        );
        Ok(outcome)
    }

    async fn scan_user(
        &self,
        user: User,
        groups: &AtomicU64,
        grouped_emails: &Mutex<HashSet<String>>,
    ) -> Result<(), Error> {
        for entry in &user.emails {
            if self.config.dedupe_within_run {
                let seen = grouped_emails
                    .lock()
                    .map_err(|_| Error::internal("grouped email set poisoned"))?
                    .contains(&entry.email);
                if seen {
                    continue;
                }
            }

            let matches = self
                .users
                .find_by_email(&entry.email)
                .await
                .map_err(|error| Error::internal(error.to_string()))?;
            if matches.len() <= 1 {
                continue;
            }

            let duplicate = Duplicate {
                user: user.id,
                duplicates: matches.iter().map(|matched| matched.id).collect(),
                email: entry.email.clone(),
                detected_at: self.clock.utc(),
            };
            self.duplicates
                .insert(&duplicate)
                .await
                .map_err(|error| Error::internal(error.to_string()))?;
            groups.fetch_add(1, Ordering::SeqCst);

            if self.config.dedupe_within_run {
                grouped_emails
                    .lock()
                    .map_err(|_| Error::internal("grouped email set poisoned"))?
                    .insert(entry.email.clone());
            }
        }
        Ok(())
    }
}

#[async_trait]
impl Job for DuplicateDetector {
    fn name(&self) -> &'static str {
        "duplicate-detect"
    }

    async fn run(&self) -> Result<JobReport, Error> {
        let outcome = self.sweep().await?;
        Ok(JobReport::new(
            self.name(),
            json!({
                "scanned": outcome.scanned,
                "groups": outcome.groups,
                "failed": outcome.failed,
            }),
        ))
    }
}
