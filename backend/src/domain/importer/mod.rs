//! Directory importer: materializes remote directory records as local lists.
//!
//! One run pages through the remote collections in a fixed order, upserting
//! a list per unseen `(kind, remote_id)` and fanning out a notification when
//! a disaster is seen for the first time. The existence check before insert
//! is the sole de-duplication mechanism; it reads current store state rather
//! than taking a transactional reservation, so concurrent runs can race
//! (see DESIGN.md).

use std::pin::pin;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use futures_util::StreamExt;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use super::Error;
use super::fetcher::{FetcherConfig, PaginatedFetcher};
use super::list::{List, ListKind, Visibility};
use super::ports::{
    DirectorySource, ListRepository, Notification, Notifier, RemoteAccess, RemoteRecord,
    RemoteRecordKind, Sleeper, UserRepository, WatermarkStore,
};
use super::scheduler::{Job, JobReport};

/// Disasters older than this are not imported.
pub const DISASTER_MAX_AGE_DAYS: i64 = 730;

/// Port bundle required by the importer.
pub struct DirectoryImporterPorts {
    /// Remote directory API adapter.
    pub source: Arc<dyn DirectorySource>,
    /// List persistence adapter.
    pub lists: Arc<dyn ListRepository>,
    /// User queries for disaster fan-out.
    pub users: Arc<dyn UserRepository>,
    /// Notification collaborator.
    pub notifier: Arc<dyn Notifier>,
}

/// Importer pacing configuration.
#[derive(Debug, Clone, Default)]
pub struct DirectoryImporterConfig {
    /// Pagination pacing and cutoff.
    pub fetcher: FetcherConfig,
}

/// Totals for one completed import run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Watermark the caller should persist for the next run.
    pub new_watermark: DateTime<Utc>,
    /// Lists created this run.
    pub created: u64,
    /// Items whose `(kind, remote_id)` already existed.
    pub existing: u64,
    /// Items excluded by the age or status filters.
    pub filtered: u64,
    /// Items dropped by per-record store failures.
    pub failed: u64,
}

enum ItemOutcome {
    Created,
    Existing,
    Filtered,
}

/// Pulls paginated remote records and idempotently materializes lists.
pub struct DirectoryImporter {
    source: Arc<dyn DirectorySource>,
    lists: Arc<dyn ListRepository>,
    users: Arc<dyn UserRepository>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn Sleeper>,
    config: DirectoryImporterConfig,
}

impl DirectoryImporter {
    /// Build an importer from its ports.
    pub fn new(
        ports: DirectoryImporterPorts,
        clock: Arc<dyn Clock>,
        sleeper: Arc<dyn Sleeper>,
        config: DirectoryImporterConfig,
    ) -> Self {
        Self {
            source: ports.source,
            lists: ports.lists,
            users: ports.users,
            notifier: ports.notifier,
            clock,
            sleeper,
            config,
        }
    }

    /// Execute one import run bounded by `watermark` (`None` imports
    /// everything). Returns the watermark to persist for the next run.
    ///
    /// Kinds are processed in the fixed order operation, bundle, disaster,
    /// organization; pages within a kind in ascending order. Per-record
    /// failures are logged and skipped.
    pub async fn run(&self, watermark: Option<DateTime<Utc>>) -> Result<ImportOutcome, Error> {
        let fetcher = PaginatedFetcher::new(
            Arc::clone(&self.source),
            Arc::clone(&self.sleeper),
            self.config.fetcher.clone(),
        );

        let mut created = 0_u64;
        let mut existing = 0_u64;
        let mut filtered = 0_u64;
        let mut failed = 0_u64;

        for kind in RemoteRecordKind::IMPORT_ORDER {
            let created_after = watermark.filter(|_| kind.filters_by_created());
            let mut pages = pin!(fetcher.pages(kind, created_after));
            while let Some(items) = pages.next().await {
                for item in items {
                    let remote_id = item.id.clone();
                    match self.import_item(kind, item).await {
                        Ok(ItemOutcome::Created) => created += 1,
                        Ok(ItemOutcome::Existing) => existing += 1,
                        Ok(ItemOutcome::Filtered) => filtered += 1,
                        Err(error) => {
                            failed += 1;
                            warn!(
                                kind = kind.as_str(),
                                remote_id,
                                error = %error,
                                "record import failed; run continues",
                            );
                        }
                    }
                }
            }
        }

        let outcome = ImportOutcome {
            new_watermark: self.clock.utc(),
            created,
            existing,
            filtered,
            failed,
        };
        info!(
            created = outcome.created,
            existing = outcome.existing,
            filtered = outcome.filtered,
            failed = outcome.failed,
            "directory import finished",
        );
        Ok(outcome)
    }

    async fn import_item(
        &self,
        kind: RemoteRecordKind,
        item: RemoteRecord,
    ) -> Result<ItemOutcome, Error> {
        if self.is_filtered(kind, &item) {
            return Ok(ItemOutcome::Filtered);
        }

        let list_kind = kind.list_kind();
        let already = self
            .lists
            .find_by_remote(list_kind, &item.id)
            .await
            .map_err(|error| Error::internal(error.to_string()))?;
        if already.is_some() {
            return Ok(ItemOutcome::Existing);
        }

        let label = self.derive_label(kind, &item).await;
        let visibility = match item.access {
            RemoteAccess::Closed => Visibility::Verified,
            RemoteAccess::Open => Visibility::All,
        };
        let list = List::from_remote(
            list_kind,
            item.id.clone(),
            label,
            item.acronym.clone(),
            visibility,
            item.metadata.clone(),
            self.clock.utc(),
        );
        self.lists
            .insert(&list)
            .await
            .map_err(|error| Error::internal(error.to_string()))?;

        if kind == RemoteRecordKind::Disaster {
            self.announce_disaster(&list, &item).await;
        }

        Ok(ItemOutcome::Created)
    }

    fn is_filtered(&self, kind: RemoteRecordKind, item: &RemoteRecord) -> bool {
        match kind {
            RemoteRecordKind::Disaster => {
                self.clock.utc() - item.created >= TimeDelta::days(DISASTER_MAX_AGE_DAYS)
            }
            RemoteRecordKind::Operation => item.status.as_deref() == Some("inactive"),
            _ => false,
        }
    }

    /// A bundle's label carries its parent operation's label, resolved once
    /// at creation and never re-derived.
    async fn derive_label(&self, kind: RemoteRecordKind, item: &RemoteRecord) -> String {
        if kind != RemoteRecordKind::Bundle {
            return item.label.clone();
        }
        let Some(parent_remote) = item.operation_ids.first() else {
            return item.label.clone();
        };
        match self
            .lists
            .find_by_remote(ListKind::Operation, parent_remote)
            .await
        {
            Ok(Some(parent)) => format!("{}: {}", parent.label, item.label),
            Ok(None) => item.label.clone(),
            Err(error) => {
                warn!(
                    remote_id = item.id,
                    error = %error,
                    "bundle parent lookup failed; using bare label",
                );
                item.label.clone()
            }
        }
    }

    /// Notify the members of every operation the new disaster references.
    /// Fan-out failures are isolated per operation.
    async fn announce_disaster(&self, disaster: &List, item: &RemoteRecord) {
        for operation_remote in &item.operation_ids {
            let members = match self.operation_members(operation_remote).await {
                Ok(members) => members,
                Err(error) => {
                    warn!(
                        disaster = %disaster.id,
                        operation = operation_remote,
                        error = %error,
                        "disaster fan-out lookup failed",
                    );
                    continue;
                }
            };
            if members.is_empty() {
                continue;
            }
            let notification = Notification::new_disaster(disaster, members);
            if let Err(error) = self.notifier.send(&notification).await {
                warn!(
                    disaster = %disaster.id,
                    operation = operation_remote,
                    error = %error,
                    "disaster notification dispatch failed",
                );
            }
        }
    }

    async fn operation_members(&self, operation_remote: &str) -> Result<Vec<uuid::Uuid>, Error> {
        let Some(operation) = self
            .lists
            .find_by_remote(ListKind::Operation, operation_remote)
            .await
            .map_err(|error| Error::internal(error.to_string()))?
        else {
            return Ok(Vec::new());
        };
        let members = self
            .users
            .members_of_list(operation.id)
            .await
            .map_err(|error| Error::internal(error.to_string()))?;
        Ok(members.into_iter().map(|user| user.id).collect())
    }
}

/// Scheduler adapter binding the importer to its persisted watermark.
pub struct ImporterJob {
    importer: DirectoryImporter,
    watermarks: Arc<dyn WatermarkStore>,
}

impl ImporterJob {
    /// Bind an importer to a watermark store.
    pub fn new(importer: DirectoryImporter, watermarks: Arc<dyn WatermarkStore>) -> Self {
        Self {
            importer,
            watermarks,
        }
    }
}

#[async_trait]
impl Job for ImporterJob {
    fn name(&self) -> &'static str {
        "directory-import"
    }

    async fn run(&self) -> Result<JobReport, Error> {
        let watermark = self
            .watermarks
            .load()
            .await
            .map_err(|error| Error::internal(error.to_string()))?;
        let outcome = self.importer.run(watermark).await?;
        self.watermarks
            .store(outcome.new_watermark)
            .await
            .map_err(|error| Error::internal(error.to_string()))?;
        Ok(JobReport::new(
            self.name(),
            json!({
                "created": outcome.created,
                "existing": outcome.existing,
                "filtered": outcome.filtered,
                "failed": outcome.failed,
                "watermark": outcome.new_watermark,
            }),
        ))
    }
}
