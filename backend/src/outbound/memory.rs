//! In-memory store adapter.
//!
//! The engine treats the persistence layer as an external collaborator with
//! query/stream primitives; this adapter provides those primitives over
//! process memory for default wiring, demos, and tests. Guards are never
//! held across await points.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::stream::{self, BoxStream};
use uuid::Uuid;

use crate::domain::duplicate::Duplicate;
use crate::domain::list::{List, ListKind};
use crate::domain::outlook::OutlookSync;
use crate::domain::ports::{
    DuplicateRepository, DuplicateRepositoryError, ListRepository, ListRepositoryError,
    OutlookSyncRepository, OutlookSyncRepositoryError, UserRepository, UserRepositoryError,
    UserStream, UserStreamError, UserStreamFilter, WatermarkStore, WatermarkStoreError,
};
use crate::domain::user::User;

#[derive(Default)]
struct StoreInner {
    users: Vec<User>,
    lists: Vec<List>,
    duplicates: Vec<Duplicate>,
    outlook_syncs: Vec<OutlookSync>,
    watermark: Option<DateTime<Utc>>,
}

/// Shared in-memory document store implementing every repository port.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<StoreInner>>,
}

const POISONED: &str = "store lock poisoned";

impl InMemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a user.
    pub fn seed_user(&self, user: User) {
        let mut inner = self.inner.write().expect(POISONED);
        inner.users.retain(|existing| existing.id != user.id);
        inner.users.push(user);
    }

    /// Insert a list directly, bypassing the importer.
    pub fn seed_list(&self, list: List) {
        self.inner.write().expect(POISONED).lists.push(list);
    }

    /// Insert a sync descriptor.
    pub fn seed_sync(&self, sync: OutlookSync) {
        self.inner.write().expect(POISONED).outlook_syncs.push(sync);
    }

    /// Snapshot of every list.
    pub fn lists(&self) -> Vec<List> {
        self.inner.read().expect(POISONED).lists.clone()
    }

    /// Snapshot of every user.
    pub fn users(&self) -> Vec<User> {
        self.inner.read().expect(POISONED).users.clone()
    }

    /// Snapshot of the duplicate audit log.
    pub fn duplicates(&self) -> Vec<Duplicate> {
        self.inner.read().expect(POISONED).duplicates.clone()
    }

    /// Snapshot of the sync descriptors.
    pub fn outlook_syncs(&self) -> Vec<OutlookSync> {
        self.inner.read().expect(POISONED).outlook_syncs.clone()
    }

    fn matches_filter(user: &User, filter: UserStreamFilter) -> bool {
        match filter {
            UserStreamFilter::All => true,
            UserStreamFilter::Unverified => !user.email_verified,
            UserStreamFilter::NotUpdatedSince(cutoff) => user.updated_at <= cutoff,
            UserStreamFilter::CheckoutRemindable => {
                user.has_verified_email()
                    && user.check_ins.iter().any(|check_in| {
                        !check_in.checked_out
                            && !check_in.reminded_checkout
                            && check_in.checkout_date.is_some()
                    })
            }
        }
    }
}

#[async_trait]
impl ListRepository for InMemoryStore {
    async fn find_by_remote(
        &self,
        kind: ListKind,
        remote_id: &str,
    ) -> Result<Option<List>, ListRepositoryError> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ListRepositoryError::connection(POISONED))?;
        Ok(inner
            .lists
            .iter()
            .find(|list| list.kind == kind && list.remote_id.as_deref() == Some(remote_id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<List>, ListRepositoryError> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ListRepositoryError::connection(POISONED))?;
        Ok(inner.lists.iter().find(|list| list.id == id).cloned())
    }

    async fn insert(&self, list: &List) -> Result<(), ListRepositoryError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ListRepositoryError::connection(POISONED))?;
        inner.lists.push(list.clone());
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserRepositoryError> {
        let inner = self
            .inner
            .read()
            .map_err(|_| UserRepositoryError::connection(POISONED))?;
        Ok(inner.users.iter().find(|user| user.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Vec<User>, UserRepositoryError> {
        let inner = self
            .inner
            .read()
            .map_err(|_| UserRepositoryError::connection(POISONED))?;
        Ok(inner
            .users
            .iter()
            .filter(|user| user.emails.iter().any(|entry| entry.email == email))
            .cloned()
            .collect())
    }

    async fn members_of_list(&self, list: Uuid) -> Result<Vec<User>, UserRepositoryError> {
        let inner = self
            .inner
            .read()
            .map_err(|_| UserRepositoryError::connection(POISONED))?;
        Ok(inner
            .users
            .iter()
            .filter(|user| user.is_member_of(list))
            .cloned()
            .collect())
    }

    async fn record_verify_reminder(
        &self,
        user: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), UserRepositoryError> {
        self.update_user(user, |record| {
            record.reminded_verify = Some(at);
            record.times_reminded_verify += 1;
        })
    }

    async fn record_update_reminder(
        &self,
        user: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), UserRepositoryError> {
        self.update_user(user, |record| {
            record.reminded_update = Some(at);
        })
    }

    async fn mark_checkout_reminded(
        &self,
        user: Uuid,
        check_in: Uuid,
    ) -> Result<(), UserRepositoryError> {
        self.update_check_in(user, check_in, |membership| {
            membership.reminded_checkout = true;
        })
    }

    async fn mark_checked_out(
        &self,
        user: Uuid,
        check_in: Uuid,
    ) -> Result<(), UserRepositoryError> {
        self.update_check_in(user, check_in, |membership| {
            membership.checked_out = true;
        })
    }
}

impl InMemoryStore {
    fn update_user(
        &self,
        user: Uuid,
        mutate: impl FnOnce(&mut User),
    ) -> Result<(), UserRepositoryError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| UserRepositoryError::connection(POISONED))?;
        let record = inner
            .users
            .iter_mut()
            .find(|record| record.id == user)
            .ok_or_else(|| UserRepositoryError::missing(format!("user {user}")))?;
        mutate(record);
        Ok(())
    }

    fn update_check_in(
        &self,
        user: Uuid,
        check_in: Uuid,
        mutate: impl FnOnce(&mut crate::domain::user::CheckIn),
    ) -> Result<(), UserRepositoryError> {
        self.update_user(user, |record| {
            if let Some(membership) = record
                .check_ins
                .iter_mut()
                .find(|membership| membership.id == check_in)
            {
                mutate(membership);
            }
        })
    }
}

impl UserStream for InMemoryStore {
    fn stream(&self, filter: UserStreamFilter) -> BoxStream<'static, Result<User, UserStreamError>> {
        let snapshot: Vec<User> = match self.inner.read() {
            Ok(inner) => inner
                .users
                .iter()
                .filter(|user| Self::matches_filter(user, filter))
                .cloned()
                .collect(),
            Err(_) => {
                return Box::pin(stream::once(
                    async { Err(UserStreamError::cursor(POISONED)) },
                ));
            }
        };
        Box::pin(stream::iter(snapshot.into_iter().map(Ok)))
    }
}

#[async_trait]
impl DuplicateRepository for InMemoryStore {
    async fn insert(&self, duplicate: &Duplicate) -> Result<(), DuplicateRepositoryError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| DuplicateRepositoryError::connection(POISONED))?;
        inner.duplicates.push(duplicate.clone());
        Ok(())
    }
}

#[async_trait]
impl OutlookSyncRepository for InMemoryStore {
    async fn find_for_list(
        &self,
        list: Uuid,
    ) -> Result<Vec<OutlookSync>, OutlookSyncRepositoryError> {
        let inner = self
            .inner
            .read()
            .map_err(|_| OutlookSyncRepositoryError::connection(POISONED))?;
        Ok(inner
            .outlook_syncs
            .iter()
            .filter(|sync| sync.list == list)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<(), OutlookSyncRepositoryError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| OutlookSyncRepositoryError::connection(POISONED))?;
        inner.outlook_syncs.retain(|sync| sync.id != id);
        Ok(())
    }
}

#[async_trait]
impl WatermarkStore for InMemoryStore {
    async fn load(&self) -> Result<Option<DateTime<Utc>>, WatermarkStoreError> {
        let inner = self
            .inner
            .read()
            .map_err(|_| WatermarkStoreError::storage(POISONED))?;
        Ok(inner.watermark)
    }

    async fn store(&self, watermark: DateTime<Utc>) -> Result<(), WatermarkStoreError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| WatermarkStoreError::storage(POISONED))?;
        inner.watermark = Some(watermark);
        Ok(())
    }
}
