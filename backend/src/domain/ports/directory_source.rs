//! Driven port for the remote organizational-directory API.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use super::define_port_error;
use crate::domain::list::ListKind;

/// Remote collection kinds the importer pages through, in import order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteRecordKind {
    Operation,
    Bundle,
    Disaster,
    Organization,
}

impl RemoteRecordKind {
    /// Fixed processing order of one importer run.
    pub const IMPORT_ORDER: [Self; 4] = [
        Self::Operation,
        Self::Bundle,
        Self::Disaster,
        Self::Organization,
    ];

    /// Stable lowercase identifier used in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Operation => "operation",
            Self::Bundle => "bundle",
            Self::Disaster => "disaster",
            Self::Organization => "organization",
        }
    }

    /// Plural path segment of the remote collection endpoint.
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Operation => "operations",
            Self::Bundle => "bundles",
            Self::Disaster => "disasters",
            Self::Organization => "organizations",
        }
    }

    /// Organizations are always fetched in full; every other kind is bounded
    /// by the created-after watermark.
    pub const fn filters_by_created(self) -> bool {
        !matches!(self, Self::Organization)
    }

    /// Local list kind materialized from this remote collection.
    pub const fn list_kind(self) -> ListKind {
        match self {
            Self::Operation => ListKind::Operation,
            Self::Bundle => ListKind::Bundle,
            Self::Disaster => ListKind::Disaster,
            Self::Organization => ListKind::Organization,
        }
    }
}

impl std::fmt::Display for RemoteRecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the remote record restricts access to verified accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemoteAccess {
    #[default]
    Open,
    Closed,
}

/// One decoded item from a remote collection page.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRecord {
    /// Remote identifier, kept verbatim as a string.
    pub id: String,
    pub label: String,
    pub acronym: Option<String>,
    /// Lifecycle status as reported remotely (`active`, `inactive`, ...).
    pub status: Option<String>,
    pub access: RemoteAccess,
    pub created: DateTime<Utc>,
    /// Remote operation identifiers referenced by this record: the parent
    /// operation for bundles, the affected operations for disasters.
    pub operation_ids: Vec<String>,
    /// Raw remote payload, stored on the materialized list.
    pub metadata: Value,
}

/// One page of a remote collection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DirectoryPage {
    pub items: Vec<RemoteRecord>,
    /// Whether a further page exists.
    pub next: bool,
}

define_port_error! {
    /// Errors raised while fetching a remote collection page.
    pub enum DirectorySourceError {
        /// Network-level failure reaching the remote directory.
        Transport { message: String } =>
            "directory request failed: {message}",
        /// The response body was not the expected JSON shape.
        Decode { message: String } =>
            "directory response could not be decoded: {message}",
        /// The remote directory answered with a non-success status.
        Status { code: u16, message: String } =>
            "directory answered status {code}: {message}",
    }
}

/// Port for paging through remote directory collections.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectorySource: Send + Sync {
    /// Fetch one page of `kind`, optionally bounded to records created after
    /// the watermark. Page numbering starts at 1.
    async fn fetch_page(
        &self,
        kind: RemoteRecordKind,
        page: u32,
        created_after: Option<DateTime<Utc>>,
    ) -> Result<DirectoryPage, DirectorySourceError>;
}

/// Fixture implementation returning an empty, final page.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureDirectorySource;

#[async_trait]
impl DirectorySource for FixtureDirectorySource {
    async fn fetch_page(
        &self,
        _kind: RemoteRecordKind,
        _page: u32,
        _created_after: Option<DateTime<Utc>>,
    ) -> Result<DirectoryPage, DirectorySourceError> {
        Ok(DirectoryPage::default())
    }
}
