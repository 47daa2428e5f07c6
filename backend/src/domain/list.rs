//! Local `List` entities mirroring remote organizational groupings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Category of a list.
///
/// Remote-backed kinds (`Operation`, `Bundle`, `Disaster`, `Organization`)
/// are materialized by the directory importer; `List` is user-defined and
/// never imported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    List,
    Organization,
    Operation,
    Bundle,
    Disaster,
}

impl ListKind {
    /// Stable lowercase identifier used in logs and payloads.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Organization => "organization",
            Self::Operation => "operation",
            Self::Bundle => "bundle",
            Self::Disaster => "disaster",
        }
    }
}

impl std::fmt::Display for ListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who may see a list and its membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Visible to every account.
    All,
    /// Restricted to verified accounts.
    Verified,
}

/// Who may join a list without moderation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Joinability {
    Public,
    Moderated,
}

/// A local record mirroring a remote organizational grouping, or a
/// user-defined list.
///
/// ## Invariants
/// - At most one list exists per `(kind, remote_id)` pair; the importer's
///   existence check before insert is the sole enforcement (see DESIGN.md on
///   the concurrent-run race).
/// - A bundle's label is derived from its parent operation's label at
///   creation time and never re-derived afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub id: Uuid,
    pub kind: ListKind,
    /// Identifier of the remote record this list mirrors; `None` for
    /// user-defined lists.
    pub remote_id: Option<String>,
    pub label: String,
    pub acronym: Option<String>,
    pub visibility: Visibility,
    pub joinability: Joinability,
    /// Raw remote payload retained for downstream consumers.
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

impl List {
    /// Build a list mirroring a remote record.
    pub fn from_remote(
        kind: ListKind,
        remote_id: impl Into<String>,
        label: impl Into<String>,
        acronym: Option<String>,
        visibility: Visibility,
        metadata: Value,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            remote_id: Some(remote_id.into()),
            label: label.into(),
            acronym,
            visibility,
            joinability: Joinability::Public,
            metadata,
            created_at,
        }
    }
}
