//! Duplicate-identity bookkeeping records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One detected collision on a single email address.
///
/// Records are append-only: repeated detector runs are expected to produce
/// overlapping groups, and nothing deduplicates them after the fact. The
/// collection is an audit log, not a set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Duplicate {
    /// The user whose scan produced this group.
    pub user: Uuid,
    /// Every account matching the colliding address, subject included.
    pub duplicates: Vec<Uuid>,
    /// The colliding address.
    pub email: String,
    pub detected_at: DateTime<Utc>,
}
