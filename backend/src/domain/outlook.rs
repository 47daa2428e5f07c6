//! Contact-folder sync target descriptors.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Binding of a local list to one remote contact folder, plus the user whose
/// OAuth grant reaches it.
///
/// The descriptor owns no membership data. It is created by a user action
/// outside this subsystem and self-deleted by the synchronizer when the
/// remote folder no longer exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlookSync {
    pub id: Uuid,
    /// The synchronized [`super::List`].
    pub list: Uuid,
    /// Remote contact-folder identifier.
    pub folder: String,
    /// Owner of the OAuth grant used for all calls against this folder.
    pub user: Uuid,
}
