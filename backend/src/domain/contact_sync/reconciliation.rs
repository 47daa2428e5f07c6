//! Reconciliation key binding a remote contact to a local user.
//!
//! The remote contact API offers no custom-field storage, so the key is
//! written verbatim into the contact's free-text notes field and matched
//! exactly on the way back. The mapping lives here and nowhere else.

use uuid::Uuid;

const NOTES_PREFIX: &str = "rollcall-id:";

/// Identity tag for one local user inside a remote contact folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconciliationKey {
    user: Uuid,
}

impl ReconciliationKey {
    /// Key for the given local user.
    pub const fn for_user(user: Uuid) -> Self {
        Self { user }
    }

    /// Value stored in the remote notes field.
    pub fn as_notes(&self) -> String {
        format!("{NOTES_PREFIX}{}", self.user)
    }

    /// Exact match against a remote notes field. Leading and trailing
    /// whitespace is tolerated because some clients rewrite the field.
    pub fn matches(&self, notes: Option<&str>) -> bool {
        notes.is_some_and(|value| value.trim() == self.as_notes())
    }
}
