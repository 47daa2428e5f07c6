//! User aggregate and the lifecycle eligibility rules it owns.
//!
//! The reminder jobs are pure iteration-and-dispatch drivers; every
//! time-based eligibility decision lives here so it can be unit tested with
//! a fixed clock.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::list::ListKind;

/// Minimum account age before the first verification reminder.
pub const VERIFY_REMINDER_MIN_AGE_HOURS: i64 = 48;
/// Spacing between verification reminders.
pub const VERIFY_REMINDER_SPACING_DAYS: i64 = 7;
/// Maximum number of verification reminders per account.
pub const VERIFY_REMINDER_LIMIT: u32 = 3;
/// A profile untouched for this long is considered stale.
pub const UPDATE_REMINDER_STALE_DAYS: i64 = 183;
/// Delay after a membership's checkout date before reminding.
pub const CHECKOUT_REMINDER_DELAY_HOURS: i64 = 48;
/// Grace period after the checkout date before automated checkout.
pub const AUTO_CHECKOUT_GRACE_DAYS: i64 = 14;

/// One email address attached to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEmail {
    pub email: String,
    /// Whether ownership of the address has been confirmed.
    pub validated: bool,
}

/// A membership join record binding a user to a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckIn {
    pub id: Uuid,
    /// Identifier of the joined [`super::List`].
    pub list: Uuid,
    /// Planned departure date, when the user declared one.
    pub checkout_date: Option<DateTime<Utc>>,
    /// Whether the departure reminder was already sent.
    pub reminded_checkout: bool,
    /// Whether the membership has been closed.
    pub checked_out: bool,
}

impl CheckIn {
    /// Create an open membership for a list.
    pub fn new(list: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            list,
            checkout_date: None,
            reminded_checkout: false,
            checked_out: false,
        }
    }

    /// The declared departure date has passed by the reminder delay and no
    /// reminder has been sent yet.
    pub fn needs_checkout_reminder(&self, now: DateTime<Utc>) -> bool {
        if self.checked_out || self.reminded_checkout {
            return false;
        }
        self.checkout_date.is_some_and(|departure| {
            now - departure >= TimeDelta::hours(CHECKOUT_REMINDER_DELAY_HOURS)
        })
    }

    /// The declared departure date has passed by the grace period and the
    /// membership is still open.
    pub fn checkout_overdue(&self, now: DateTime<Utc>) -> bool {
        if self.checked_out {
            return false;
        }
        self.checkout_date
            .is_some_and(|departure| now - departure >= TimeDelta::days(AUTO_CHECKOUT_GRACE_DAYS))
    }
}

/// Membership collections keyed by list kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckIns {
    pub operations: Vec<CheckIn>,
    pub bundles: Vec<CheckIn>,
    pub disasters: Vec<CheckIn>,
    pub organizations: Vec<CheckIn>,
    pub offices: Vec<CheckIn>,
}

impl CheckIns {
    /// Iterate every membership regardless of kind.
    pub fn iter(&self) -> impl Iterator<Item = &CheckIn> {
        self.operations
            .iter()
            .chain(self.bundles.iter())
            .chain(self.disasters.iter())
            .chain(self.organizations.iter())
            .chain(self.offices.iter())
    }

    /// Mutable counterpart of [`CheckIns::iter`].
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut CheckIn> {
        self.operations
            .iter_mut()
            .chain(self.bundles.iter_mut())
            .chain(self.disasters.iter_mut())
            .chain(self.organizations.iter_mut())
            .chain(self.offices.iter_mut())
    }

    /// Memberships for one list kind. User-defined lists and offices share
    /// the `offices` collection; remote kinds map one-to-one.
    pub fn of_kind_mut(&mut self, kind: ListKind) -> &mut Vec<CheckIn> {
        match kind {
            ListKind::Operation => &mut self.operations,
            ListKind::Bundle => &mut self.bundles,
            ListKind::Disaster => &mut self.disasters,
            ListKind::Organization => &mut self.organizations,
            ListKind::List => &mut self.offices,
        }
    }
}

/// Long-lived directory account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub given_name: String,
    pub family_name: String,
    pub emails: Vec<UserEmail>,
    pub phone_numbers: Vec<String>,
    pub organization: Option<String>,
    pub job_title: Option<String>,
    pub check_ins: CheckIns,
    pub email_verified: bool,
    /// When the last verification reminder was sent.
    pub reminded_verify: Option<DateTime<Utc>>,
    pub times_reminded_verify: u32,
    /// When the last stale-profile reminder was sent.
    pub reminded_update: Option<DateTime<Utc>>,
    /// Creator of the account when it was registered on someone's behalf;
    /// `None` means the account is not orphaned.
    pub created_by: Option<Uuid>,
    /// Refresh token for the user's mailbox OAuth grant, when one exists.
    pub outlook_refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Minimal account used as a starting point by tests and seeding.
    pub fn new(given_name: impl Into<String>, family_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            given_name: given_name.into(),
            family_name: family_name.into(),
            emails: Vec::new(),
            phone_numbers: Vec::new(),
            organization: None,
            job_title: None,
            check_ins: CheckIns::default(),
            email_verified: false,
            reminded_verify: None,
            times_reminded_verify: 0,
            reminded_update: None,
            created_by: None,
            outlook_refresh_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The account was registered on someone's behalf and has never been
    /// claimed.
    pub fn is_orphan(&self) -> bool {
        self.created_by.is_some()
    }

    /// At least one email address has confirmed ownership.
    pub fn has_verified_email(&self) -> bool {
        self.emails.iter().any(|entry| entry.validated)
    }

    /// Addresses with confirmed ownership, used for outbound contact sync.
    pub fn validated_emails(&self) -> impl Iterator<Item = &str> {
        self.emails
            .iter()
            .filter(|entry| entry.validated)
            .map(|entry| entry.email.as_str())
    }

    /// Whether this account is a member of the given list.
    pub fn is_member_of(&self, list: Uuid) -> bool {
        self.check_ins
            .iter()
            .any(|check_in| check_in.list == list && !check_in.checked_out)
    }

    /// Eligibility rule for the verification reminder job.
    ///
    /// Orphaned accounts are excluded; the account must be old enough, under
    /// the reminder cap, and past the spacing window since the last reminder.
    pub fn needs_verify_reminder(&self, now: DateTime<Utc>) -> bool {
        if self.email_verified || self.is_orphan() {
            return false;
        }
        if self.times_reminded_verify >= VERIFY_REMINDER_LIMIT {
            return false;
        }
        if now - self.created_at < TimeDelta::hours(VERIFY_REMINDER_MIN_AGE_HOURS) {
            return false;
        }
        match self.reminded_verify {
            None => true,
            Some(last) => now - last >= TimeDelta::days(VERIFY_REMINDER_SPACING_DAYS),
        }
    }

    /// Eligibility rule for the stale-profile reminder job.
    ///
    /// Fires once per stale period: a reminder sent after the last profile
    /// update suppresses further sends until the user touches the profile
    /// again.
    pub fn needs_update_reminder(&self, now: DateTime<Utc>) -> bool {
        if now - self.updated_at < TimeDelta::days(UPDATE_REMINDER_STALE_DAYS) {
            return false;
        }
        match self.reminded_update {
            None => true,
            Some(reminded) => reminded < self.updated_at,
        }
    }

    /// Memberships whose checkout is overdue for automated closing.
    pub fn overdue_check_ins(&self, now: DateTime<Utc>) -> Vec<&CheckIn> {
        self.check_ins
            .iter()
            .filter(|check_in| check_in.checkout_overdue(now))
            .collect()
    }
}
