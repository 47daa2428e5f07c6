use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use uuid::Uuid;

use super::*;
use crate::domain::ports::{
    Notification, NotificationKind, Notifier, NotifierError, ReminderMailer, ReminderMailerError,
};
use crate::domain::scheduler::Job;
use crate::domain::user::{
    AUTO_CHECKOUT_GRACE_DAYS, CHECKOUT_REMINDER_DELAY_HOURS, CheckIn, UPDATE_REMINDER_STALE_DAYS,
    User, UserEmail, VERIFY_REMINDER_MIN_AGE_HOURS,
};
use crate::outbound::memory::InMemoryStore;
use crate::test_support::FixedClock;

fn run_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

#[derive(Default)]
struct RecordingMailer {
    verify: Mutex<Vec<Uuid>>,
    update: Mutex<Vec<Uuid>>,
    fail: bool,
}

#[async_trait::async_trait]
impl ReminderMailer for RecordingMailer {
    async fn send_verify_reminder(&self, user: &User) -> Result<(), ReminderMailerError> {
        if self.fail {
            return Err(ReminderMailerError::send("transport down"));
        }
        self.verify.lock().expect("mailer mutex").push(user.id);
        Ok(())
    }

    async fn send_update_reminder(&self, user: &User) -> Result<(), ReminderMailerError> {
        if self.fail {
            return Err(ReminderMailerError::send("transport down"));
        }
        self.update.lock().expect("mailer mutex").push(user.id);
        Ok(())
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifierError> {
        self.sent
            .lock()
            .expect("notifier mutex")
            .push(notification.clone());
        Ok(())
    }
}

fn aged_unverified_user() -> User {
    let mut user = User::new("Rita", "Moreno");
    user.created_at = run_now() - TimeDelta::hours(VERIFY_REMINDER_MIN_AGE_HOURS + 1);
    user.updated_at = user.created_at;
    user
}

fn verified_user() -> User {
    let mut user = User::new("Omar", "Haddad");
    user.emails.push(UserEmail {
        email: "omar@example.com".to_owned(),
        validated: true,
    });
    user.email_verified = true;
    user
}

mod verify_reminders {
    use super::*;

    fn job(store: &InMemoryStore, mailer: Arc<RecordingMailer>) -> VerifyReminderJob {
        VerifyReminderJob::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            mailer,
            Arc::new(FixedClock::new(run_now())),
        )
    }

    #[tokio::test]
    async fn eligible_accounts_are_mailed_and_bookkept() {
        let store = InMemoryStore::new();
        let user = aged_unverified_user();
        store.seed_user(user.clone());
        let mailer = Arc::new(RecordingMailer::default());

        let report = job(&store, mailer.clone()).run().await.expect("run");

        assert_eq!(report.details["sent"], 1);
        assert_eq!(*mailer.verify.lock().expect("mailer mutex"), vec![user.id]);
        let stored = &store.users()[0];
        assert_eq!(stored.reminded_verify, Some(run_now()));
        assert_eq!(stored.times_reminded_verify, 1);
    }

    #[tokio::test]
    async fn fresh_and_orphaned_accounts_are_left_alone() {
        let store = InMemoryStore::new();
        let mut fresh = User::new("Too", "New");
        fresh.created_at = run_now() - TimeDelta::hours(1);
        store.seed_user(fresh);
        let mut orphan = aged_unverified_user();
        orphan.created_by = Some(Uuid::new_v4());
        store.seed_user(orphan);
        let mailer = Arc::new(RecordingMailer::default());

        let report = job(&store, mailer.clone()).run().await.expect("run");

        assert_eq!(report.details["sent"], 0);
        assert!(mailer.verify.lock().expect("mailer mutex").is_empty());
    }

    #[tokio::test]
    async fn send_failure_leaves_the_account_eligible() {
        let store = InMemoryStore::new();
        store.seed_user(aged_unverified_user());
        let mailer = Arc::new(RecordingMailer {
            fail: true,
            ..RecordingMailer::default()
        });

        let report = job(&store, mailer).run().await.expect("run");

        assert_eq!(report.details["failed"], 1);
        let stored = &store.users()[0];
        assert_eq!(stored.reminded_verify, None);
        assert_eq!(stored.times_reminded_verify, 0);
    }
}

mod update_reminders {
    use super::*;

    fn job(store: &InMemoryStore, mailer: Arc<RecordingMailer>) -> UpdateReminderJob {
        UpdateReminderJob::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            mailer,
            Arc::new(FixedClock::new(run_now())),
        )
    }

    #[tokio::test]
    async fn stale_profiles_are_reminded_once_per_period() {
        let store = InMemoryStore::new();
        let mut stale = verified_user();
        stale.updated_at = run_now() - TimeDelta::days(UPDATE_REMINDER_STALE_DAYS + 10);
        store.seed_user(stale.clone());
        let mailer = Arc::new(RecordingMailer::default());

        let report = job(&store, mailer.clone()).run().await.expect("run");
        assert_eq!(report.details["sent"], 1);
        assert_eq!(*mailer.update.lock().expect("mailer mutex"), vec![stale.id]);
        assert_eq!(store.users()[0].reminded_update, Some(run_now()));

        // A second run without an intervening profile update stays quiet.
        let report = job(&store, mailer.clone()).run().await.expect("run");
        assert_eq!(report.details["sent"], 0);
        assert_eq!(mailer.update.lock().expect("mailer mutex").len(), 1);
    }

    #[tokio::test]
    async fn recently_updated_profiles_are_not_streamed() {
        let store = InMemoryStore::new();
        store.seed_user(verified_user());
        let mailer = Arc::new(RecordingMailer::default());

        let report = job(&store, mailer.clone()).run().await.expect("run");

        assert_eq!(report.details["processed"], 0);
        assert!(mailer.update.lock().expect("mailer mutex").is_empty());
    }
}

mod checkout_reminders {
    use super::*;

    fn job(store: &InMemoryStore, notifier: Arc<RecordingNotifier>) -> CheckoutReminderJob {
        CheckoutReminderJob::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            notifier,
            Arc::new(FixedClock::new(run_now())),
        )
    }

    fn departing_check_in(list: Uuid) -> CheckIn {
        let mut check_in = CheckIn::new(list);
        check_in.checkout_date =
            Some(run_now() - TimeDelta::hours(CHECKOUT_REMINDER_DELAY_HOURS + 1));
        check_in
    }

    #[tokio::test]
    async fn due_memberships_are_notified_and_flagged() {
        let store = InMemoryStore::new();
        let list = Uuid::new_v4();
        let mut user = verified_user();
        let check_in = departing_check_in(list);
        user.check_ins.operations.push(check_in.clone());
        store.seed_user(user.clone());
        let notifier = Arc::new(RecordingNotifier::default());

        let report = job(&store, notifier.clone()).run().await.expect("run");

        assert_eq!(report.details["reminded"], 1);
        let sent = notifier.sent.lock().expect("notifier mutex");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, NotificationKind::CheckoutReminder);
        assert_eq!(sent[0].recipients, vec![user.id]);
        assert_eq!(sent[0].params["checkIn"], serde_json::json!(check_in.id));
        assert!(store.users()[0].check_ins.operations[0].reminded_checkout);
    }

    #[tokio::test]
    async fn already_reminded_memberships_stay_quiet() {
        let store = InMemoryStore::new();
        let mut user = verified_user();
        let mut check_in = departing_check_in(Uuid::new_v4());
        check_in.reminded_checkout = true;
        user.check_ins.operations.push(check_in);
        store.seed_user(user);
        let notifier = Arc::new(RecordingNotifier::default());

        let report = job(&store, notifier.clone()).run().await.expect("run");

        assert_eq!(report.details["reminded"], 0);
        assert!(notifier.sent.lock().expect("notifier mutex").is_empty());
    }

    #[tokio::test]
    async fn unreachable_accounts_are_skipped() {
        let store = InMemoryStore::new();
        let mut user = User::new("No", "Address");
        user.check_ins.operations.push(departing_check_in(Uuid::new_v4()));
        store.seed_user(user);
        let notifier = Arc::new(RecordingNotifier::default());

        let report = job(&store, notifier.clone()).run().await.expect("run");

        assert_eq!(report.details["reminded"], 0);
        assert!(notifier.sent.lock().expect("notifier mutex").is_empty());
        assert!(!store.users()[0].check_ins.operations[0].reminded_checkout);
    }
}

mod automated_checkout {
    use super::*;

    fn job(store: &InMemoryStore, notifier: Arc<RecordingNotifier>) -> AutoCheckoutJob {
        AutoCheckoutJob::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            notifier,
            Arc::new(FixedClock::new(run_now())),
        )
    }

    #[tokio::test]
    async fn overdue_memberships_are_closed_with_one_summary_notification() {
        let store = InMemoryStore::new();
        let mut user = verified_user();
        let mut first = CheckIn::new(Uuid::new_v4());
        first.checkout_date = Some(run_now() - TimeDelta::days(AUTO_CHECKOUT_GRACE_DAYS + 1));
        let mut second = CheckIn::new(Uuid::new_v4());
        second.checkout_date = Some(run_now() - TimeDelta::days(AUTO_CHECKOUT_GRACE_DAYS + 3));
        user.check_ins.operations.push(first.clone());
        user.check_ins.disasters.push(second.clone());
        store.seed_user(user.clone());
        let notifier = Arc::new(RecordingNotifier::default());

        let report = job(&store, notifier.clone()).run().await.expect("run");

        assert_eq!(report.details["closed"], 2);
        let sent = notifier.sent.lock().expect("notifier mutex");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, NotificationKind::AutomatedCheckout);
        assert_eq!(
            sent[0].params["lists"],
            serde_json::json!([first.list, second.list]),
        );
        let stored = &store.users()[0];
        assert!(stored.check_ins.operations[0].checked_out);
        assert!(stored.check_ins.disasters[0].checked_out);
    }

    #[tokio::test]
    async fn memberships_inside_the_grace_period_stay_open() {
        let store = InMemoryStore::new();
        let mut user = verified_user();
        let mut recent = CheckIn::new(Uuid::new_v4());
        recent.checkout_date = Some(run_now() - TimeDelta::days(2));
        user.check_ins.operations.push(recent);
        store.seed_user(user);
        let notifier = Arc::new(RecordingNotifier::default());

        let report = job(&store, notifier.clone()).run().await.expect("run");

        assert_eq!(report.details["closed"], 0);
        assert!(notifier.sent.lock().expect("notifier mutex").is_empty());
        assert!(!store.users()[0].check_ins.operations[0].checked_out);
    }
}
