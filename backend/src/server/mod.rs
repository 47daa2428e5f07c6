//! Server wiring: default adapters, job registry, and scheduler.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use crate::domain::Error;
use crate::domain::contact_sync::{ContactFolderSync, ContactSyncPorts};
use crate::domain::duplicates::{
    DuplicateDetector, DuplicateDetectorConfig, DuplicateDetectorPorts,
};
use crate::domain::importer::{
    DirectoryImporter, DirectoryImporterConfig, DirectoryImporterPorts, ImporterJob,
};
use crate::domain::ports::{Notifier, ReminderMailer, TokioSleeper};
use crate::domain::reminders::{
    AutoCheckoutJob, CheckoutReminderJob, UpdateReminderJob, VerifyReminderJob,
};
use crate::domain::scheduler::{Job, Scheduler};
use crate::inbound::http::state::HttpState;
use crate::outbound::directory::DirectoryHttpSource;
use crate::outbound::memory::InMemoryStore;
use crate::outbound::notify::{TracingMailer, TracingNotifier};
use crate::outbound::outlook::{OutlookCredentials, OutlookHttpClient};

/// The fully wired engine: trigger-surface state plus the job timers.
pub struct Engine {
    /// Shared state for the HTTP trigger surface.
    pub http_state: HttpState,
    /// Registry of jobs with their firing intervals, not yet spawned.
    pub scheduler: Scheduler,
    /// Contact-folder synchronizer for membership-change callers.
    pub contact_sync: Arc<ContactFolderSync>,
}

/// Wire the engine over the default in-memory store.
///
/// # Errors
///
/// Returns an error when an outbound HTTP client cannot be constructed.
pub fn build_engine(config: &ServerConfig) -> Result<Engine, Error> {
    build_engine_with_store(config, InMemoryStore::new())
}

/// Wire the engine over an explicit store, used by integration tests.
///
/// # Errors
///
/// Returns an error when an outbound HTTP client cannot be constructed.
pub fn build_engine_with_store(
    config: &ServerConfig,
    store: InMemoryStore,
) -> Result<Engine, Error> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);
    let mailer: Arc<dyn ReminderMailer> = Arc::new(TracingMailer);
    let source = DirectoryHttpSource::new(config.directory_url.clone())
        .map_err(|error| Error::internal(format!("directory client setup failed: {error}")))?;
    let outlook = OutlookHttpClient::new(
        config.outlook_token_url.clone(),
        config.outlook_api_url.clone(),
        OutlookCredentials {
            client_id: config.outlook_client_id.clone(),
            client_secret: config.outlook_client_secret.clone(),
        },
    )
    .map_err(|error| Error::internal(format!("contact client setup failed: {error}")))?;
    let contact_sync = Arc::new(ContactFolderSync::new(ContactSyncPorts {
        contacts: Arc::new(outlook),
        descriptors: Arc::new(store.clone()),
        users: Arc::new(store.clone()),
    }));

    let importer = DirectoryImporter::new(
        DirectoryImporterPorts {
            source: Arc::new(source),
            lists: Arc::new(store.clone()),
            users: Arc::new(store.clone()),
            notifier: Arc::clone(&notifier),
        },
        Arc::clone(&clock),
        Arc::new(TokioSleeper),
        DirectoryImporterConfig::default(),
    );
    let import_job: Arc<dyn Job> = Arc::new(ImporterJob::new(importer, Arc::new(store.clone())));

    let duplicate_job: Arc<dyn Job> = Arc::new(DuplicateDetector::new(
        DuplicateDetectorPorts {
            streams: Arc::new(store.clone()),
            users: Arc::new(store.clone()),
            duplicates: Arc::new(store.clone()),
        },
        Arc::clone(&clock),
        DuplicateDetectorConfig::default(),
    ));

    let verify_job: Arc<dyn Job> = Arc::new(VerifyReminderJob::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::clone(&mailer),
        Arc::clone(&clock),
    ));
    let update_job: Arc<dyn Job> = Arc::new(UpdateReminderJob::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::clone(&mailer),
        Arc::clone(&clock),
    ));
    let checkout_job: Arc<dyn Job> = Arc::new(CheckoutReminderJob::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::clone(&notifier),
        Arc::clone(&clock),
    ));
    let auto_checkout_job: Arc<dyn Job> = Arc::new(AutoCheckoutJob::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::clone(&notifier),
        Arc::clone(&clock),
    ));

    let scheduler = Scheduler::new()
        .register(Arc::clone(&import_job), config.import_interval())
        .register(Arc::clone(&duplicate_job), config.duplicate_interval())
        .register(Arc::clone(&verify_job), config.reminder_interval())
        .register(Arc::clone(&update_job), config.reminder_interval())
        .register(Arc::clone(&checkout_job), config.reminder_interval())
        .register(Arc::clone(&auto_checkout_job), config.reminder_interval());

    let http_state = HttpState::new(config.cron_key.clone())
        .register(import_job)
        .register(duplicate_job)
        .register(verify_job)
        .register(update_job)
        .register(checkout_job)
        .register(auto_checkout_job);

    Ok(Engine {
        http_state,
        scheduler,
        contact_sync,
    })
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use uuid::Uuid;

    use super::*;
    use crate::domain::contact_sync::MembershipChange;

    fn test_config() -> ServerConfig {
        ServerConfig::try_parse_from([
            "rollcall-backend",
            "--cron-key",
            "s3cret",
            "--directory-url",
            "https://directory.example.org/",
        ])
        .expect("valid test configuration")
    }

    #[test]
    fn wires_every_job_onto_both_surfaces() {
        let engine = build_engine(&test_config()).expect("engine");

        for job in [
            "directory-import",
            "duplicate-detect",
            "verify-reminder",
            "update-reminder",
            "checkout-reminder",
            "auto-checkout",
        ] {
            assert!(engine.http_state.job(job).is_some(), "missing trigger for {job}");
        }
        assert_eq!(engine.scheduler.jobs().count(), 6);
    }

    #[tokio::test]
    async fn the_contact_synchronizer_is_wired_over_the_store() {
        let engine = build_engine(&test_config()).expect("engine");

        // A list with no sync descriptors synchronizes trivially; anything
        // else would mean the synchronizer is not bound to the store.
        let outcomes = engine
            .contact_sync
            .apply(Uuid::new_v4(), &MembershipChange::Removed(Uuid::new_v4()))
            .await
            .expect("apply");
        assert!(outcomes.is_empty());
    }
}
