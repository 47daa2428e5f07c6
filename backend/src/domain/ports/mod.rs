//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod contact_directory;
mod directory_source;
mod duplicate_repository;
mod list_repository;
mod mailer;
mod notifier;
mod outlook_sync_repository;
mod sleeper;
mod user_repository;
mod user_stream;
mod watermark_store;

#[cfg(test)]
pub use contact_directory::MockContactDirectory;
pub use contact_directory::{
    AccessToken, ContactDirectory, ContactDirectoryError, ContactFolder, ContactPatch, NewContact,
    RemoteContact,
};
#[cfg(test)]
pub use directory_source::MockDirectorySource;
pub use directory_source::{
    DirectoryPage, DirectorySource, DirectorySourceError, FixtureDirectorySource, RemoteAccess,
    RemoteRecord, RemoteRecordKind,
};
#[cfg(test)]
pub use duplicate_repository::MockDuplicateRepository;
pub use duplicate_repository::{
    DuplicateRepository, DuplicateRepositoryError, FixtureDuplicateRepository,
};
#[cfg(test)]
pub use list_repository::MockListRepository;
pub use list_repository::{FixtureListRepository, ListRepository, ListRepositoryError};
#[cfg(test)]
pub use mailer::MockReminderMailer;
pub use mailer::{FixtureReminderMailer, ReminderMailer, ReminderMailerError};
#[cfg(test)]
pub use notifier::MockNotifier;
pub use notifier::{FixtureNotifier, Notification, NotificationKind, Notifier, NotifierError};
#[cfg(test)]
pub use outlook_sync_repository::MockOutlookSyncRepository;
pub use outlook_sync_repository::{
    FixtureOutlookSyncRepository, OutlookSyncRepository, OutlookSyncRepositoryError,
};
#[cfg(test)]
pub use sleeper::MockSleeper;
pub use sleeper::{ImmediateSleeper, Sleeper, TokioSleeper};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{FixtureUserRepository, UserRepository, UserRepositoryError};
#[cfg(test)]
pub use user_stream::MockUserStream;
pub use user_stream::{FixtureUserStream, UserStream, UserStreamError, UserStreamFilter};
#[cfg(test)]
pub use watermark_store::MockWatermarkStore;
pub use watermark_store::{FixtureWatermarkStore, WatermarkStore, WatermarkStoreError};
