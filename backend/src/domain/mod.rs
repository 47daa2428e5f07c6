//! Domain layer: entities, ports, and the synchronization services.
//!
//! Nothing in this module performs I/O directly; all side effects go
//! through the port traits in [`ports`].

pub mod contact_sync;
pub mod duplicate;
pub mod duplicates;
pub mod error;
pub mod fetcher;
pub mod importer;
pub mod list;
pub mod outlook;
pub mod ports;
pub mod reminders;
pub mod scheduler;
pub mod stream;
pub mod user;

pub use error::{Error, ErrorCode};
