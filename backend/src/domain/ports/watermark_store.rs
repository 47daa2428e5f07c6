//! Driven port for the importer's created-after watermark.
//!
//! The watermark is explicit state: the importer receives it as a parameter
//! and returns the advanced value, and callers persist it through this port.
//! Nothing in the engine keeps process-wide mutable cron state.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::define_port_error;

define_port_error! {
    /// Errors raised by watermark persistence adapters.
    pub enum WatermarkStoreError {
        /// The watermark could not be read or written.
        Storage { message: String } =>
            "watermark storage failed: {message}",
    }
}

/// Port for loading and persisting the last-import watermark.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WatermarkStore: Send + Sync {
    /// The watermark of the previous successful run; `None` means "import
    /// everything".
    async fn load(&self) -> Result<Option<DateTime<Utc>>, WatermarkStoreError>;

    /// Persist the watermark returned by a completed run.
    async fn store(&self, watermark: DateTime<Utc>) -> Result<(), WatermarkStoreError>;
}

/// Fixture implementation that never remembers a watermark.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureWatermarkStore;

#[async_trait]
impl WatermarkStore for FixtureWatermarkStore {
    async fn load(&self) -> Result<Option<DateTime<Utc>>, WatermarkStoreError> {
        Ok(None)
    }

    async fn store(&self, _watermark: DateTime<Utc>) -> Result<(), WatermarkStoreError> {
        Ok(())
    }
}
