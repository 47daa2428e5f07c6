//! Shared HTTP adapter state.
//!
//! The trigger surface depends only on the [`Job`] registry and the shared
//! cron secret, so handlers stay testable without I/O.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::Error;
use crate::domain::scheduler::Job;

/// Dependency bundle for the trigger handlers.
#[derive(Clone)]
pub struct HttpState {
    jobs: HashMap<&'static str, Arc<dyn Job>>,
    cron_key: String,
}

impl HttpState {
    /// State guarding its jobs with the given shared secret.
    pub fn new(cron_key: impl Into<String>) -> Self {
        Self {
            jobs: HashMap::new(),
            cron_key: cron_key.into(),
        }
    }

    /// Expose a job on the trigger surface under its own name.
    #[must_use]
    pub fn register(mut self, job: Arc<dyn Job>) -> Self {
        self.jobs.insert(job.name(), job);
        self
    }

    /// Require an exact match of the shared secret. Absence and mismatch are
    /// indistinguishable to the caller.
    pub fn authorize(&self, presented: Option<&str>) -> Result<(), Error> {
        if presented == Some(self.cron_key.as_str()) {
            Ok(())
        } else {
            Err(Error::unauthorized("missing or invalid cron key"))
        }
    }

    /// Look up a registered job by name.
    pub fn job(&self, name: &str) -> Option<&Arc<dyn Job>> {
        self.jobs.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorize_accepts_only_the_exact_secret() {
        let state = HttpState::new("s3cret");
        assert!(state.authorize(Some("s3cret")).is_ok());
        assert!(state.authorize(Some("s3cret ")).is_err());
        assert!(state.authorize(Some("S3CRET")).is_err());
        assert!(state.authorize(None).is_err());
    }
}
