//! Recurring job contract and fixed-interval scheduler.
//!
//! The scheduler is the sole internal entry point into the engine: one timer
//! per job, no coordination between jobs, overlapping runs tolerated. The
//! HTTP trigger surface reuses the same [`Job`] objects.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use super::Error;

/// Outcome summary of one job run, rendered as JSON by the trigger surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReport {
    pub job: &'static str,
    pub details: Value,
}

impl JobReport {
    /// Build a report for the named job.
    pub fn new(job: &'static str, details: Value) -> Self {
        Self { job, details }
    }
}

/// One recurring background job.
#[async_trait]
pub trait Job: Send + Sync {
    /// Stable name used for scheduling, logging, and the trigger surface.
    fn name(&self) -> &'static str;

    /// Execute one run to completion.
    async fn run(&self) -> Result<JobReport, Error>;
}

/// Registry of jobs with their firing intervals.
#[derive(Default)]
pub struct Scheduler {
    entries: Vec<(Arc<dyn Job>, Duration)>,
}

impl Scheduler {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job to fire every `every`.
    #[must_use]
    pub fn register(mut self, job: Arc<dyn Job>, every: Duration) -> Self {
        self.entries.push((job, every));
        self
    }

    /// Registered jobs, for the trigger surface.
    pub fn jobs(&self) -> impl Iterator<Item = &Arc<dyn Job>> {
        self.entries.iter().map(|(job, _)| job)
    }

    /// Spawn one interval loop per job. The first firing happens one full
    /// interval after spawn; a failed run is logged and the timer keeps
    /// ticking.
    pub fn spawn(self) -> Vec<JoinHandle<()>> {
        self.entries
            .into_iter()
            .map(|(job, every)| {
                tokio::spawn(async move {
                    let mut ticker = tokio::time::interval(every);
                    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    // interval fires immediately; swallow that tick so jobs
                    // do not all run at process start.
                    ticker.tick().await;
                    loop {
                        ticker.tick().await;
                        match job.run().await {
                            Ok(report) => {
                                info!(job = report.job, details = %report.details, "job finished");
                            }
                            Err(error) => {
                                warn!(job = job.name(), error = %error, "job run failed");
                            }
                        }
                    }
                })
            })
            .collect()
    }
}
