//! Job trigger handlers.
//!
//! ```text
//! GET /api/v1/cron/{job}?cron_key=...  Run one job inline
//! ```
//!
//! The shared secret is checked before anything else: a missing or wrong
//! `cron_key` is rejected with no side effects, and the job registry is not
//! even consulted.

use actix_web::{HttpResponse, get, web};
use serde::Deserialize;
use tracing::info;

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Query parameters accepted by the trigger endpoint.
#[derive(Debug, Deserialize)]
pub struct TriggerQuery {
    /// Shared secret; must match the configured value exactly.
    pub cron_key: Option<String>,
}

/// Run one registered job and return its report as JSON.
#[get("/api/v1/cron/{job}")]
pub async fn trigger_job(
    path: web::Path<String>,
    query: web::Query<TriggerQuery>,
    state: web::Data<HttpState>,
) -> ApiResult<HttpResponse> {
    state.authorize(query.cron_key.as_deref())?;

    let name = path.into_inner();
    let job = state
        .job(&name)
        .ok_or_else(|| Error::not_found(format!("unknown job {name}")))?;

    info!(job = name.as_str(), "job triggered over HTTP");
    let report = job.run().await?;
    Ok(HttpResponse::Ok().json(report))
}

/// Register the trigger routes on an Actix service config.
pub fn configure(config: &mut web::ServiceConfig) {
    config.service(trigger_job);
}
