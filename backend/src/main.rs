//! Engine entry point: wires the jobs, spawns the timers, and serves the
//! HTTP trigger surface.

use actix_web::{App, HttpServer, web};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use rollcall_backend::inbound::http::triggers;
use rollcall_backend::server::{ServerConfig, build_engine};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %error, "tracing init failed");
    }

    let config = ServerConfig::parse();
    let bind_addr = config.bind_addr;

    let engine = build_engine(&config).map_err(|error| std::io::Error::other(error.to_string()))?;
    let handles = engine.scheduler.spawn();
    info!(jobs = handles.len(), "job timers started");

    let http_state = web::Data::new(engine.http_state);
    HttpServer::new(move || {
        App::new()
            .app_data(http_state.clone())
            .configure(triggers::configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}
