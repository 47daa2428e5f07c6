//! Process configuration parsed from flags and environment variables.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use url::Url;

/// Runtime configuration for the synchronization engine.
#[derive(Debug, Clone, Parser)]
#[command(name = "rollcall-backend", about = "Directory synchronization engine")]
pub struct ServerConfig {
    /// Socket address the trigger surface binds to.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: SocketAddr,

    /// Shared secret guarding the cron trigger endpoints.
    #[arg(long, env = "CRON_KEY", hide_env_values = true)]
    pub cron_key: String,

    /// Base URL of the remote organizational directory.
    #[arg(long, env = "DIRECTORY_URL")]
    pub directory_url: Url,

    /// OAuth2 token endpoint for the contact-folder API.
    #[arg(
        long,
        env = "OUTLOOK_TOKEN_URL",
        default_value = "https://login.microsoftonline.com/common/oauth2/v2.0/token"
    )]
    pub outlook_token_url: Url,

    /// Base URL of the contact-folder API.
    #[arg(
        long,
        env = "OUTLOOK_API_URL",
        default_value = "https://graph.microsoft.com/v1.0"
    )]
    pub outlook_api_url: Url,

    /// OAuth application id for the refresh-token grant.
    #[arg(long, env = "OUTLOOK_CLIENT_ID", default_value = "")]
    pub outlook_client_id: String,

    /// OAuth application secret for the refresh-token grant.
    #[arg(long, env = "OUTLOOK_CLIENT_SECRET", default_value = "", hide_env_values = true)]
    pub outlook_client_secret: String,

    /// Seconds between directory import runs.
    #[arg(long, env = "IMPORT_INTERVAL_SECS", default_value_t = 1800)]
    pub import_interval_secs: u64,

    /// Seconds between duplicate detection runs.
    #[arg(long, env = "DUPLICATE_INTERVAL_SECS", default_value_t = 86_400)]
    pub duplicate_interval_secs: u64,

    /// Seconds between lifecycle reminder runs.
    #[arg(long, env = "REMINDER_INTERVAL_SECS", default_value_t = 3600)]
    pub reminder_interval_secs: u64,
}

impl ServerConfig {
    /// Interval between directory import runs.
    #[must_use]
    pub fn import_interval(&self) -> Duration {
        Duration::from_secs(self.import_interval_secs)
    }

    /// Interval between duplicate detection runs.
    #[must_use]
    pub fn duplicate_interval(&self) -> Duration {
        Duration::from_secs(self.duplicate_interval_secs)
    }

    /// Interval between lifecycle reminder runs.
    #[must_use]
    pub fn reminder_interval(&self) -> Duration {
        Duration::from_secs(self.reminder_interval_secs)
    }
}
