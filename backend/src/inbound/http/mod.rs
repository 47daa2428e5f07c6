//! HTTP inbound adapter exposing the job trigger endpoints.

pub mod error;
pub mod state;
pub mod triggers;

pub use error::ApiResult;
