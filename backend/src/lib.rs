//! Directory synchronization engine library modules.

pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod server;
pub mod test_support;

pub use domain::{Error, ErrorCode};
