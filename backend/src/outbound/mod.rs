//! Outbound adapters implementing the domain's driven ports.

pub mod directory;
pub mod memory;
pub mod notify;
pub mod outlook;
