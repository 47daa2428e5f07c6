//! Remote mailbox contact-folder outbound adapters.
//!
//! This module provides an HTTP implementation of the `ContactDirectory`
//! port: an OAuth2 refresh-token grant plus contact-folder CRUD.

mod dto;
mod http_client;

pub use http_client::{OutlookCredentials, OutlookHttpClient};
