//! Reqwest-backed directory source adapter.
//!
//! This adapter owns transport details only: page URL construction, timeout
//! and HTTP error mapping, and JSON decoding into domain records.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode, Url};

use super::dto::DirectoryPageDto;
use crate::domain::ports::{
    DirectoryPage, DirectorySource, DirectorySourceError, RemoteRecordKind,
};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Directory source adapter performing HTTP GET requests against one host.
pub struct DirectoryHttpSource {
    client: Client,
    base: Url,
}

impl DirectoryHttpSource {
    /// Build an adapter with the default request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base: Url) -> Result<Self, reqwest::Error> {
        Self::with_timeout(base, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Build an adapter using a reqwest client with an explicit request
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_timeout(base: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    fn page_url(
        &self,
        kind: RemoteRecordKind,
        page: u32,
        created_after: Option<DateTime<Utc>>,
    ) -> Result<Url, DirectorySourceError> {
        let mut url = self
            .base
            .join(&format!("api/v1.0/{}", kind.path_segment()))
            .map_err(|error| {
                DirectorySourceError::transport(format!("invalid collection URL: {error}"))
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("page", &page.to_string());
            if let Some(watermark) = created_after {
                pairs.append_pair("filter[created][value]", &watermark.timestamp().to_string());
                pairs.append_pair("filter[created][operator]", ">");
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl DirectorySource for DirectoryHttpSource {
    async fn fetch_page(
        &self,
        kind: RemoteRecordKind,
        page: u32,
        created_after: Option<DateTime<Utc>>,
    ) -> Result<DirectoryPage, DirectorySourceError> {
        let url = self.page_url(kind, page, created_after)?;
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        parse_page(body.as_ref())
    }
}

fn parse_page(body: &[u8]) -> Result<DirectoryPage, DirectorySourceError> {
    let decoded: DirectoryPageDto = serde_json::from_slice(body).map_err(|error| {
        DirectorySourceError::decode(format!("invalid directory JSON payload: {error}"))
    })?;
    decoded.into_domain_page().map_err(DirectorySourceError::decode)
}

fn map_transport_error(error: reqwest::Error) -> DirectorySourceError {
    DirectorySourceError::transport(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> DirectorySourceError {
    DirectorySourceError::status(status.as_u16(), body_preview(body))
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
