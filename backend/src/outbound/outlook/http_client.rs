//! Reqwest-backed contact-folder API adapter.
//!
//! This adapter owns transport details only: the OAuth2 refresh-token
//! exchange, request serialisation, timeout and HTTP error mapping, and JSON
//! decoding into domain types.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use super::dto::{CollectionDto, ContactDto, ContactPatchDto, FolderDto, NewContactDto, TokenResponseDto};
use crate::domain::ports::{
    AccessToken, ContactDirectory, ContactDirectoryError, ContactFolder, ContactPatch, NewContact,
    RemoteContact,
};
use crate::domain::user::User;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// OAuth client identity used for the refresh-token grant.
pub struct OutlookCredentials {
    /// Registered OAuth application id.
    pub client_id: String,
    /// Registered OAuth application secret.
    pub client_secret: String,
}

/// Contact-folder API adapter bound to one token endpoint and API base.
pub struct OutlookHttpClient {
    client: Client,
    token_endpoint: Url,
    api_base: Url,
    credentials: OutlookCredentials,
}

impl OutlookHttpClient {
    /// Build an adapter with the default request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        token_endpoint: Url,
        api_base: Url,
        credentials: OutlookCredentials,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(DEFAULT_REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            token_endpoint,
            api_base,
            credentials,
        })
    }

    fn api_url(&self, segments: &[&str]) -> Result<Url, ContactDirectoryError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|()| ContactDirectoryError::transport("API base cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn read_success(
        response: reqwest::Response,
    ) -> Result<Vec<u8>, ContactDirectoryError> {
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(body.to_vec())
    }
}

#[async_trait]
impl ContactDirectory for OutlookHttpClient {
    async fn refresh_token(&self, owner: &User) -> Result<AccessToken, ContactDirectoryError> {
        let refresh_token = owner.outlook_refresh_token.as_deref().ok_or_else(|| {
            ContactDirectoryError::unauthorized(format!("user {} holds no stored grant", owner.id))
        })?;
        let response = self
            .client
            .post(self.token_endpoint.clone())
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            // Token endpoints answer 400 for revoked or expired grants.
            if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
                return Err(ContactDirectoryError::unauthorized(body_preview(
                    body.as_ref(),
                )));
            }
            return Err(map_status_error(status, body.as_ref()));
        }

        let decoded: TokenResponseDto = serde_json::from_slice(body.as_ref()).map_err(|error| {
            ContactDirectoryError::decode(format!("invalid token response: {error}"))
        })?;
        Ok(AccessToken::new(decoded.access_token))
    }

    async fn list_folders(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<ContactFolder>, ContactDirectoryError> {
        let url = self.api_url(&["me", "contactFolders"])?;
        let response = self
            .client
            .get(url)
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(map_transport_error)?;
        let body = Self::read_success(response).await?;
        let decoded: CollectionDto<FolderDto> = serde_json::from_slice(body.as_ref())
            .map_err(|error| {
                ContactDirectoryError::decode(format!("invalid folder listing: {error}"))
            })?;
        Ok(decoded.value.into_iter().map(ContactFolder::from).collect())
    }

    async fn list_contacts(
        &self,
        token: &AccessToken,
        folder_id: &str,
    ) -> Result<Vec<RemoteContact>, ContactDirectoryError> {
        let url = self.api_url(&["me", "contactFolders", folder_id, "contacts"])?;
        let response = self
            .client
            .get(url)
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(map_transport_error)?;
        let body = Self::read_success(response).await?;
        let decoded: CollectionDto<ContactDto> = serde_json::from_slice(body.as_ref())
            .map_err(|error| {
                ContactDirectoryError::decode(format!("invalid contact listing: {error}"))
            })?;
        Ok(decoded.value.into_iter().map(RemoteContact::from).collect())
    }

    async fn create_contact(
        &self,
        token: &AccessToken,
        folder_id: &str,
        contact: &NewContact,
    ) -> Result<(), ContactDirectoryError> {
        let url = self.api_url(&["me", "contactFolders", folder_id, "contacts"])?;
        let response = self
            .client
            .post(url)
            .bearer_auth(token.as_str())
            .json(&NewContactDto::from(contact))
            .send()
            .await
            .map_err(map_transport_error)?;
        Self::read_success(response).await.map(|_| ())
    }

    async fn update_contact(
        &self,
        token: &AccessToken,
        folder_id: &str,
        contact_id: &str,
        patch: &ContactPatch,
    ) -> Result<(), ContactDirectoryError> {
        let url = self.api_url(&["me", "contactFolders", folder_id, "contacts", contact_id])?;
        let response = self
            .client
            .patch(url)
            .bearer_auth(token.as_str())
            .json(&ContactPatchDto::from(patch))
            .send()
            .await
            .map_err(map_transport_error)?;
        Self::read_success(response).await.map(|_| ())
    }

    async fn delete_contact(
        &self,
        token: &AccessToken,
        folder_id: &str,
        contact_id: &str,
    ) -> Result<(), ContactDirectoryError> {
        let url = self.api_url(&["me", "contactFolders", folder_id, "contacts", contact_id])?;
        let response = self
            .client
            .delete(url)
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(map_transport_error)?;
        Self::read_success(response).await.map(|_| ())
    }
}

fn map_transport_error(error: reqwest::Error) -> ContactDirectoryError {
    ContactDirectoryError::transport(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ContactDirectoryError {
    if status == StatusCode::UNAUTHORIZED {
        return ContactDirectoryError::unauthorized(body_preview(body));
    }
    ContactDirectoryError::status(status.as_u16(), body_preview(body))
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

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network URL and mapping helpers.

    use super::*;

    fn client() -> OutlookHttpClient {
        OutlookHttpClient::new(
            Url::parse("https://login.example.org/oauth2/token").expect("valid URL"),
            Url::parse("https://graph.example.org/v1.0").expect("valid URL"),
            OutlookCredentials {
                client_id: "app-id".to_owned(),
                client_secret: "app-secret".to_owned(),
            },
        )
        .expect("client")
    }

    #[test]
    fn api_urls_extend_the_base_path() {
        let url = client()
            .api_url(&["me", "contactFolders", "AQMkAD", "contacts"])
            .expect("URL should build");
        assert_eq!(url.as_str(), "https://graph.example.org/v1.0/me/contactFolders/AQMkAD/contacts");
    }

    #[test]
    fn folder_identifiers_are_percent_encoded() {
        let url = client()
            .api_url(&["me", "contactFolders", "a/b c", "contacts"])
            .expect("URL should build");
        assert_eq!(
            url.as_str(),
            "https://graph.example.org/v1.0/me/contactFolders/a%2Fb%20c/contacts",
        );
    }

    #[test]
    fn unauthorized_statuses_map_to_the_unauthorized_variant() {
        let error = map_status_error(StatusCode::UNAUTHORIZED, b"token expired");
        assert!(error.is_unauthorized());
    }

    #[test]
    fn other_statuses_keep_their_code() {
        let error = map_status_error(StatusCode::NOT_FOUND, b"no such folder");
        assert!(matches!(
            error,
            ContactDirectoryError::Status { code: 404, .. }
        ));
    }
}
