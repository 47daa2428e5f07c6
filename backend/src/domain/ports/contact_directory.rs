//! Driven port for the remote mailbox contact-folder API.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::user::User;

/// Short-lived bearer token obtained from a refresh-token grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a freshly issued bearer token.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Token value for the `Authorization` header.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// One remote contact folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactFolder {
    pub id: String,
    pub display_name: String,
}

/// One remote contact, reduced to what reconciliation needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteContact {
    pub id: String,
    /// Free-text notes field carrying the reconciliation key.
    pub personal_notes: Option<String>,
}

/// Payload for creating a remote contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    pub given_name: String,
    pub family_name: String,
    pub email_addresses: Vec<String>,
    pub business_phones: Vec<String>,
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    /// Reconciliation key stored verbatim in the remote notes field.
    pub personal_notes: String,
}

/// Patch payload for updating a remote contact in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactPatch {
    pub email_addresses: Vec<String>,
    pub business_phones: Vec<String>,
    pub company_name: Option<String>,
    pub job_title: Option<String>,
}

define_port_error! {
    /// Errors raised while talking to the contact-folder API.
    pub enum ContactDirectoryError {
        /// The OAuth grant was rejected or has gone stale.
        Unauthorized { message: String } =>
            "contact directory rejected the credential: {message}",
        /// Network-level failure reaching the API.
        Transport { message: String } =>
            "contact directory request failed: {message}",
        /// The response body was not the expected JSON shape.
        Decode { message: String } =>
            "contact directory response could not be decoded: {message}",
        /// The API answered with a non-success status.
        Status { code: u16, message: String } =>
            "contact directory answered status {code}: {message}",
    }
}

impl ContactDirectoryError {
    /// Whether the failure is an authorization problem. Authorization
    /// failures abort one descriptor's sync for the current run only.
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

/// Port covering OAuth token refresh plus contact-folder CRUD.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContactDirectory: Send + Sync {
    /// Exchange the owner's stored refresh token for a bearer token.
    async fn refresh_token(&self, owner: &User) -> Result<AccessToken, ContactDirectoryError>;

    /// List the owner's contact folders.
    async fn list_folders(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<ContactFolder>, ContactDirectoryError>;

    /// List the contacts of one folder.
    async fn list_contacts(
        &self,
        token: &AccessToken,
        folder_id: &str,
    ) -> Result<Vec<RemoteContact>, ContactDirectoryError>;

    /// Create a contact in one folder.
    async fn create_contact(
        &self,
        token: &AccessToken,
        folder_id: &str,
        contact: &NewContact,
    ) -> Result<(), ContactDirectoryError>;

    /// Patch an existing contact.
    async fn update_contact(
        &self,
        token: &AccessToken,
        folder_id: &str,
        contact_id: &str,
        patch: &ContactPatch,
    ) -> Result<(), ContactDirectoryError>;

    /// Delete a contact.
    async fn delete_contact(
        &self,
        token: &AccessToken,
        folder_id: &str,
        contact_id: &str,
    ) -> Result<(), ContactDirectoryError>;
}
