//! DTOs for the OAuth token endpoint and the contact-folder API.

use serde::{Deserialize, Serialize};

use crate::domain::ports::{ContactFolder, ContactPatch, NewContact, RemoteContact};

#[derive(Debug, Deserialize)]
pub(super) struct TokenResponseDto {
    pub(super) access_token: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct CollectionDto<T> {
    #[serde(default = "Vec::new")]
    pub(super) value: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FolderDto {
    pub(super) id: String,
    pub(super) display_name: String,
}

impl From<FolderDto> for ContactFolder {
    fn from(dto: FolderDto) -> Self {
        Self {
            id: dto.id,
            display_name: dto.display_name,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ContactDto {
    pub(super) id: String,
    pub(super) personal_notes: Option<String>,
}

impl From<ContactDto> for RemoteContact {
    fn from(dto: ContactDto) -> Self {
        Self {
            id: dto.id,
            personal_notes: dto.personal_notes,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct EmailAddressDto {
    pub(super) address: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct NewContactDto {
    pub(super) given_name: String,
    pub(super) surname: String,
    pub(super) email_addresses: Vec<EmailAddressDto>,
    pub(super) business_phones: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) job_title: Option<String>,
    pub(super) personal_notes: String,
}

impl From<&NewContact> for NewContactDto {
    fn from(contact: &NewContact) -> Self {
        Self {
            given_name: contact.given_name.clone(),
            surname: contact.family_name.clone(),
            email_addresses: email_addresses(&contact.email_addresses),
            business_phones: contact.business_phones.clone(),
            company_name: contact.company_name.clone(),
            job_title: contact.job_title.clone(),
            personal_notes: contact.personal_notes.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ContactPatchDto {
    pub(super) email_addresses: Vec<EmailAddressDto>,
    pub(super) business_phones: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) job_title: Option<String>,
}

impl From<&ContactPatch> for ContactPatchDto {
    fn from(patch: &ContactPatch) -> Self {
        Self {
            email_addresses: email_addresses(&patch.email_addresses),
            business_phones: patch.business_phones.clone(),
            company_name: patch.company_name.clone(),
            job_title: patch.job_title.clone(),
        }
    }
}

fn email_addresses(addresses: &[String]) -> Vec<EmailAddressDto> {
    addresses
        .iter()
        .map(|address| EmailAddressDto {
            address: address.clone(),
        })
        .collect()
}
