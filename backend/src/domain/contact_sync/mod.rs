//! Contact folder synchronizer.
//!
//! Pushes membership changes for a list into every remote contact folder
//! bound to it. Descriptors fan out in parallel; work within one descriptor
//! is sequential. A descriptor whose remote folder has disappeared deletes
//! itself, and per-descriptor failures never block the other descriptors.

mod reconciliation;

pub use reconciliation::ReconciliationKey;

use std::sync::Arc;

use futures_util::future;
use tracing::warn;
use uuid::Uuid;

use super::Error;
use super::outlook::OutlookSync;
use super::ports::{
    AccessToken, ContactDirectory, ContactPatch, NewContact, OutlookSyncRepository, RemoteContact,
    UserRepository,
};
use super::user::User;

/// One membership event to propagate.
#[derive(Debug, Clone, PartialEq)]
pub enum MembershipChange {
    /// The user joined the list.
    Added(User),
    /// The user's profile changed while a member.
    Updated(User),
    /// The user left the list.
    Removed(Uuid),
}

/// What one descriptor did with a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The remote folder was updated.
    Pushed,
    /// The remote folder no longer exists; the descriptor deleted itself.
    DescriptorRemoved,
    /// No tagged contact was found, so there was nothing to touch.
    ContactMissing,
}

/// Port bundle required by the synchronizer.
pub struct ContactSyncPorts {
    /// Remote mailbox contact-folder API.
    pub contacts: Arc<dyn ContactDirectory>,
    /// Sync descriptor persistence.
    pub descriptors: Arc<dyn OutlookSyncRepository>,
    /// Owner lookups for OAuth grants.
    pub users: Arc<dyn UserRepository>,
}

/// Fan-out service pushing membership changes to remote contact folders.
pub struct ContactFolderSync {
    contacts: Arc<dyn ContactDirectory>,
    descriptors: Arc<dyn OutlookSyncRepository>,
    users: Arc<dyn UserRepository>,
}

impl ContactFolderSync {
    /// Build the synchronizer from its ports.
    pub fn new(ports: ContactSyncPorts) -> Self {
        Self {
            contacts: ports.contacts,
            descriptors: ports.descriptors,
            users: ports.users,
        }
    }

    /// Propagate one membership change to every descriptor bound to `list`.
    ///
    /// Descriptors run concurrently. A failing descriptor is logged and
    /// skipped for this run; its outcome is simply absent from the result.
    pub async fn apply(
        &self,
        list: Uuid,
        change: &MembershipChange,
    ) -> Result<Vec<PushOutcome>, Error> {
        let descriptors = self
            .descriptors
            .find_for_list(list)
            .await
            .map_err(|error| Error::internal(error.to_string()))?;

        let pushes = descriptors
            .iter()
            .map(|descriptor| self.push(descriptor, change));
        let results = future::join_all(pushes).await;

        let mut outcomes = Vec::with_capacity(results.len());
        for (descriptor, result) in descriptors.iter().zip(results) {
            match result {
                Ok(outcome) => outcomes.push(outcome),
                Err(error) => {
                    warn!(
                        descriptor = %descriptor.id,
                        folder = %descriptor.folder,
                        error = %error,
                        "contact sync skipped a descriptor",
                    );
                }
            }
        }
        Ok(outcomes)
    }

    async fn push(
        &self,
        descriptor: &OutlookSync,
        change: &MembershipChange,
    ) -> Result<PushOutcome, Error> {
        let owner = self
            .users
            .find_by_id(descriptor.user)
            .await
            .map_err(|error| Error::internal(error.to_string()))?
            .ok_or_else(|| {
                Error::not_found(format!("sync descriptor owner {}", descriptor.user))
            })?;
        let token = self.contacts.refresh_token(&owner).await.map_err(|error| {
            if error.is_unauthorized() {
                Error::unauthorized(error.to_string())
            } else {
                Error::service_unavailable(error.to_string())
            }
        })?;

        if !self.folder_exists(&token, descriptor).await? {
            // The owner removed the folder remotely. The descriptor is
            // stale, so it deletes itself instead of erroring forever.
            self.descriptors
                .delete(descriptor.id)
                .await
                .map_err(|error| Error::internal(error.to_string()))?;
            return Ok(PushOutcome::DescriptorRemoved);
        }

        match change {
            MembershipChange::Added(user) => {
                self.contacts
                    .create_contact(&token, &descriptor.folder, &new_contact(user))
                    .await
                    .map_err(|error| Error::service_unavailable(error.to_string()))?;
                Ok(PushOutcome::Pushed)
            }
            MembershipChange::Updated(user) => {
                match self.find_tagged(&token, descriptor, user.id).await? {
                    Some(contact) => {
                        self.contacts
                            .update_contact(&token, &descriptor.folder, &contact.id, &patch(user))
                            .await
                            .map_err(|error| Error::service_unavailable(error.to_string()))?;
                        Ok(PushOutcome::Pushed)
                    }
                    None => Ok(PushOutcome::ContactMissing),
                }
            }
            MembershipChange::Removed(user) => {
                match self.find_tagged(&token, descriptor, *user).await? {
                    Some(contact) => {
                        self.contacts
                            .delete_contact(&token, &descriptor.folder, &contact.id)
                            .await
                            .map_err(|error| Error::service_unavailable(error.to_string()))?;
                        Ok(PushOutcome::Pushed)
                    }
                    None => Ok(PushOutcome::ContactMissing),
                }
            }
        }
    }

    async fn folder_exists(
        &self,
        token: &AccessToken,
        descriptor: &OutlookSync,
    ) -> Result<bool, Error> {
        let folders = self
            .contacts
            .list_folders(token)
            .await
            .map_err(|error| Error::service_unavailable(error.to_string()))?;
        Ok(folders.iter().any(|folder| folder.id == descriptor.folder))
    }

    async fn find_tagged(
        &self,
        token: &AccessToken,
        descriptor: &OutlookSync,
        user: Uuid,
    ) -> Result<Option<RemoteContact>, Error> {
        let key = ReconciliationKey::for_user(user);
        let contacts = self
            .contacts
            .list_contacts(token, &descriptor.folder)
            .await
            .map_err(|error| Error::service_unavailable(error.to_string()))?;
        Ok(contacts
            .into_iter()
            .find(|contact| key.matches(contact.personal_notes.as_deref())))
    }
}

fn new_contact(user: &User) -> NewContact {
    NewContact {
        given_name: user.given_name.clone(),
        family_name: user.family_name.clone(),
        email_addresses: user.validated_emails().map(str::to_owned).collect(),
        business_phones: user.phone_numbers.clone(),
        company_name: user.organization.clone(),
        job_title: user.job_title.clone(),
        personal_notes: ReconciliationKey::for_user(user.id).as_notes(),
    }
}

fn patch(user: &User) -> ContactPatch {
    ContactPatch {
        email_addresses: user.validated_emails().map(str::to_owned).collect(),
        business_phones: user.phone_numbers.clone(),
        company_name: user.organization.clone(),
        job_title: user.job_title.clone(),
    }
}

#[cfg(test)]
mod tests;
