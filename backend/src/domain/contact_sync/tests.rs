use std::sync::Arc;

use uuid::Uuid;

use super::*;
use crate::domain::ports::{ContactDirectoryError, ContactFolder, MockContactDirectory};
use crate::domain::user::UserEmail;
use crate::outbound::memory::InMemoryStore;

const FOLDER: &str = "folder-1";

fn owner_with_grant() -> User {
    let mut owner = User::new("Folder", "Owner");
    owner.outlook_refresh_token = Some("refresh-secret".to_owned());
    owner
}

fn member() -> User {
    let mut member = User::new("Amina", "Diallo");
    member.emails.push(UserEmail {
        email: "amina@example.com".to_owned(),
        validated: true,
    });
    member.emails.push(UserEmail {
        email: "unconfirmed@example.com".to_owned(),
        validated: false,
    });
    member.phone_numbers.push("+221 33 000 0000".to_owned());
    member.organization = Some("Relief Intl".to_owned());
    member
}

fn descriptor(list: Uuid, owner: &User) -> OutlookSync {
    OutlookSync {
        id: Uuid::new_v4(),
        list,
        folder: FOLDER.to_owned(),
        user: owner.id,
    }
}

fn seeded_store(list: Uuid, owner: &User) -> InMemoryStore {
    let store = InMemoryStore::new();
    store.seed_user(owner.clone());
    store.seed_sync(descriptor(list, owner));
    store
}

fn sync(store: &InMemoryStore, contacts: MockContactDirectory) -> ContactFolderSync {
    ContactFolderSync::new(ContactSyncPorts {
        contacts: Arc::new(contacts),
        descriptors: Arc::new(store.clone()),
        users: Arc::new(store.clone()),
    })
}

fn directory_with_folder() -> MockContactDirectory {
    let mut contacts = MockContactDirectory::new();
    contacts
        .expect_refresh_token()
        .returning(|_| Ok(AccessToken::new("bearer")));
    contacts.expect_list_folders().returning(|_| {
        Ok(vec![ContactFolder {
            id: FOLDER.to_owned(),
            display_name: "Field Team".to_owned(),
        }])
    });
    contacts
}

#[tokio::test]
async fn added_membership_creates_a_tagged_contact() {
    let list = Uuid::new_v4();
    let owner = owner_with_grant();
    let store = seeded_store(list, &owner);
    let joined = member();
    let expected_notes = ReconciliationKey::for_user(joined.id).as_notes();

    let mut contacts = directory_with_folder();
    contacts
        .expect_create_contact()
        .withf(move |_, folder, contact| {
            folder == FOLDER
                && contact.personal_notes == expected_notes
                && contact.email_addresses == vec!["amina@example.com".to_owned()]
        })
        .times(1)
        .returning(|_, _, _| Ok(()));

    let outcomes = sync(&store, contacts)
        .apply(list, &MembershipChange::Added(joined))
        .await
        .expect("apply");

    assert_eq!(outcomes, vec![PushOutcome::Pushed]);
}

#[tokio::test]
async fn missing_folder_deletes_the_descriptor_and_creates_nothing() {
    let list = Uuid::new_v4();
    let owner = owner_with_grant();
    let store = seeded_store(list, &owner);

    let mut contacts = MockContactDirectory::new();
    contacts
        .expect_refresh_token()
        .returning(|_| Ok(AccessToken::new("bearer")));
    // The bound folder is gone; only an unrelated one remains. The mock has
    // no create expectation, so any create attempt fails the test.
    contacts.expect_list_folders().returning(|_| {
        Ok(vec![ContactFolder {
            id: "other-folder".to_owned(),
            display_name: "Archive".to_owned(),
        }])
    });

    let outcomes = sync(&store, contacts)
        .apply(list, &MembershipChange::Added(member()))
        .await
        .expect("apply");

    assert_eq!(outcomes, vec![PushOutcome::DescriptorRemoved]);
    assert!(store.outlook_syncs().is_empty());
}

#[tokio::test]
async fn update_patches_only_the_tagged_contact() {
    let list = Uuid::new_v4();
    let owner = owner_with_grant();
    let store = seeded_store(list, &owner);
    let updated = member();
    let key = ReconciliationKey::for_user(updated.id);

    let mut contacts = directory_with_folder();
    contacts.expect_list_contacts().returning(move |_, _| {
        Ok(vec![
            RemoteContact {
                id: "contact-foreign".to_owned(),
                personal_notes: Some("holiday plans".to_owned()),
            },
            RemoteContact {
                id: "contact-tagged".to_owned(),
                personal_notes: Some(key.as_notes()),
            },
        ])
    });
    contacts
        .expect_update_contact()
        .withf(|_, folder, contact_id, _| folder == FOLDER && contact_id == "contact-tagged")
        .times(1)
        .returning(|_, _, _, _| Ok(()));

    let outcomes = sync(&store, contacts)
        .apply(list, &MembershipChange::Updated(updated))
        .await
        .expect("apply");

    assert_eq!(outcomes, vec![PushOutcome::Pushed]);
}

#[tokio::test]
async fn update_without_a_tagged_contact_is_a_noop() {
    let list = Uuid::new_v4();
    let owner = owner_with_grant();
    let store = seeded_store(list, &owner);

    let mut contacts = directory_with_folder();
    contacts.expect_list_contacts().returning(|_, _| Ok(Vec::new()));

    let outcomes = sync(&store, contacts)
        .apply(list, &MembershipChange::Updated(member()))
        .await
        .expect("apply");

    assert_eq!(outcomes, vec![PushOutcome::ContactMissing]);
}

#[tokio::test]
async fn removed_membership_deletes_the_tagged_contact() {
    let list = Uuid::new_v4();
    let owner = owner_with_grant();
    let store = seeded_store(list, &owner);
    let departed = Uuid::new_v4();
    let key = ReconciliationKey::for_user(departed);

    let mut contacts = directory_with_folder();
    contacts.expect_list_contacts().returning(move |_, _| {
        Ok(vec![RemoteContact {
            id: "contact-tagged".to_owned(),
            personal_notes: Some(key.as_notes()),
        }])
    });
    contacts
        .expect_delete_contact()
        .withf(|_, folder, contact_id| folder == FOLDER && contact_id == "contact-tagged")
        .times(1)
        .returning(|_, _, _| Ok(()));

    let outcomes = sync(&store, contacts)
        .apply(list, &MembershipChange::Removed(departed))
        .await
        .expect("apply");

    assert_eq!(outcomes, vec![PushOutcome::Pushed]);
}

#[tokio::test]
async fn a_rejected_grant_skips_only_that_descriptor() {
    let list = Uuid::new_v4();
    let revoked_owner = owner_with_grant();
    let healthy_owner = owner_with_grant();
    let store = InMemoryStore::new();
    store.seed_user(revoked_owner.clone());
    store.seed_user(healthy_owner.clone());
    store.seed_sync(descriptor(list, &revoked_owner));
    store.seed_sync(descriptor(list, &healthy_owner));

    let revoked_id = revoked_owner.id;
    let mut contacts = MockContactDirectory::new();
    contacts.expect_refresh_token().returning(move |owner| {
        if owner.id == revoked_id {
            Err(ContactDirectoryError::unauthorized("grant revoked"))
        } else {
            Ok(AccessToken::new("bearer"))
        }
    });
    contacts.expect_list_folders().returning(|_| {
        Ok(vec![ContactFolder {
            id: FOLDER.to_owned(),
            display_name: "Field Team".to_owned(),
        }])
    });
    contacts.expect_create_contact().times(1).returning(|_, _, _| Ok(()));

    let outcomes = sync(&store, contacts)
        .apply(list, &MembershipChange::Added(member()))
        .await
        .expect("apply");

    // The revoked descriptor contributes no outcome and stays registered
    // for the next run.
    assert_eq!(outcomes, vec![PushOutcome::Pushed]);
    assert_eq!(store.outlook_syncs().len(), 2);
}
