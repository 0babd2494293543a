// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Contact Directory.
//!
//! Add and list contacts per owning user. An owner holds at most one entry
//! per counterpart address; adding the same address again leaves the stored
//! entry untouched. There is no update or delete.

use chrono::Utc;

use super::{required, MissingField};
use crate::models::{AddContactRequest, Contact, WalletAddress};
use crate::storage::{Persistence, PersistenceResult};

/// A validated contact ready to be added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContact {
    pub address: WalletAddress,
    pub username: String,
    pub verified_human: bool,
}

impl TryFrom<AddContactRequest> for NewContact {
    type Error = MissingField;

    fn try_from(request: AddContactRequest) -> Result<Self, Self::Error> {
        let address = required("address", request.address)?;
        let username = required("username", request.username)?;
        Ok(Self {
            address: WalletAddress(address),
            username: username.trim().to_string(),
            verified_human: request.verified_human.unwrap_or(false),
        })
    }
}

pub struct ContactDirectory<'a> {
    persistence: &'a Persistence,
}

impl<'a> ContactDirectory<'a> {
    pub fn new(persistence: &'a Persistence) -> Self {
        Self { persistence }
    }

    /// The owner's contacts in insertion order.
    pub async fn list(&self, owner: &WalletAddress) -> PersistenceResult<Vec<Contact>> {
        self.persistence.list_contacts(owner).await
    }

    /// Add a contact, stamped with the current time.
    ///
    /// If the owner already has a contact with this address the existing
    /// entry is returned unchanged.
    pub async fn add(
        &self,
        owner: &WalletAddress,
        contact: NewContact,
    ) -> PersistenceResult<Contact> {
        let contact = Contact {
            address: contact.address,
            username: contact.username,
            verified_human: contact.verified_human,
            added_at: Utc::now(),
        };
        self.persistence.add_contact(owner, contact).await
    }

    pub async fn contains(
        &self,
        owner: &WalletAddress,
        address: &WalletAddress,
    ) -> PersistenceResult<bool> {
        self.persistence.is_contact(owner, address).await
    }
}
