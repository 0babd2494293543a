// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Persistence facade: per-request routing between the managed store and the
//! Local Store.
//!
//! ## Routing
//!
//! 1. If a managed store is configured, the operation is attempted there
//!    first. Configuration presence, not reachability, gates the attempt.
//! 2. On a managed-store error the failure is logged and, when fallback is
//!    enabled, the same operation runs against the Local Store.
//! 3. The result is returned as [`Served`], naming the backend that produced
//!    it.
//!
//! ## Consistency
//!
//! The decision is made per request. Data written to the Local Store while
//! the managed store was unreachable stays there and is not visible once the
//! managed store answers again. No reconciliation is attempted.
//!
//! Contact adds are serialized per owner, so the managed store's
//! find-then-insert runs as one step with respect to other adds.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tracing::{error, warn};

use super::managed::{ManagedStore, ManagedStoreError, StoreFuture};
use crate::models::{Backend, Contact, Message, WalletAddress};
use crate::store::LocalStore;

/// A value together with the backend that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Served<T> {
    pub value: T,
    pub backend: Backend,
}

impl<T> Served<T> {
    pub fn managed(value: T) -> Self {
        Self {
            value,
            backend: Backend::Managed,
        }
    }

    pub fn local(value: T) -> Self {
        Self {
            value,
            backend: Backend::Local,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Served<U> {
        Served {
            value: f(self.value),
            backend: self.backend,
        }
    }
}

/// Raised only when the managed store fails and no fallback is allowed.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("{operation} failed on managed store: {source}")]
    Managed {
        operation: &'static str,
        #[source]
        source: ManagedStoreError,
    },
}

pub type PersistenceResult<T> = Result<Served<T>, PersistenceError>;

pub struct Persistence {
    local: Mutex<LocalStore>,
    managed: Option<Arc<dyn ManagedStore>>,
    fallback: bool,
    contact_writes: Mutex<HashMap<WalletAddress, Arc<Mutex<()>>>>,
}

impl Persistence {
    /// Facade over the given Local Store with no managed store configured.
    pub fn new(local: LocalStore) -> Self {
        Self {
            local: Mutex::new(local),
            managed: None,
            fallback: true,
            contact_writes: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_managed(mut self, store: Arc<dyn ManagedStore>) -> Self {
        self.managed = Some(store);
        self
    }

    /// Enable or disable falling back to the Local Store on managed errors.
    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.fallback = enabled;
        self
    }

    pub fn fallback_enabled(&self) -> bool {
        self.fallback
    }

    pub fn managed(&self) -> Option<&dyn ManagedStore> {
        self.managed.as_deref()
    }

    /// Direct access to the Local Store.
    pub async fn local(&self) -> MutexGuard<'_, LocalStore> {
        self.local.lock().await
    }

    async fn contact_write_lock(&self, owner: &WalletAddress) -> Arc<Mutex<()>> {
        let mut locks = self.contact_writes.lock().await;
        locks.entry(owner.clone()).or_default().clone()
    }

    async fn route<'a, T>(
        &'a self,
        operation: &'static str,
        managed: impl FnOnce(&'a dyn ManagedStore) -> StoreFuture<'a, T>,
        local: impl FnOnce(&mut LocalStore) -> T,
    ) -> PersistenceResult<T> {
        if let Some(store) = self.managed.as_deref() {
            match managed(store).await {
                Ok(value) => return Ok(Served::managed(value)),
                Err(e) if self.fallback => {
                    warn!(
                        operation,
                        backend = store.name(),
                        error = %e,
                        "Managed store call failed, serving from local store"
                    );
                }
                Err(e) => {
                    error!(
                        operation,
                        backend = store.name(),
                        error = %e,
                        "Managed store call failed and local fallback is disabled"
                    );
                    return Err(PersistenceError::Managed {
                        operation,
                        source: e,
                    });
                }
            }
        }

        let mut store = self.local.lock().await;
        Ok(Served::local(local(&mut store)))
    }

    pub async fn list_contacts(&self, owner: &WalletAddress) -> PersistenceResult<Vec<Contact>> {
        self.route(
            "list_contacts",
            |store| store.list_contacts(owner),
            |local| local.get_contacts(owner),
        )
        .await
    }

    /// Add a contact unless the owner already has one with that address.
    /// Returns the entry stored after the call.
    pub async fn add_contact(
        &self,
        owner: &WalletAddress,
        contact: Contact,
    ) -> PersistenceResult<Contact> {
        let lock = self.contact_write_lock(owner).await;
        let _serialized = lock.lock().await;

        let candidate = contact.clone();
        self.route(
            "add_contact",
            |store| {
                Box::pin(async move {
                    if let Some(existing) = store.find_contact(owner, &candidate.address).await? {
                        return Ok(existing);
                    }
                    store.insert_contact(owner, &candidate).await
                })
            },
            |local| local.add_contact(owner, contact),
        )
        .await
    }

    pub async fn is_contact(
        &self,
        owner: &WalletAddress,
        address: &WalletAddress,
    ) -> PersistenceResult<bool> {
        self.route(
            "is_contact",
            |store| {
                Box::pin(async move {
                    let found = store.find_contact(owner, address).await?;
                    Ok::<_, ManagedStoreError>(found.is_some())
                })
            },
            |local| local.is_contact(owner, address),
        )
        .await
    }

    pub async fn list_messages(
        &self,
        user: &WalletAddress,
        contact: &WalletAddress,
    ) -> PersistenceResult<Vec<Message>> {
        self.route(
            "list_messages",
            |store| store.list_conversation(user, contact),
            |local| local.get_messages(user, contact),
        )
        .await
    }

    pub async fn send_message(
        &self,
        from: &WalletAddress,
        to: &WalletAddress,
        content: &str,
    ) -> PersistenceResult<Message> {
        self.route(
            "send_message",
            |store| store.insert_message(from, to, content),
            |local| local.send_message(from, to, content),
        )
        .await
    }

    pub async fn mark_as_read(&self, message_id: &str) -> PersistenceResult<Option<Message>> {
        self.route(
            "mark_as_read",
            |store| store.mark_as_read(message_id),
            |local| local.mark_as_read(message_id),
        )
        .await
    }

    pub async fn unread_count(&self, user: &WalletAddress) -> PersistenceResult<u64> {
        self.route(
            "unread_count",
            |store| store.unread_count(user),
            |local| local.unread_count(user),
        )
        .await
    }
}

impl Default for Persistence {
    fn default() -> Self {
        Self::new(LocalStore::new())
    }
}
