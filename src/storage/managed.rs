// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Managed store abstraction.
//!
//! The managed store is the external relational service used as primary
//! persistence. Implementations normalize their row shapes into the
//! canonical [`Contact`] and [`Message`] records before returning, so the
//! facade and handlers never see backend-specific field names.

use std::future::Future;
use std::pin::Pin;

use crate::models::{Contact, Message, WalletAddress};

/// Boxed future returned by [`ManagedStore`] operations.
pub type StoreFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, ManagedStoreError>> + Send + 'a>>;

/// Errors reported by a managed store client.
#[derive(Debug, thiserror::Error)]
pub enum ManagedStoreError {
    #[error("managed store configuration invalid: {0}")]
    Configuration(String),

    #[error("managed store request failed: {0}")]
    Request(String),

    #[error("managed store returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("managed store response was invalid: {0}")]
    InvalidResponse(String),
}

/// Operations the persistence facade needs from a managed store.
pub trait ManagedStore: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// The owner's contacts, oldest first.
    fn list_contacts<'a>(&'a self, owner: &'a WalletAddress) -> StoreFuture<'a, Vec<Contact>>;

    fn find_contact<'a>(
        &'a self,
        owner: &'a WalletAddress,
        address: &'a WalletAddress,
    ) -> StoreFuture<'a, Option<Contact>>;

    /// Insert a contact. A store that enforces one row per
    /// `(owner, address)` returns the existing row instead.
    fn insert_contact<'a>(
        &'a self,
        owner: &'a WalletAddress,
        contact: &'a Contact,
    ) -> StoreFuture<'a, Contact>;

    /// Messages between `a` and `b` in either direction, oldest first.
    fn list_conversation<'a>(
        &'a self,
        a: &'a WalletAddress,
        b: &'a WalletAddress,
    ) -> StoreFuture<'a, Vec<Message>>;

    fn insert_message<'a>(
        &'a self,
        from: &'a WalletAddress,
        to: &'a WalletAddress,
        content: &'a str,
    ) -> StoreFuture<'a, Message>;

    fn mark_as_read<'a>(&'a self, message_id: &'a str) -> StoreFuture<'a, Option<Message>>;

    fn unread_count<'a>(&'a self, user: &'a WalletAddress) -> StoreFuture<'a, u64>;

    /// Cheap connectivity check used by the readiness probe.
    fn ping(&self) -> StoreFuture<'_, ()>;
}
