// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process Local Store for contacts and messages.
//!
//! Used when no managed store is configured, or as the per-request fallback
//! when the managed store fails. Contents live for the lifetime of the
//! process. There is no eviction and no size cap.
//!
//! The store itself is not synchronized; the persistence facade owns it
//! behind a mutex so a read-then-append within one operation is never
//! interleaved with another request.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Contact, Message, WalletAddress};

#[derive(Debug, Default)]
pub struct LocalStore {
    messages: Vec<Message>,
    contacts: HashMap<WalletAddress, Vec<Contact>>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl LocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new unread message and return it.
    ///
    /// Timestamps never go backwards within one store, even if the wall
    /// clock does.
    pub fn send_message(
        &mut self,
        from: &WalletAddress,
        to: &WalletAddress,
        content: &str,
    ) -> Message {
        let timestamp = self.next_timestamp();
        let message = Message {
            id: Uuid::now_v7().to_string(),
            from_address: from.clone(),
            to_address: to.clone(),
            content: content.to_string(),
            timestamp,
            read: false,
        };
        self.messages.push(message.clone());
        message
    }

    /// Full history between two addresses, oldest first.
    ///
    /// The pair is unordered. Equal timestamps keep insertion order.
    pub fn get_messages(&self, user: &WalletAddress, contact: &WalletAddress) -> Vec<Message> {
        let mut conversation: Vec<Message> = self
            .messages
            .iter()
            .filter(|message| is_between(message, user, contact))
            .cloned()
            .collect();
        conversation.sort_by_key(|message| message.timestamp);
        conversation
    }

    /// Set `read` on the message with `message_id`. Returns the updated
    /// message, or `None` if no such message exists.
    pub fn mark_as_read(&mut self, message_id: &str) -> Option<Message> {
        let message = self
            .messages
            .iter_mut()
            .find(|message| message.id == message_id)?;
        message.read = true;
        Some(message.clone())
    }

    /// Number of unread messages addressed to `user`.
    pub fn unread_count(&self, user: &WalletAddress) -> u64 {
        self.messages
            .iter()
            .filter(|message| &message.to_address == user && !message.read)
            .count() as u64
    }

    /// Add `contact` to the owner's list unless one with the same address is
    /// already present. Returns the entry that is stored after the call.
    pub fn add_contact(&mut self, owner: &WalletAddress, contact: Contact) -> Contact {
        let owner_contacts = self.contacts.entry(owner.clone()).or_default();
        if let Some(existing) = owner_contacts
            .iter()
            .find(|existing| existing.address == contact.address)
        {
            return existing.clone();
        }
        owner_contacts.push(contact.clone());
        contact
    }

    /// The owner's contacts in insertion order; empty if none were added.
    pub fn get_contacts(&self, owner: &WalletAddress) -> Vec<Contact> {
        self.contacts.get(owner).cloned().unwrap_or_default()
    }

    pub fn is_contact(&self, owner: &WalletAddress, address: &WalletAddress) -> bool {
        self.contacts
            .get(owner)
            .is_some_and(|contacts| contacts.iter().any(|contact| &contact.address == address))
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let timestamp = match self.last_timestamp {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_timestamp = Some(timestamp);
        timestamp
    }
}

fn is_between(message: &Message, a: &WalletAddress, b: &WalletAddress) -> bool {
    (&message.from_address == a && &message.to_address == b)
        || (&message.from_address == b && &message.to_address == a)
}
