// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Conversation Log.
//!
//! Append and retrieve messages between two addresses. Retrieval always
//! returns the full history for the pair, oldest first. No pagination, no
//! length limit, no expiry. Correspondents do not need to be contacts.

use super::{required, MissingField};
use crate::models::{Message, SendMessageRequest, WalletAddress};
use crate::storage::{Persistence, PersistenceResult};

/// A validated outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub to: WalletAddress,
    pub content: String,
}

impl TryFrom<SendMessageRequest> for OutgoingMessage {
    type Error = MissingField;

    fn try_from(request: SendMessageRequest) -> Result<Self, Self::Error> {
        let to = required("toAddress", request.to_address)?;
        let content = request
            .content
            .filter(|content| !content.is_empty())
            .ok_or(MissingField("content"))?;
        Ok(Self {
            to: WalletAddress(to),
            content,
        })
    }
}

pub struct ConversationLog<'a> {
    persistence: &'a Persistence,
}

impl<'a> ConversationLog<'a> {
    pub fn new(persistence: &'a Persistence) -> Self {
        Self { persistence }
    }

    pub async fn send(
        &self,
        from: &WalletAddress,
        message: &OutgoingMessage,
    ) -> PersistenceResult<Message> {
        self.persistence
            .send_message(from, &message.to, &message.content)
            .await
    }

    /// Full history between `user` and `contact`, in either direction.
    pub async fn history(
        &self,
        user: &WalletAddress,
        contact: &WalletAddress,
    ) -> PersistenceResult<Vec<Message>> {
        self.persistence.list_messages(user, contact).await
    }

    pub async fn mark_read(&self, message_id: &str) -> PersistenceResult<Option<Message>> {
        self.persistence.mark_as_read(message_id).await
    }

    pub async fn unread_count(&self, user: &WalletAddress) -> PersistenceResult<u64> {
        self.persistence.unread_count(user).await
    }
}
