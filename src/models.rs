// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the canonical records and the request/response
//! structures used by the REST API. All types derive `Serialize`,
//! `Deserialize`, and `ToSchema` for automatic JSON handling and OpenAPI
//! documentation. Wire names are camelCase (`fromAddress`, `verifiedHuman`).
//!
//! ## Wallet Address Type
//!
//! The [`WalletAddress`] newtype wraps wallet identifiers. Addresses are
//! compared exactly as given; no checksum normalization is applied.
//!
//! ## Model Categories
//!
//! - **Contacts**: Directory entries linking an owner to a counterpart address
//! - **Messages**: Conversation entries between two addresses
//! - **Backend**: Which persistence backend served a request

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Wallet Address Type
// =============================================================================

/// Wallet address wrapper.
///
/// Provides type safety for wallet addresses throughout the API.
///
/// # Example
///
/// ```rust,ignore
/// let addr = WalletAddress::from("0x742d35Cc6634C0532925a3b844Bc9e7595f4aB12");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WalletAddress(pub String);

impl WalletAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for WalletAddress {
    fn from(value: String) -> Self {
        WalletAddress(value)
    }
}

impl From<&str> for WalletAddress {
    fn from(value: &str) -> Self {
        WalletAddress(value.to_string())
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.0
    }
}

// =============================================================================
// Contact Models
// =============================================================================

/// A directory entry owned by exactly one user.
///
/// Contacts are never mutated or deleted. Within one owner's set, `address`
/// is unique.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// Counterpart wallet address.
    pub address: WalletAddress,
    /// Display name chosen when the contact was added.
    pub username: String,
    /// Whether the counterpart passed proof-of-personhood verification.
    pub verified_human: bool,
    /// When the contact was added.
    pub added_at: DateTime<Utc>,
}

/// Request to add a contact.
///
/// Fields are optional at the wire level so that missing values can be
/// answered with 400 rather than a deserialization rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddContactRequest {
    /// Counterpart wallet address (required).
    pub address: Option<String>,
    /// Display name (required).
    pub username: Option<String>,
    /// Verification flag, defaults to `false`.
    pub verified_human: Option<bool>,
}

/// Response wrapping a single contact.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContactResponse {
    pub contact: Contact,
    pub source: Backend,
}

/// Response wrapping the caller's contact list.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContactListResponse {
    pub contacts: Vec<Contact>,
    pub source: Backend,
}

/// Membership test result for `GET /api/contacts/{address}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactCheckResponse {
    pub address: WalletAddress,
    pub is_contact: bool,
    pub source: Backend,
}

// =============================================================================
// Message Models
// =============================================================================

/// A message between two addresses.
///
/// `read` is the only mutable field and only ever moves from `false` to
/// `true`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Creation-time-ordered identifier.
    pub id: String,
    pub from_address: WalletAddress,
    pub to_address: WalletAddress,
    pub content: String,
    /// Send time.
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

/// Request to send a message from the authenticated user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    /// Recipient wallet address (required).
    pub to_address: Option<String>,
    /// Message body (required).
    pub content: Option<String>,
}

/// Response wrapping a single message.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: Message,
    pub source: Backend,
}

/// Response wrapping a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageListResponse {
    pub messages: Vec<Message>,
    pub source: Backend,
}

/// Unread message count for the caller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UnreadCountResponse {
    pub count: u64,
    pub source: Backend,
}

// =============================================================================
// Backend Metadata
// =============================================================================

/// The persistence backend that served a request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// The external managed relational store.
    Managed,
    /// The in-process Local Store.
    Local,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Managed => write!(f, "managed"),
            Backend::Local => write!(f, "local"),
        }
    }
}
