// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistence for contacts and messages.
//!
//! ## Layers
//!
//! ```text
//! repository::{ContactDirectory, ConversationLog}   validation, thin wrappers
//!            │
//!        Persistence (facade)                      per-request backend choice
//!        │                 │
//!  ManagedStore        LocalStore (crate::store)
//!  (PostgrestClient)
//! ```
//!
//! ## Tables (managed store)
//!
//! ```text
//! contacts(user_address, contact_address, username, verified_human, created_at)
//! messages(from_address, to_address, content, read, created_at)
//! ```

pub mod facade;
pub mod managed;
pub mod postgrest;
pub mod repository;

pub use facade::{Persistence, PersistenceError, PersistenceResult, Served};
pub use managed::{ManagedStore, ManagedStoreError, StoreFuture};
pub use postgrest::PostgrestClient;
pub use repository::{ContactDirectory, ConversationLog, MissingField, NewContact, OutgoingMessage};
