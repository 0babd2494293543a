// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer over the persistence facade.
//!
//! Each repository validates its inputs and forwards to [`Persistence`],
//! which decides per call which backend serves it.
//!
//! [`Persistence`]: crate::storage::Persistence

pub mod contacts;
pub mod messages;

pub use contacts::{ContactDirectory, NewContact};
pub use messages::{ConversationLog, OutgoingMessage};

/// A required request field was absent or blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("missing required field `{0}`")]
pub struct MissingField(pub &'static str);

fn required(field: &'static str, value: Option<String>) -> Result<String, MissingField> {
    value
        .filter(|value| !value.trim().is_empty())
        .ok_or(MissingField(field))
}
