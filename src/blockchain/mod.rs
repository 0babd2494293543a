// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chain Mirror: contract-backed message path on World Chain.
//!
//! This module provides:
//! - Reads of the messaging contract via `eth_call` on behalf of the caller
//! - Calldata for writes, returned as prepared transactions for the
//!   caller's wallet to sign and submit
//!
//! Nothing here is reconciled with the persistence facade.

pub mod client;
pub mod messaging;
pub mod types;

pub use client::{ChainError, ChainMirror};
pub use types::*;
