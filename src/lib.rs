// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Mini Messenger - wallet-authenticated contacts and messaging.
//!
//! Contacts and conversations are persisted in a managed relational store
//! when one is configured, falling back per request to an in-process store.
//! An optional contract-backed path mirrors messaging on World Chain.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Session authentication and sign-in nonces
//! - `blockchain` - Chain Mirror (messaging contract)
//! - `storage` - Persistence facade, managed store client, repositories
//! - `store` - Local Store

pub mod api;
pub mod auth;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;
pub mod store;
