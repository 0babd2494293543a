// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Session authentication for the messenger API.
//!
//! ## Auth Flow
//!
//! 1. The mini-app signs the user in with their wallet (external flow)
//! 2. The client sends `Authorization: Bearer <session JWT>`
//! 3. The server:
//!    - Verifies the token with HS256 when `AUTH_SECRET` is set
//!    - Checks expiry (60 second clock skew) and the optional issuer
//!    - Extracts `walletAddress` (or `sub`) as the caller's address
//!
//! `/api/nonce` issues the HMAC-signed challenge the external sign-in flow
//! consumes; see [`NonceSigner`].
//!
//! Being logged in is the only authorization check.

pub mod claims;
pub mod error;
pub mod extractor;
pub mod nonce;

pub use claims::{AuthenticatedUser, SessionClaims};
pub use error::AuthError;
pub use extractor::Auth;
pub use nonce::{IssuedNonce, NonceError, NonceSigner};
