// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session claims and authenticated user representation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::AuthError;
use crate::models::WalletAddress;

/// Claims carried by the session token issued after wallet sign-in.
///
/// The wallet address is read from `walletAddress`, falling back to `sub`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject
    #[serde(default)]
    pub sub: String,

    /// Wallet address established by the sign-in flow
    #[serde(
        default,
        rename = "walletAddress",
        skip_serializing_if = "Option::is_none"
    )]
    pub wallet_address: Option<String>,

    /// Issued at timestamp
    #[serde(default)]
    pub iat: i64,

    /// Expiration timestamp
    #[serde(default)]
    pub exp: i64,

    /// Issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Session ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
}

/// Authenticated user information extracted from the session.
///
/// This is the primary type used throughout the application to represent
/// the caller. "Logged in" is the only authorization check performed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Wallet address of the caller
    pub wallet_address: WalletAddress,

    /// Session ID (if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Token expiration (Unix timestamp, not serialized)
    #[serde(skip)]
    pub expires_at: i64,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: SessionClaims) -> Result<Self, AuthError> {
        let wallet_address = claims
            .wallet_address
            .filter(|address| !address.trim().is_empty())
            .or_else(|| Some(claims.sub).filter(|sub| !sub.trim().is_empty()))
            .ok_or(AuthError::MissingWalletAddress)?;

        Ok(Self {
            wallet_address: WalletAddress(wallet_address),
            session_id: claims.sid,
            expires_at: claims.exp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_claims() -> SessionClaims {
        SessionClaims {
            sub: "user_123".to_string(),
            wallet_address: Some("0x01".to_string()),
            iat: 1700000000,
            exp: 1700003600,
            iss: None,
            sid: Some("sess_abc".to_string()),
        }
    }

    #[test]
    fn from_claims_prefers_wallet_address() {
        let user = AuthenticatedUser::from_claims(sample_claims()).unwrap();
        assert_eq!(user.wallet_address, WalletAddress::from("0x01"));
        assert_eq!(user.session_id.as_deref(), Some("sess_abc"));
        assert_eq!(user.expires_at, 1700003600);
    }

    #[test]
    fn from_claims_falls_back_to_subject() {
        let mut claims = sample_claims();
        claims.wallet_address = Some("  ".into());
        let user = AuthenticatedUser::from_claims(claims).unwrap();
        assert_eq!(user.wallet_address, WalletAddress::from("user_123"));
    }

    #[test]
    fn from_claims_requires_some_address() {
        let claims = SessionClaims {
            exp: 1,
            ..Default::default()
        };
        assert!(matches!(
            AuthenticatedUser::from_claims(claims),
            Err(AuthError::MissingWalletAddress)
        ));
    }
}
