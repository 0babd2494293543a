// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::NonceSigner;
use crate::blockchain::ChainMirror;
use crate::storage::Persistence;

/// Session verification settings.
///
/// Without a secret, sessions are decoded but not signature-checked.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub session_secret: Option<String>,
    pub issuer: Option<String>,
}

/// Shared handles, created once at startup and cloned into each handler.
#[derive(Clone)]
pub struct AppState {
    pub persistence: Arc<Persistence>,
    pub auth_config: AuthConfig,
    pub nonce_signer: Option<NonceSigner>,
    pub chain: Option<Arc<ChainMirror>>,
}

impl AppState {
    pub fn new(persistence: Persistence) -> Self {
        Self {
            persistence: Arc::new(persistence),
            auth_config: AuthConfig::default(),
            nonce_signer: None,
            chain: None,
        }
    }

    pub fn with_auth_config(mut self, auth_config: AuthConfig) -> Self {
        self.auth_config = auth_config;
        self
    }

    pub fn with_nonce_signer(mut self, signer: NonceSigner) -> Self {
        self.nonce_signer = Some(signer);
        self
    }

    pub fn with_chain(mut self, chain: ChainMirror) -> Self {
        self.chain = Some(Arc::new(chain));
        self
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Persistence::default())
    }
}
