// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM certificate chain and key; both set enables HTTPS | unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//! | `SUPABASE_URL` / `SUPABASE_ANON_KEY` | Managed store project URL and key; both set enables it | unset |
//! | `MANAGED_STORE_TIMEOUT_SECS` | Managed store request timeout | `10` |
//! | `LOCAL_FALLBACK` | Serve from the local store when the managed store fails | `true` |
//! | `AUTH_SECRET` | HS256 secret for session tokens | Required for production |
//! | `AUTH_ISSUER` | Expected session `iss` claim | Optional |
//! | `HMAC_SECRET_KEY` | Secret for `/api/nonce` signatures | Required for `/api/nonce` |
//! | `CHAIN_MESSAGING_ENABLED` | Enable the contract-backed message routes | `false` |
//! | `CHAIN_NETWORK` | `mainnet` or `sepolia` | `mainnet` |
//! | `CHAIN_RPC_URL` | RPC endpoint override | network default |
//! | `MESSAGING_CONTRACT_ADDRESS` | Messaging contract | zero address (disabled) |

use std::time::Duration;

use crate::blockchain::{network_by_name, NetworkConfig, WORLDCHAIN_MAINNET};
use crate::state::AuthConfig;
use crate::storage::postgrest::DEFAULT_TIMEOUT;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Managed store project URL. The REST API is served under `/rest/v1/`.
pub const SUPABASE_URL_ENV: &str = "SUPABASE_URL";
pub const SUPABASE_ANON_KEY_ENV: &str = "SUPABASE_ANON_KEY";
pub const MANAGED_STORE_TIMEOUT_ENV: &str = "MANAGED_STORE_TIMEOUT_SECS";
pub const LOCAL_FALLBACK_ENV: &str = "LOCAL_FALLBACK";

/// Shared secret with the sign-in flow for HS256 session tokens.
///
/// # Security
/// When unset, session tokens are decoded without signature verification.
/// Only acceptable for local development.
pub const AUTH_SECRET_ENV: &str = "AUTH_SECRET";
pub const AUTH_ISSUER_ENV: &str = "AUTH_ISSUER";
pub const HMAC_SECRET_KEY_ENV: &str = "HMAC_SECRET_KEY";

pub const CHAIN_MESSAGING_ENABLED_ENV: &str = "CHAIN_MESSAGING_ENABLED";
pub const CHAIN_NETWORK_ENV: &str = "CHAIN_NETWORK";
pub const CHAIN_RPC_URL_ENV: &str = "CHAIN_RPC_URL";
pub const MESSAGING_CONTRACT_ADDRESS_ENV: &str = "MESSAGING_CONTRACT_ADDRESS";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} is not a valid {expected}: {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("{0} and {1} must be set together")]
    Incomplete(&'static str, &'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert_path: String,
    pub key_path: String,
}

#[derive(Debug, Clone)]
pub struct ManagedStoreConfig {
    pub project_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub network: NetworkConfig,
    pub rpc_url: String,
    pub contract_address: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
    /// `None` means local store only.
    pub managed_store: Option<ManagedStoreConfig>,
    pub local_fallback: bool,
    pub auth: AuthConfig,
    pub hmac_secret: Option<String>,
    /// `None` unless the feature flag is on.
    pub chain: Option<ChainConfig>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = match get(PORT_ENV) {
            Some(raw) => parse_number::<u16>(PORT_ENV, &raw)?,
            None => DEFAULT_PORT,
        };

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert_path), Some(key_path)) => Some(TlsPaths {
                cert_path,
                key_path,
            }),
            (None, None) => None,
            _ => return Err(ConfigError::Incomplete(TLS_CERT_PATH_ENV, TLS_KEY_PATH_ENV)),
        };

        let log_format = match get(LOG_FORMAT_ENV).map(|v| v.to_ascii_lowercase()).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        let timeout = match get(MANAGED_STORE_TIMEOUT_ENV) {
            Some(raw) => Duration::from_secs(parse_number(MANAGED_STORE_TIMEOUT_ENV, &raw)?),
            None => DEFAULT_TIMEOUT,
        };
        // Either half missing means "not configured", as the mini-app treats it.
        let managed_store = match (get(SUPABASE_URL_ENV), get(SUPABASE_ANON_KEY_ENV)) {
            (Some(project_url), Some(api_key)) => Some(ManagedStoreConfig {
                project_url,
                api_key,
                timeout,
            }),
            _ => None,
        };

        let local_fallback = match get(LOCAL_FALLBACK_ENV) {
            Some(raw) => parse_bool(LOCAL_FALLBACK_ENV, &raw)?,
            None => true,
        };

        let chain_enabled = match get(CHAIN_MESSAGING_ENABLED_ENV) {
            Some(raw) => parse_bool(CHAIN_MESSAGING_ENABLED_ENV, &raw)?,
            None => false,
        };
        let chain = if chain_enabled {
            let network = match get(CHAIN_NETWORK_ENV) {
                Some(raw) => network_by_name(&raw).ok_or(ConfigError::Invalid {
                    name: CHAIN_NETWORK_ENV,
                    expected: "network (mainnet or sepolia)",
                    value: raw,
                })?,
                None => WORLDCHAIN_MAINNET,
            };
            Some(ChainConfig {
                rpc_url: get(CHAIN_RPC_URL_ENV).unwrap_or_else(|| network.rpc_url.to_string()),
                contract_address: get(MESSAGING_CONTRACT_ADDRESS_ENV)
                    .unwrap_or_else(|| ZERO_ADDRESS.to_string()),
                network,
            })
        } else {
            None
        };

        Ok(Self {
            host: get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            tls,
            log_format,
            managed_store,
            local_fallback,
            auth: AuthConfig {
                session_secret: get(AUTH_SECRET_ENV),
                issuer: get(AUTH_ISSUER_ENV),
            },
            hmac_secret: get(HMAC_SECRET_KEY_ENV),
            chain,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Invalid {
        name,
        expected: "number",
        value: raw.to_string(),
    })
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            expected: "boolean",
            value: raw.to_string(),
        }),
    }
}
