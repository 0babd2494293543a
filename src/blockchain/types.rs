// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chain Mirror types and constants.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::messaging::IMessaging;

/// World Chain network configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// Chain ID
    pub chain_id: u64,
    /// Default public RPC endpoint
    pub rpc_url: &'static str,
    /// Block explorer URL
    pub explorer_url: &'static str,
}

/// World Chain mainnet configuration.
pub const WORLDCHAIN_MAINNET: NetworkConfig = NetworkConfig {
    name: "World Chain",
    chain_id: 480,
    rpc_url: "https://worldchain-mainnet.g.alchemy.com/public",
    explorer_url: "https://worldchain-mainnet.explorer.alchemy.com",
};

/// World Chain Sepolia testnet configuration.
pub const WORLDCHAIN_SEPOLIA: NetworkConfig = NetworkConfig {
    name: "World Chain Sepolia",
    chain_id: 11155420,
    rpc_url: "https://worldchain-sepolia.g.alchemy.com/public",
    explorer_url: "https://worldchain-sepolia.explorer.alchemy.com",
};

pub const NETWORK_MAINNET: &str = "mainnet";
pub const NETWORK_SEPOLIA: &str = "sepolia";

/// Resolve a `CHAIN_NETWORK` value (case-insensitive).
pub fn network_by_name(raw: &str) -> Option<NetworkConfig> {
    match raw.trim().to_ascii_lowercase().as_str() {
        NETWORK_MAINNET => Some(WORLDCHAIN_MAINNET),
        NETWORK_SEPOLIA => Some(WORLDCHAIN_SEPOLIA),
        _ => None,
    }
}

/// A message as stored by the messaging contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChainMessage {
    /// Sender (checksummed)
    pub from: String,
    /// Recipient (checksummed)
    pub to: String,
    pub content: String,
    /// Block timestamp in seconds
    pub timestamp: u64,
    pub read: bool,
}

impl From<IMessaging::Message> for ChainMessage {
    fn from(message: IMessaging::Message) -> Self {
        Self {
            from: message.from.to_checksum(None),
            to: message.to.to_checksum(None),
            content: message.content,
            timestamp: message.timestamp.saturating_to::<u64>(),
            read: message.read,
        }
    }
}

/// Unsigned contract call for the caller's wallet to sign and submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreparedTransaction {
    /// Contract address
    pub to: String,
    /// 0x-prefixed ABI-encoded calldata
    pub data: String,
    pub chain_id: u64,
    /// Contract function being called
    pub function: String,
}
