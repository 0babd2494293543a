// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! World Chain client for the messaging contract.

use std::str::FromStr;

use alloy::{
    primitives::{Address, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    sol_types::SolCall,
};

use super::messaging::IMessaging;
use super::types::*;
use crate::models::WalletAddress;

/// Contract-backed message path.
pub struct ChainMirror {
    /// Network configuration
    network: NetworkConfig,
    contract_address: Address,
    provider: DynProvider,
    messaging: IMessaging::IMessagingInstance<DynProvider>,
}

impl ChainMirror {
    /// Create a mirror for `contract_address` on `network`.
    ///
    /// The zero address means "not deployed" and is rejected. No network
    /// request is made here.
    pub fn new(
        network: NetworkConfig,
        rpc_url: &str,
        contract_address: &str,
    ) -> Result<Self, ChainError> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| ChainError::InvalidRpcUrl(e.to_string()))?;

        let contract_address = parse_address(contract_address)?;
        if contract_address.is_zero() {
            return Err(ChainError::ContractNotConfigured);
        }

        let provider = ProviderBuilder::new().connect_http(url).erased();
        let messaging = IMessaging::new(contract_address, provider.clone());

        Ok(Self {
            network,
            contract_address,
            provider,
            messaging,
        })
    }

    /// Get the network configuration.
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    /// Messages between `user` and `other`, as seen by `user`.
    pub async fn conversation(
        &self,
        user: &WalletAddress,
        other: &WalletAddress,
    ) -> Result<Vec<ChainMessage>, ChainError> {
        let caller = parse_address(user.as_str())?;
        let other = parse_address(other.as_str())?;

        let messages = self
            .messaging
            .getConversation(other)
            .from(caller)
            .call()
            .await
            .map_err(|e| ChainError::Contract(e.to_string()))?;

        Ok(messages.into_iter().map(ChainMessage::from).collect())
    }

    /// All messages involving `user`.
    pub async fn my_messages(&self, user: &WalletAddress) -> Result<Vec<ChainMessage>, ChainError> {
        let caller = parse_address(user.as_str())?;

        let messages = self
            .messaging
            .getMyMessages()
            .from(caller)
            .call()
            .await
            .map_err(|e| ChainError::Contract(e.to_string()))?;

        Ok(messages.into_iter().map(ChainMessage::from).collect())
    }

    pub async fn unread_count(&self, user: &WalletAddress) -> Result<u64, ChainError> {
        let caller = parse_address(user.as_str())?;

        let count = self
            .messaging
            .getUnreadCount()
            .from(caller)
            .call()
            .await
            .map_err(|e| ChainError::Contract(e.to_string()))?;

        Ok(count.saturating_to::<u64>())
    }

    /// Calldata for `sendMessage(to, content)`.
    pub fn prepare_send(
        &self,
        to: &WalletAddress,
        content: &str,
    ) -> Result<PreparedTransaction, ChainError> {
        let call = IMessaging::sendMessageCall {
            to: parse_address(to.as_str())?,
            content: content.to_string(),
        };
        Ok(self.prepared(call))
    }

    /// Calldata for `markAsRead(index)`.
    pub fn prepare_mark_as_read(&self, index: u64) -> PreparedTransaction {
        self.prepared(IMessaging::markAsReadCall {
            index: U256::from(index),
        })
    }

    /// Get the current block number.
    pub async fn block_number(&self) -> Result<u64, ChainError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }

    fn prepared<C: SolCall>(&self, call: C) -> PreparedTransaction {
        PreparedTransaction {
            to: self.contract_address.to_checksum(None),
            data: alloy::hex::encode_prefixed(call.abi_encode()),
            chain_id: self.network.chain_id,
            function: C::SIGNATURE
                .split('(')
                .next()
                .unwrap_or(C::SIGNATURE)
                .to_string(),
        }
    }
}

fn parse_address(raw: &str) -> Result<Address, ChainError> {
    Address::from_str(raw.trim()).map_err(|e| ChainError::InvalidAddress(format!("{raw}: {e}")))
}

/// Chain Mirror errors.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Messaging contract address is not configured")]
    ContractNotConfigured,

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Contract error: {0}")]
    Contract(String),
}
