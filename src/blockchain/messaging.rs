// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Messaging contract interface.

use alloy::sol;

// The contract keys reads on `msg.sender`, so view calls must carry `from`.
sol! {
    #[sol(rpc)]
    interface IMessaging {
        struct Message {
            address from;
            address to;
            string content;
            uint256 timestamp;
            bool read;
        }

        function sendMessage(address to, string content) external;
        function getConversation(address other) external view returns (Message[] memory);
        function getMyMessages() external view returns (Message[] memory);
        function getUnreadCount() external view returns (uint256);
        function markAsRead(uint256 index) external;
    }
}
