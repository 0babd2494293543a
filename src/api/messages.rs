// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::info;
use utoipa::IntoParams;

use crate::{
    auth::Auth,
    error::{ApiError, OrInternal},
    models::{
        MessageListResponse, MessageResponse, SendMessageRequest, UnreadCountResponse,
        WalletAddress,
    },
    state::AppState,
    storage::{ConversationLog, OutgoingMessage},
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ConversationQuery {
    /// Counterpart wallet address.
    pub contact: Option<String>,
}

impl ConversationQuery {
    pub fn contact(&self) -> Result<WalletAddress, ApiError> {
        self.contact
            .as_deref()
            .filter(|contact| !contact.trim().is_empty())
            .map(WalletAddress::from)
            .ok_or_else(|| ApiError::bad_request("Contact address required"))
    }
}

#[utoipa::path(
    get,
    path = "/api/messages",
    params(ConversationQuery),
    tag = "Messages",
    responses(
        (status = 200, description = "Full conversation, oldest first", body = MessageListResponse),
        (status = 400, description = "Missing contact"),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn list_messages(
    Auth(user): Auth,
    State(state): State<AppState>,
    Query(query): Query<ConversationQuery>,
) -> Result<Json<MessageListResponse>, ApiError> {
    let contact = query.contact()?;
    let served = ConversationLog::new(&state.persistence)
        .history(&user.wallet_address, &contact)
        .await
        .or_internal("Failed to fetch messages")?;

    Ok(Json(MessageListResponse {
        messages: served.value,
        source: served.backend,
    }))
}

#[utoipa::path(
    post,
    path = "/api/messages",
    request_body = SendMessageRequest,
    tag = "Messages",
    responses(
        (status = 200, body = MessageResponse),
        (status = 400, description = "Missing toAddress or content"),
        (status = 401, description = "Not logged in"),
        (status = 500, description = "Failed to send message")
    )
)]
pub async fn send_message(
    Auth(user): Auth,
    State(state): State<AppState>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload?;
    let outgoing = OutgoingMessage::try_from(request)?;

    let served = ConversationLog::new(&state.persistence)
        .send(&user.wallet_address, &outgoing)
        .await
        .or_internal("Failed to send message")?;

    info!(
        message_id = %served.value.id,
        from = %user.wallet_address,
        to = %outgoing.to,
        source = %served.backend,
        "Message sent"
    );

    Ok(Json(MessageResponse {
        message: served.value,
        source: served.backend,
    }))
}

#[utoipa::path(
    get,
    path = "/api/messages/unread",
    tag = "Messages",
    responses(
        (status = 200, body = UnreadCountResponse),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn unread_count(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<UnreadCountResponse>, ApiError> {
    let served = ConversationLog::new(&state.persistence)
        .unread_count(&user.wallet_address)
        .await
        .or_internal("Failed to count unread messages")?;

    Ok(Json(UnreadCountResponse {
        count: served.value,
        source: served.backend,
    }))
}

#[utoipa::path(
    post,
    path = "/api/messages/{message_id}/read",
    params(
        ("message_id" = String, Path, description = "Identifier of the message to mark as read")
    ),
    tag = "Messages",
    responses(
        (status = 200, body = MessageResponse),
        (status = 401, description = "Not logged in"),
        (status = 404, description = "Message not found")
    )
)]
pub async fn mark_as_read(
    Auth(_user): Auth,
    State(state): State<AppState>,
    Path(message_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let served = ConversationLog::new(&state.persistence)
        .mark_read(&message_id)
        .await
        .or_internal("Failed to mark message as read")?;

    let backend = served.backend;
    let message = served
        .value
        .ok_or_else(|| ApiError::not_found("Message not found"))?;

    Ok(Json(MessageResponse {
        message,
        source: backend,
    }))
}
