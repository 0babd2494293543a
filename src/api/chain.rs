// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chain Mirror routes.
//!
//! Reads are answered from the messaging contract on behalf of the caller.
//! Writes return a [`PreparedTransaction`] that the caller's wallet signs and
//! submits; the server holds no keys.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::messages::ConversationQuery;
use crate::{
    auth::Auth,
    blockchain::{ChainMessage, ChainMirror, PreparedTransaction},
    error::ApiError,
    models::SendMessageRequest,
    state::AppState,
    storage::OutgoingMessage,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChainMessageListResponse {
    pub messages: Vec<ChainMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChainUnreadResponse {
    pub count: u64,
}

fn mirror(state: &AppState) -> Result<&ChainMirror, ApiError> {
    state
        .chain
        .as_deref()
        .ok_or_else(|| ApiError::service_unavailable("Chain messaging is not enabled"))
}

#[utoipa::path(
    get,
    path = "/api/chain/messages",
    tag = "Chain",
    responses(
        (status = 200, body = ChainMessageListResponse),
        (status = 401, description = "Not logged in"),
        (status = 503, description = "Chain messaging disabled or unreachable")
    )
)]
pub async fn my_messages(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<ChainMessageListResponse>, ApiError> {
    let messages = mirror(&state)?.my_messages(&user.wallet_address).await?;
    Ok(Json(ChainMessageListResponse { messages }))
}

#[utoipa::path(
    get,
    path = "/api/chain/conversation",
    params(ConversationQuery),
    tag = "Chain",
    responses(
        (status = 200, body = ChainMessageListResponse),
        (status = 400, description = "Missing or invalid contact"),
        (status = 401, description = "Not logged in"),
        (status = 503, description = "Chain messaging disabled or unreachable")
    )
)]
pub async fn conversation(
    Auth(user): Auth,
    State(state): State<AppState>,
    Query(query): Query<ConversationQuery>,
) -> Result<Json<ChainMessageListResponse>, ApiError> {
    let mirror = mirror(&state)?;
    let contact = query.contact()?;
    let messages = mirror.conversation(&user.wallet_address, &contact).await?;
    Ok(Json(ChainMessageListResponse { messages }))
}

#[utoipa::path(
    get,
    path = "/api/chain/unread",
    tag = "Chain",
    responses(
        (status = 200, body = ChainUnreadResponse),
        (status = 401, description = "Not logged in"),
        (status = 503, description = "Chain messaging disabled or unreachable")
    )
)]
pub async fn unread_count(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<ChainUnreadResponse>, ApiError> {
    let count = mirror(&state)?.unread_count(&user.wallet_address).await?;
    Ok(Json(ChainUnreadResponse { count }))
}

#[utoipa::path(
    post,
    path = "/api/chain/messages",
    request_body = SendMessageRequest,
    tag = "Chain",
    responses(
        (status = 200, description = "Unsigned sendMessage call", body = PreparedTransaction),
        (status = 400, description = "Missing or invalid fields"),
        (status = 401, description = "Not logged in"),
        (status = 503, description = "Chain messaging disabled")
    )
)]
pub async fn prepare_send(
    Auth(_user): Auth,
    State(state): State<AppState>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<PreparedTransaction>, ApiError> {
    let mirror = mirror(&state)?;
    let Json(request) = payload?;
    let outgoing = OutgoingMessage::try_from(request)?;
    Ok(Json(mirror.prepare_send(&outgoing.to, &outgoing.content)?))
}

#[utoipa::path(
    post,
    path = "/api/chain/messages/{index}/read",
    params(
        ("index" = u64, Path, description = "Index of the message in the contract's inbox")
    ),
    tag = "Chain",
    responses(
        (status = 200, description = "Unsigned markAsRead call", body = PreparedTransaction),
        (status = 401, description = "Not logged in"),
        (status = 503, description = "Chain messaging disabled")
    )
)]
pub async fn prepare_mark_as_read(
    Auth(_user): Auth,
    State(state): State<AppState>,
    Path(index): Path<u64>,
) -> Result<Json<PreparedTransaction>, ApiError> {
    Ok(Json(mirror(&state)?.prepare_mark_as_read(index)))
}
