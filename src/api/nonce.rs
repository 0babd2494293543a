// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::{auth::IssuedNonce, error::ApiError, state::AppState};

/// Issue a signed nonce for the wallet sign-in challenge.
///
/// Public: the caller is not logged in yet.
#[utoipa::path(
    get,
    path = "/api/nonce",
    tag = "Auth",
    responses(
        (status = 200, body = IssuedNonce),
        (status = 500, description = "Failed to generate nonce")
    )
)]
pub async fn get_nonce(State(state): State<AppState>) -> Result<Json<IssuedNonce>, ApiError> {
    let signer = state.nonce_signer.as_ref().ok_or_else(|| {
        tracing::error!("Nonce requested but HMAC_SECRET_KEY is not configured");
        ApiError::internal("Failed to generate nonce")
    })?;

    let issued = signer
        .issue()
        .map_err(|e| ApiError::internal_from("Failed to generate nonce", &e))?;
    Ok(Json(issued))
}
