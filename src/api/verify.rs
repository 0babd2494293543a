// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::rejection::JsonRejection, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::{auth::Auth, error::ApiError};

/// Proof-of-personhood payload produced by the client-side verification
/// widget. Field names follow the proof service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct VerifyContactRequest {
    #[serde(default)]
    pub proof: Option<String>,
    #[serde(default)]
    pub merkle_root: Option<String>,
    #[serde(default)]
    pub nullifier_hash: Option<String>,
    #[serde(default)]
    pub signal: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifyContactResponse {
    pub verified: bool,
}

/// Accept a proof for a contact.
///
/// The proof is not checked against the external proof service yet; every
/// well-formed request is accepted.
#[utoipa::path(
    post,
    path = "/api/verify-contact",
    request_body = VerifyContactRequest,
    tag = "Contacts",
    responses(
        (status = 200, body = VerifyContactResponse),
        (status = 400, description = "Malformed body"),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn verify_contact(
    Auth(user): Auth,
    payload: Result<Json<VerifyContactRequest>, JsonRejection>,
) -> Result<Json<VerifyContactResponse>, ApiError> {
    let Json(request) = payload?;

    info!(
        caller = %user.wallet_address,
        signal = request.signal.as_deref().unwrap_or_default(),
        has_proof = request.proof.is_some(),
        nullifier_hash = request.nullifier_hash.as_deref().unwrap_or_default(),
        "Accepting contact proof without external verification"
    );

    Ok(Json(VerifyContactResponse { verified: true }))
}
