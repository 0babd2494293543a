// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use tracing::info;

use crate::{
    auth::Auth,
    error::{ApiError, OrInternal},
    models::{
        AddContactRequest, ContactCheckResponse, ContactListResponse, ContactResponse,
        WalletAddress,
    },
    state::AppState,
    storage::{ContactDirectory, NewContact},
};

#[utoipa::path(
    get,
    path = "/api/contacts",
    tag = "Contacts",
    responses(
        (status = 200, body = ContactListResponse),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn list_contacts(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<ContactListResponse>, ApiError> {
    let served = ContactDirectory::new(&state.persistence)
        .list(&user.wallet_address)
        .await
        .or_internal("Failed to fetch contacts")?;

    Ok(Json(ContactListResponse {
        contacts: served.value,
        source: served.backend,
    }))
}

#[utoipa::path(
    post,
    path = "/api/contacts",
    request_body = AddContactRequest,
    tag = "Contacts",
    responses(
        (status = 200, description = "Contact stored, or the existing entry for that address", body = ContactResponse),
        (status = 400, description = "Missing address or username"),
        (status = 401, description = "Not logged in"),
        (status = 500, description = "Failed to add contact")
    )
)]
pub async fn add_contact(
    Auth(user): Auth,
    State(state): State<AppState>,
    payload: Result<Json<AddContactRequest>, JsonRejection>,
) -> Result<Json<ContactResponse>, ApiError> {
    let Json(request) = payload?;
    let contact = NewContact::try_from(request)?;

    let served = ContactDirectory::new(&state.persistence)
        .add(&user.wallet_address, contact)
        .await
        .or_internal("Failed to add contact")?;

    info!(
        owner = %user.wallet_address,
        contact = %served.value.address,
        source = %served.backend,
        "Contact added"
    );

    Ok(Json(ContactResponse {
        contact: served.value,
        source: served.backend,
    }))
}

#[utoipa::path(
    get,
    path = "/api/contacts/{address}",
    params(
        ("address" = String, Path, description = "Counterpart wallet address")
    ),
    tag = "Contacts",
    responses(
        (status = 200, body = ContactCheckResponse),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn check_contact(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<ContactCheckResponse>, ApiError> {
    let address = WalletAddress(address);
    let served = ContactDirectory::new(&state.persistence)
        .contains(&user.wallet_address, &address)
        .await
        .or_internal("Failed to check contact")?;

    Ok(Json(ContactCheckResponse {
        address,
        is_contact: served.value,
        source: served.backend,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticatedUser;
    use crate::models::Backend;
    use axum::http::StatusCode;

    fn caller(address: &str) -> Auth {
        Auth(AuthenticatedUser {
            wallet_address: WalletAddress::from(address),
            session_id: None,
            expires_at: 0,
        })
    }

    fn request(address: Option<&str>, username: Option<&str>) -> AddContactRequest {
        AddContactRequest {
            address: address.map(str::to_string),
            username: username.map(str::to_string),
            verified_human: None,
        }
    }

    #[tokio::test]
    async fn add_then_list_contact() {
        let state = AppState::default();

        let Json(added) = add_contact(
            caller("0x01"),
            State(state.clone()),
            Ok(Json(request(Some("0xAB"), Some("Bob")))),
        )
        .await
        .expect("contact is added");

        assert_eq!(added.contact.address, WalletAddress::from("0xAB"));
        assert_eq!(added.contact.username, "Bob");
        assert!(!added.contact.verified_human);
        assert_eq!(added.source, Backend::Local);

        let Json(listed) = list_contacts(caller("0x01"), State(state.clone()))
            .await
            .expect("contacts are listed");
        assert_eq!(listed.contacts, vec![added.contact]);

        let Json(others) = list_contacts(caller("0x02"), State(state))
            .await
            .expect("contacts are listed");
        assert!(others.contacts.is_empty());
    }

    #[tokio::test]
    async fn add_contact_without_username_is_rejected() {
        let state = AppState::default();

        let err = add_contact(
            caller("0x01"),
            State(state.clone()),
            Ok(Json(request(Some("0xAB"), None))),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Missing required fields");
        let stored = state
            .persistence
            .local()
            .await
            .get_contacts(&WalletAddress::from("0x01"));
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn duplicate_add_returns_existing_entry() {
        let state = AppState::default();

        let Json(first) = add_contact(
            caller("0x01"),
            State(state.clone()),
            Ok(Json(request(Some("0xAB"), Some("Bob")))),
        )
        .await
        .unwrap();
        let Json(second) = add_contact(
            caller("0x01"),
            State(state.clone()),
            Ok(Json(request(Some("0xAB"), Some("Robert")))),
        )
        .await
        .unwrap();

        assert_eq!(first.contact, second.contact);
        let Json(listed) = list_contacts(caller("0x01"), State(state)).await.unwrap();
        assert_eq!(listed.contacts.len(), 1);
    }

    #[tokio::test]
    async fn check_contact_reports_membership() {
        let state = AppState::default();
        let Json(added) = add_contact(
            caller("0x01"),
            State(state.clone()),
            Ok(Json(request(Some("0xAB"), Some("Bob")))),
        )
        .await
        .unwrap();
        assert_eq!(added.contact.address, WalletAddress::from("0xAB"));

        let Json(known) = check_contact(caller("0x01"), State(state.clone()), Path("0xAB".into()))
            .await
            .unwrap();
        assert!(known.is_contact);

        let Json(unknown) = check_contact(caller("0x01"), State(state), Path("0xCD".into()))
            .await
            .unwrap();
        assert!(!unknown.is_contact);
    }
}
