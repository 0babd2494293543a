// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::IssuedNonce,
    blockchain::{ChainMessage, PreparedTransaction},
    models::{
        AddContactRequest, Backend, Contact, ContactCheckResponse, ContactListResponse,
        ContactResponse, Message, MessageListResponse, MessageResponse, SendMessageRequest,
        UnreadCountResponse, WalletAddress,
    },
    state::AppState,
};

pub mod chain;
pub mod contacts;
pub mod health;
pub mod messages;
pub mod nonce;
pub mod verify;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/nonce", get(nonce::get_nonce))
        .route(
            "/contacts",
            get(contacts::list_contacts).post(contacts::add_contact),
        )
        .route("/contacts/{address}", get(contacts::check_contact))
        .route(
            "/messages",
            get(messages::list_messages).post(messages::send_message),
        )
        .route("/messages/unread", get(messages::unread_count))
        .route("/messages/{message_id}/read", post(messages::mark_as_read))
        .route("/verify-contact", post(verify::verify_contact))
        .route(
            "/chain/messages",
            get(chain::my_messages).post(chain::prepare_send),
        )
        .route("/chain/conversation", get(chain::conversation))
        .route("/chain/unread", get(chain::unread_count))
        .route(
            "/chain/messages/{index}/read",
            post(chain::prepare_mark_as_read),
        );

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        health::readiness,
        nonce::get_nonce,
        contacts::list_contacts,
        contacts::add_contact,
        contacts::check_contact,
        messages::list_messages,
        messages::send_message,
        messages::unread_count,
        messages::mark_as_read,
        verify::verify_contact,
        chain::my_messages,
        chain::conversation,
        chain::unread_count,
        chain::prepare_send,
        chain::prepare_mark_as_read
    ),
    components(
        schemas(
            WalletAddress,
            Backend,
            Contact,
            AddContactRequest,
            ContactResponse,
            ContactListResponse,
            ContactCheckResponse,
            Message,
            SendMessageRequest,
            MessageResponse,
            MessageListResponse,
            UnreadCountResponse,
            IssuedNonce,
            verify::VerifyContactRequest,
            verify::VerifyContactResponse,
            ChainMessage,
            PreparedTransaction,
            chain::ChainMessageListResponse,
            chain::ChainUnreadResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Auth", description = "Sign-in challenge nonces"),
        (name = "Contacts", description = "Per-user contact directory"),
        (name = "Messages", description = "Conversations between wallet addresses"),
        (name = "Chain", description = "Contract-backed messaging")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionClaims;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::Value;
    use tower::ServiceExt;

    fn session_for(wallet: &str) -> String {
        let claims = SessionClaims {
            sub: wallet.to_string(),
            wallet_address: Some(wallet.to_string()),
            iat: chrono::Utc::now().timestamp(),
            exp: chrono::Utc::now().timestamp() + 3600,
            iss: None,
            sid: None,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"dev"),
        )
        .unwrap();
        format!("Bearer {token}")
    }

    async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value, Response<()>) {
        let response = app.oneshot(request).await.unwrap();
        let (parts, body) = response.into_parts();
        let bytes = to_bytes(body, usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (parts.status, json, Response::from_parts(parts, ()))
    }

    fn post_json(uri: &str, auth: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_with(uri: &str, auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let app = router(AppState::default());
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn unauthenticated_requests_get_401() {
        let app = router(AppState::default());

        let (status, body, _) = call(app.clone(), get_with("/api/contacts", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized");

        let (status, _, _) = call(
            app,
            post_json("/api/messages", None, r#"{"toAddress":"0xAB","content":"hi"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn messages_without_contact_is_400() {
        let app = router(AppState::default());
        let auth = session_for("0x01");

        let (status, body, _) = call(app, get_with("/api/messages", Some(&auth))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Contact address required");
    }

    #[tokio::test]
    async fn add_contact_missing_username_is_400_and_not_persisted() {
        let state = AppState::default();
        let app = router(state.clone());
        let auth = session_for("0x01");

        let (status, body, _) = call(
            app.clone(),
            post_json("/api/contacts", Some(&auth), r#"{"address":"0xAB"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields");

        let (status, body, _) = call(app, get_with("/api/contacts", Some(&auth))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["contacts"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn malformed_json_is_400() {
        let app = router(AppState::default());
        let auth = session_for("0x01");

        let (status, body, _) =
            call(app, post_json("/api/contacts", Some(&auth), "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn contact_and_conversation_flow() {
        let app = router(AppState::default());
        let alice = session_for("0x01");
        let bob = session_for("0xAB");

        let (status, body, _) = call(
            app.clone(),
            post_json(
                "/api/contacts",
                Some(&alice),
                r#"{"address":"0xAB","username":"Bob"}"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["contact"]["address"], "0xAB");
        assert_eq!(body["contact"]["verifiedHuman"], false);
        assert_eq!(body["source"], "local");

        let (_, body, _) = call(app.clone(), get_with("/api/contacts/0xAB", Some(&alice))).await;
        assert_eq!(body["isContact"], true);

        call(
            app.clone(),
            post_json(
                "/api/messages",
                Some(&alice),
                r#"{"toAddress":"0xAB","content":"hi"}"#,
            ),
        )
        .await;
        call(
            app.clone(),
            post_json(
                "/api/messages",
                Some(&bob),
                r#"{"toAddress":"0x01","content":"hello"}"#,
            ),
        )
        .await;

        let (status, body, _) = call(
            app.clone(),
            get_with("/api/messages?contact=0xAB", Some(&alice)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let contents: Vec<&str> = body["messages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["content"].as_str().unwrap())
            .collect();
        assert_eq!(contents, vec!["hi", "hello"]);

        let (_, body, _) = call(app, get_with("/api/messages/unread", Some(&bob))).await;
        assert_eq!(body["count"], 1);
    }

    #[tokio::test]
    async fn chain_routes_are_503_when_disabled() {
        let app = router(AppState::default());
        let auth = session_for("0x01");

        let (status, _, _) = call(app, get_with("/api/chain/unread", Some(&auth))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let app = router(AppState::default());

        let (status, _, response) = call(app, get_with("/health/live", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }
}
