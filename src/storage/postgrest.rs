// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! PostgREST client for the managed relational store.
//!
//! Talks to the REST surface (`{project_url}/rest/v1/{table}`) of the hosted
//! database. Tables:
//!
//! ```text
//! contacts(user_address, contact_address, username, verified_human, created_at)
//! messages(id, from_address, to_address, content, read, created_at)
//! ```
//!
//! Rows use snake_case and `created_at`; they are converted into the
//! canonical [`Contact`] / [`Message`] records before leaving this module.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{header::CONTENT_RANGE, Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::managed::{ManagedStore, ManagedStoreError, StoreFuture};
use crate::models::{Contact, Message, WalletAddress};

const REST_PATH: &str = "rest/v1/";
const CONTACTS_TABLE: &str = "contacts";
const MESSAGES_TABLE: &str = "messages";
const CONTACT_KEY: &str = "user_address,contact_address";

/// Default timeout applied to every managed store request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct PostgrestClient {
    rest_url: Url,
    api_key: String,
    http: Client,
}

impl PostgrestClient {
    /// Build a client for a project URL such as `https://abc.supabase.co`.
    pub fn new(
        project_url: &str,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ManagedStoreError> {
        let mut base = Url::parse(project_url)
            .map_err(|e| ManagedStoreError::Configuration(format!("invalid project URL: {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let rest_url = base
            .join(REST_PATH)
            .map_err(|e| ManagedStoreError::Configuration(e.to_string()))?;

        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ManagedStoreError::Configuration("API key is empty".into()));
        }

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ManagedStoreError::Configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            rest_url,
            api_key,
            http,
        })
    }

    pub fn table_url(&self, table: &str) -> Result<Url, ManagedStoreError> {
        self.rest_url
            .join(table)
            .map_err(|e| ManagedStoreError::Configuration(e.to_string()))
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Send the request and map any non-2xx answer to
    /// [`ManagedStoreError::Status`].
    async fn send(&self, builder: RequestBuilder) -> Result<Response, ManagedStoreError> {
        let response = self
            .authorize(builder)
            .send()
            .await
            .map_err(|e| ManagedStoreError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ManagedStoreError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<Vec<T>, ManagedStoreError> {
        self.send(builder)
            .await?
            .json::<Vec<T>>()
            .await
            .map_err(|e| ManagedStoreError::InvalidResponse(e.to_string()))
    }

    async fn select_contacts(
        &self,
        owner: &WalletAddress,
        address: Option<&WalletAddress>,
    ) -> Result<Vec<Contact>, ManagedStoreError> {
        let mut query = vec![
            ("select", "*".to_string()),
            ("user_address", eq(owner.as_str())),
            ("order", "created_at.asc".to_string()),
        ];
        if let Some(address) = address {
            query.push(("contact_address", eq(address.as_str())));
            query.push(("limit", "1".to_string()));
        }

        let builder = self.http.get(self.table_url(CONTACTS_TABLE)?).query(&query);
        let rows: Vec<ContactRow> = self.fetch_rows(builder).await?;
        Ok(rows.into_iter().map(Contact::from).collect())
    }

    async fn insert_contact_row(
        &self,
        owner: &WalletAddress,
        contact: &Contact,
    ) -> Result<Contact, ManagedStoreError> {
        let row = NewContactRow {
            user_address: owner.as_str(),
            contact_address: contact.address.as_str(),
            username: &contact.username,
            verified_human: contact.verified_human,
            created_at: contact.added_at,
        };
        // On a unique-key conflict nothing is written and no row comes back.
        let builder = self
            .http
            .post(self.table_url(CONTACTS_TABLE)?)
            .query(&[("on_conflict", CONTACT_KEY)])
            .header("Prefer", "resolution=ignore-duplicates,return=representation")
            .json(&row);

        let rows: Vec<ContactRow> = self.fetch_rows(builder).await?;
        if let Some(row) = rows.into_iter().next() {
            return Ok(Contact::from(row));
        }

        self.select_contacts(owner, Some(&contact.address))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ManagedStoreError::InvalidResponse("insert returned no rows".into()))
    }

    async fn select_conversation(
        &self,
        a: &WalletAddress,
        b: &WalletAddress,
    ) -> Result<Vec<Message>, ManagedStoreError> {
        let query = [
            ("select", "*".to_string()),
            ("or", conversation_filter(a, b)),
            ("order", "created_at.asc".to_string()),
        ];
        let builder = self.http.get(self.table_url(MESSAGES_TABLE)?).query(&query);
        let rows: Vec<MessageRow> = self.fetch_rows(builder).await?;

        let mut messages: Vec<Message> = rows.into_iter().map(Message::from).collect();
        messages.sort_by_key(|message| message.timestamp);
        Ok(messages)
    }

    async fn insert_message_row(
        &self,
        from: &WalletAddress,
        to: &WalletAddress,
        content: &str,
    ) -> Result<Message, ManagedStoreError> {
        let row = NewMessageRow {
            from_address: from.as_str(),
            to_address: to.as_str(),
            content,
            read: false,
        };
        let builder = self
            .http
            .post(self.table_url(MESSAGES_TABLE)?)
            .header("Prefer", "return=representation")
            .json(&row);

        let rows: Vec<MessageRow> = self.fetch_rows(builder).await?;
        rows.into_iter()
            .next()
            .map(Message::from)
            .ok_or_else(|| ManagedStoreError::InvalidResponse("insert returned no rows".into()))
    }

    async fn update_read(&self, message_id: &str) -> Result<Option<Message>, ManagedStoreError> {
        let builder = self
            .http
            .patch(self.table_url(MESSAGES_TABLE)?)
            .query(&[("id", eq(message_id))])
            .header("Prefer", "return=representation")
            .json(&serde_json::json!({ "read": true }));

        let rows: Vec<MessageRow> = self.fetch_rows(builder).await?;
        Ok(rows.into_iter().next().map(Message::from))
    }

    async fn count_unread(&self, user: &WalletAddress) -> Result<u64, ManagedStoreError> {
        let query = [
            ("select", "id".to_string()),
            ("to_address", eq(user.as_str())),
            ("read", "is.false".to_string()),
            ("limit", "0".to_string()),
        ];
        let builder = self
            .http
            .get(self.table_url(MESSAGES_TABLE)?)
            .query(&query)
            .header("Prefer", "count=exact");

        let response = self.send(builder).await?;
        let range = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ManagedStoreError::InvalidResponse("missing Content-Range".into()))?;
        total_from_content_range(range)
    }

    async fn probe(&self) -> Result<(), ManagedStoreError> {
        let builder = self
            .http
            .get(self.table_url(CONTACTS_TABLE)?)
            .query(&[("select", "user_address"), ("limit", "1")]);
        let rows: Vec<Value> = self.fetch_rows(builder).await?;
        debug!(rows = rows.len(), "Managed store probe succeeded");
        Ok(())
    }
}

impl ManagedStore for PostgrestClient {
    fn name(&self) -> &'static str {
        "postgrest"
    }

    fn list_contacts<'a>(&'a self, owner: &'a WalletAddress) -> StoreFuture<'a, Vec<Contact>> {
        Box::pin(self.select_contacts(owner, None))
    }

    fn find_contact<'a>(
        &'a self,
        owner: &'a WalletAddress,
        address: &'a WalletAddress,
    ) -> StoreFuture<'a, Option<Contact>> {
        Box::pin(async move {
            let found = self.select_contacts(owner, Some(address)).await?;
            Ok::<_, ManagedStoreError>(found.into_iter().next())
        })
    }

    fn insert_contact<'a>(
        &'a self,
        owner: &'a WalletAddress,
        contact: &'a Contact,
    ) -> StoreFuture<'a, Contact> {
        Box::pin(self.insert_contact_row(owner, contact))
    }

    fn list_conversation<'a>(
        &'a self,
        a: &'a WalletAddress,
        b: &'a WalletAddress,
    ) -> StoreFuture<'a, Vec<Message>> {
        Box::pin(self.select_conversation(a, b))
    }

    fn insert_message<'a>(
        &'a self,
        from: &'a WalletAddress,
        to: &'a WalletAddress,
        content: &'a str,
    ) -> StoreFuture<'a, Message> {
        Box::pin(self.insert_message_row(from, to, content))
    }

    fn mark_as_read<'a>(&'a self, message_id: &'a str) -> StoreFuture<'a, Option<Message>> {
        Box::pin(self.update_read(message_id))
    }

    fn unread_count<'a>(&'a self, user: &'a WalletAddress) -> StoreFuture<'a, u64> {
        Box::pin(self.count_unread(user))
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(self.probe())
    }
}

// =============================================================================
// Row shapes
// =============================================================================

#[derive(Debug, Deserialize)]
struct ContactRow {
    contact_address: String,
    username: String,
    #[serde(default)]
    verified_human: bool,
    created_at: DateTime<Utc>,
}

impl From<ContactRow> for Contact {
    fn from(row: ContactRow) -> Self {
        Contact {
            address: WalletAddress(row.contact_address),
            username: row.username,
            verified_human: row.verified_human,
            added_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct NewContactRow<'a> {
    user_address: &'a str,
    contact_address: &'a str,
    username: &'a str,
    verified_human: bool,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct MessageRow {
    #[serde(deserialize_with = "string_or_number")]
    id: String,
    from_address: String,
    to_address: String,
    content: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    read: bool,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Message {
            id: row.id,
            from_address: WalletAddress(row.from_address),
            to_address: WalletAddress(row.to_address),
            content: row.content,
            timestamp: row.created_at,
            read: row.read,
        }
    }
}

#[derive(Debug, Serialize)]
struct NewMessageRow<'a> {
    from_address: &'a str,
    to_address: &'a str,
    content: &'a str,
    read: bool,
}

/// Row ids may be UUID strings or bigint identity columns.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

// =============================================================================
// Filter helpers
// =============================================================================

fn eq(value: &str) -> String {
    format!("eq.{value}")
}

/// Quote a value for use inside a PostgREST logical expression, where
/// commas, dots and parentheses are reserved.
fn quote_filter_value(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Total row count from a `Content-Range` value such as `0-24/312` or `*/0`.
fn total_from_content_range(range: &str) -> Result<u64, ManagedStoreError> {
    range
        .rsplit_once('/')
        .and_then(|(_, total)| total.parse().ok())
        .ok_or_else(|| ManagedStoreError::InvalidResponse(format!("bad Content-Range: {range}")))
}

/// `or` filter selecting messages between `a` and `b` in either direction.
fn conversation_filter(a: &WalletAddress, b: &WalletAddress) -> String {
    let a = quote_filter_value(a.as_str());
    let b = quote_filter_value(b.as_str());
    format!(
        "(and(from_address.eq.{a},to_address.eq.{b}),and(from_address.eq.{b},to_address.eq.{a}))"
    )
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        body::to_bytes,
        extract::{Request, State},
        http::{header::CONTENT_TYPE, HeaderMap, HeaderValue, Method, StatusCode},
        response::IntoResponse,
        Router,
    };
    use url::form_urlencoded;

    use super::*;
    use crate::models::Backend;
    use crate::storage::Persistence;

    fn client(url: &str) -> PostgrestClient {
        PostgrestClient::new(url, "anon-key", DEFAULT_TIMEOUT).expect("valid client")
    }

    #[test]
    fn table_url_appends_rest_path() {
        let client = client("https://abc.supabase.co");
        assert_eq!(
            client.table_url("messages").unwrap().as_str(),
            "https://abc.supabase.co/rest/v1/messages"
        );
    }

    #[test]
    fn table_url_keeps_base_path() {
        let client = client("http://localhost:54321/project");
        assert_eq!(
            client.table_url("contacts").unwrap().as_str(),
            "http://localhost:54321/project/rest/v1/contacts"
        );
    }

    #[test]
    fn rejects_invalid_configuration() {
        assert!(matches!(
            PostgrestClient::new("not a url", "key", DEFAULT_TIMEOUT),
            Err(ManagedStoreError::Configuration(_))
        ));
        assert!(matches!(
            PostgrestClient::new("https://abc.supabase.co", "  ", DEFAULT_TIMEOUT),
            Err(ManagedStoreError::Configuration(_))
        ));
    }

    #[test]
    fn conversation_filter_quotes_both_directions() {
        let filter = conversation_filter(&"0x01".into(), &"0xAB".into());
        assert_eq!(
            filter,
            r#"(and(from_address.eq."0x01",to_address.eq."0xAB"),and(from_address.eq."0xAB",to_address.eq."0x01"))"#
        );
    }

    #[test]
    fn quote_filter_value_escapes_reserved_characters() {
        assert_eq!(quote_filter_value(r#"a"b\c"#), r#""a\"b\\c""#);
        assert_eq!(quote_filter_value("x),or(y"), r#""x),or(y""#);
    }

    #[test]
    fn message_row_normalizes_into_message() {
        let row: MessageRow = serde_json::from_value(serde_json::json!({
            "id": 42,
            "from_address": "0x01",
            "to_address": "0xAB",
            "content": "hi",
            "created_at": "2026-01-02T03:04:05.123456+00:00",
            "read": true
        }))
        .unwrap();

        let message = Message::from(row);
        assert_eq!(message.id, "42");
        assert_eq!(message.from_address, WalletAddress::from("0x01"));
        assert_eq!(message.to_address, WalletAddress::from("0xAB"));
        assert!(message.read);
        assert_eq!(message.timestamp.timestamp(), 1_767_323_045);
    }

    #[test]
    fn contact_row_defaults_verification_flag() {
        let row: ContactRow = serde_json::from_value(serde_json::json!({
            "id": "c1",
            "user_address": "0x01",
            "contact_address": "0xAB",
            "username": "Bob",
            "created_at": "2026-01-02T03:04:05Z"
        }))
        .unwrap();

        let contact = Contact::from(row);
        assert_eq!(contact.address, WalletAddress::from("0xAB"));
        assert_eq!(contact.username, "Bob");
        assert!(!contact.verified_human);
    }

    #[test]
    fn message_row_rejects_object_id() {
        let result: Result<MessageRow, _> = serde_json::from_value(serde_json::json!({
            "id": {"nested": true},
            "from_address": "0x01",
            "to_address": "0xAB",
            "content": "hi",
            "created_at": "2026-01-02T03:04:05Z"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn content_range_total_is_parsed() {
        assert_eq!(total_from_content_range("*/3").unwrap(), 3);
        assert_eq!(total_from_content_range("0-24/312").unwrap(), 312);
        assert!(matches!(
            total_from_content_range("0-24/*"),
            Err(ManagedStoreError::InvalidResponse(_))
        ));
    }

    // -------------------------------------------------------------------------
    // HTTP behaviour against an in-process REST server
    // -------------------------------------------------------------------------

    struct Received {
        method: Method,
        path: String,
        query: Vec<(String, String)>,
        headers: HeaderMap,
        body: String,
    }

    impl Received {
        fn header(&self, name: &str) -> &str {
            self.headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
        }

        fn param(&self, name: &str) -> Option<&str> {
            self.query
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        }

        fn json(&self) -> Value {
            serde_json::from_str(&self.body).unwrap()
        }
    }

    /// Answers the n-th request with the n-th canned response, repeating the
    /// last one once they run out.
    #[derive(Clone)]
    struct CannedRest {
        responses: Arc<Vec<(StatusCode, &'static str)>>,
        content_range: Option<&'static str>,
        received: Arc<Mutex<Vec<Received>>>,
    }

    impl CannedRest {
        fn new(responses: Vec<(StatusCode, &'static str)>) -> Self {
            Self {
                responses: Arc::new(responses),
                content_range: None,
                received: Arc::default(),
            }
        }

        fn with_content_range(mut self, range: &'static str) -> Self {
            self.content_range = Some(range);
            self
        }

        fn received(&self) -> std::sync::MutexGuard<'_, Vec<Received>> {
            self.received.lock().unwrap()
        }

        async fn serve(&self) -> PostgrestClient {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let app = Router::new().fallback(answer).with_state(self.clone());
            tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
            client(&format!("http://{addr}"))
        }
    }

    async fn answer(State(rest): State<CannedRest>, request: Request) -> impl IntoResponse {
        let (parts, body) = request.into_parts();
        let body = to_bytes(body, usize::MAX).await.unwrap_or_default();

        let index = {
            let mut received = rest.received.lock().unwrap();
            received.push(Received {
                method: parts.method,
                path: parts.uri.path().to_string(),
                query: parts
                    .uri
                    .query()
                    .map(|query| form_urlencoded::parse(query.as_bytes()).into_owned().collect())
                    .unwrap_or_default(),
                headers: parts.headers,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
            received.len() - 1
        };

        let (status, body) = rest.responses[index.min(rest.responses.len() - 1)];
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(range) = rest.content_range {
            headers.insert(CONTENT_RANGE, HeaderValue::from_static(range));
        }
        (status, headers, body)
    }

    const MESSAGE_ROW: &str = r#"[{"id":"m-1","from_address":"0x01","to_address":"0xAB","content":"hi","created_at":"2026-01-02T03:04:05Z","read":false}]"#;
    const CONTACT_ROW: &str = r#"[{"user_address":"0x01","contact_address":"0xAB","username":"Bob","verified_human":false,"created_at":"2026-01-02T03:04:05Z"}]"#;

    fn bob() -> Contact {
        Contact {
            address: WalletAddress::from("0xAB"),
            username: "Bob".into(),
            verified_human: false,
            added_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn error_status_becomes_status_error() {
        let rest = CannedRest::new(vec![(StatusCode::INTERNAL_SERVER_ERROR, "boom")]);
        let client = rest.serve().await;

        let result = client.list_contacts(&WalletAddress::from("0x01")).await;
        match result {
            Err(ManagedStoreError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected status error, got {other:?}"),
        }

        let received = rest.received();
        assert_eq!(received[0].method, Method::GET);
        assert_eq!(received[0].path, "/rest/v1/contacts");
        assert_eq!(received[0].param("user_address"), Some("eq.0x01"));
        assert_eq!(received[0].header("apikey"), "anon-key");
        assert_eq!(received[0].header("authorization"), "Bearer anon-key");
    }

    #[tokio::test]
    async fn insert_message_asks_for_representation() {
        let rest = CannedRest::new(vec![(StatusCode::CREATED, MESSAGE_ROW)]);
        let client = rest.serve().await;

        let message = client
            .insert_message(&"0x01".into(), &"0xAB".into(), "hi")
            .await
            .unwrap();
        assert_eq!(message.id, "m-1");
        assert!(!message.read);

        let received = rest.received();
        assert_eq!(received[0].method, Method::POST);
        assert_eq!(received[0].path, "/rest/v1/messages");
        assert_eq!(received[0].header("prefer"), "return=representation");
        assert_eq!(
            received[0].json(),
            serde_json::json!({
                "from_address": "0x01",
                "to_address": "0xAB",
                "content": "hi",
                "read": false
            })
        );
    }

    #[tokio::test]
    async fn insert_contact_ignores_duplicates_on_owner_and_address() {
        let rest = CannedRest::new(vec![(StatusCode::CREATED, CONTACT_ROW)]);
        let client = rest.serve().await;

        let stored = client.insert_contact(&"0x01".into(), &bob()).await.unwrap();
        assert_eq!(stored.address, WalletAddress::from("0xAB"));

        let received = rest.received();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].method, Method::POST);
        assert_eq!(
            received[0].param("on_conflict"),
            Some("user_address,contact_address")
        );
        assert_eq!(
            received[0].header("prefer"),
            "resolution=ignore-duplicates,return=representation"
        );
        assert_eq!(received[0].json()["user_address"], "0x01");
    }

    #[tokio::test]
    async fn conflicting_contact_insert_returns_stored_row() {
        let rest = CannedRest::new(vec![
            (StatusCode::CREATED, "[]"),
            (StatusCode::OK, CONTACT_ROW),
        ]);
        let client = rest.serve().await;

        let mut renamed = bob();
        renamed.username = "Robert".into();
        let stored = client.insert_contact(&"0x01".into(), &renamed).await.unwrap();
        assert_eq!(stored.username, "Bob");

        let received = rest.received();
        assert_eq!(received.len(), 2);
        assert_eq!(received[1].method, Method::GET);
        assert_eq!(received[1].param("contact_address"), Some("eq.0xAB"));
        assert_eq!(received[1].param("limit"), Some("1"));
    }

    #[tokio::test]
    async fn mark_as_read_patches_by_id() {
        let rest = CannedRest::new(vec![(StatusCode::OK, "[]")]);
        let client = rest.serve().await;

        assert!(client.mark_as_read("m-404").await.unwrap().is_none());

        let received = rest.received();
        assert_eq!(received[0].method, Method::PATCH);
        assert_eq!(received[0].path, "/rest/v1/messages");
        assert_eq!(received[0].param("id"), Some("eq.m-404"));
        assert_eq!(received[0].header("prefer"), "return=representation");
        assert_eq!(received[0].json(), serde_json::json!({ "read": true }));
    }

    #[tokio::test]
    async fn unread_count_reads_exact_total() {
        let rest = CannedRest::new(vec![(StatusCode::OK, "[]")]).with_content_range("*/3");
        let client = rest.serve().await;

        assert_eq!(client.unread_count(&"0xAB".into()).await.unwrap(), 3);

        let received = rest.received();
        assert_eq!(received[0].param("to_address"), Some("eq.0xAB"));
        assert_eq!(received[0].param("read"), Some("is.false"));
        assert_eq!(received[0].param("limit"), Some("0"));
        assert_eq!(received[0].header("prefer"), "count=exact");
    }

    #[tokio::test]
    async fn unread_count_without_content_range_is_invalid() {
        let rest = CannedRest::new(vec![(StatusCode::OK, "[]")]);
        let client = rest.serve().await;

        assert!(matches!(
            client.unread_count(&"0xAB".into()).await,
            Err(ManagedStoreError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn conversation_filter_survives_query_encoding() {
        let rest = CannedRest::new(vec![(
            StatusCode::OK,
            r#"[{"id":2,"from_address":"0xAB","to_address":"0x01","content":"later","created_at":"2026-01-02T03:04:06Z"},{"id":1,"from_address":"0x01","to_address":"0xAB","content":"first","created_at":"2026-01-02T03:04:05Z"}]"#,
        )]);
        let client = rest.serve().await;
        let (a, b) = (WalletAddress::from("0x01"), WalletAddress::from("0xAB"));

        let messages = client.list_conversation(&a, &b).await.unwrap();
        let ids: Vec<_> = messages.iter().map(|message| message.id.as_str()).collect();
        assert_eq!(ids, ["1", "2"]);

        let received = rest.received();
        let expected = conversation_filter(&a, &b);
        assert_eq!(received[0].param("or"), Some(expected.as_str()));
        assert_eq!(received[0].param("order"), Some("created_at.asc"));
    }

    #[tokio::test]
    async fn persistence_falls_back_when_rest_fails() {
        let rest = CannedRest::new(vec![(StatusCode::SERVICE_UNAVAILABLE, "down")]);
        let persistence = Persistence::default().with_managed(Arc::new(rest.serve().await));

        let sent = persistence
            .send_message(&"0x01".into(), &"0xAB".into(), "hi")
            .await
            .unwrap();
        assert_eq!(sent.backend, Backend::Local);
        assert_eq!(persistence.local().await.message_count(), 1);
        assert_eq!(rest.received().len(), 1);
    }
}
