//! Integration tests for the HTTP mount adapter
//!
//! These tests serve the mounted backend on a random local port and drive it
//! with a real HTTP client.

use std::sync::Arc;

use reqwest::{Client, Method, StatusCode};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use vaultmock_accounts::{mount_router, Backend, EphemeralStorage, MountState, StorageGateway};

struct TestServer {
    base_url: String,
    storage: Arc<EphemeralStorage>,
    client: Client,
    _handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let storage = Arc::new(EphemeralStorage::new());
        let state = Arc::new(MountState::new(
            Backend::new().unwrap(),
            storage.clone(),
            "mock/",
        ));
        let app = mount_router(state);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://127.0.0.1:{port}/v1/mock"),
            storage,
            client: Client::new(),
            _handle: handle,
        }
    }

    fn request(&self, method: Method, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}/{}", self.base_url, path))
            .header("X-Vault-Token", token)
    }
}

#[tokio::test]
async fn test_account_write_read_sign() {
    let server = TestServer::start().await;

    let resp = server
        .request(Method::POST, "account", "tok-A")
        .json(&json!({"accountId": "acct-1"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["data"],
        json!({"accountId": "acct-1", "status": true, "txHash": "0x9876"})
    );

    let stored = server.storage.get("tok-A/acct-1").await.unwrap().unwrap();
    let stored: Value = serde_json::from_slice(&stored.value).unwrap();
    assert_eq!(
        stored,
        json!({"AccountId": "acct-1", "PublicKey": "0x1234", "PrivateKey": "0x9876"})
    );

    let body: Value = server
        .request(Method::GET, "account?accountId=acct-1", "tok-A")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"], json!({"signatureEncode64": "0x9876-0x1234"}));

    let body: Value = server
        .request(Method::GET, "sign?message=hello&accountId=acct-1", "tok-A")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"], json!({"signatureEncode64": "hello-0x9876-0x1234"}));
}

#[tokio::test]
async fn test_missing_entry_is_404_not_failure() {
    let server = TestServer::start().await;

    let resp = server
        .request(Method::GET, "account?accountId=ghost", "tok-A")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["errors"], json!(["No value at mock/ghost"]));
}

#[tokio::test]
async fn test_missing_token_is_forbidden() {
    let server = TestServer::start().await;

    let resp = server
        .client
        .post(format!("{}/account", server.base_url))
        .json(&json!({"accountId": "acct-1"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let body: Value = resp.json().await.unwrap();
    assert!(body["errors"][0].as_str().unwrap().contains("client token empty"));
    assert!(server.storage.is_empty());
}

#[tokio::test]
async fn test_generic_path_and_delete() {
    let server = TestServer::start().await;

    let resp = server
        .request(Method::PUT, "wallets/cold", "tok-A")
        .json(&json!({"accountId": "acct-7"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = server
        .request(Method::GET, "wallets/cold", "tok-B")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = server
        .request(Method::DELETE, "wallets/cold", "tok-A")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(server.storage.is_empty());

    // Deleting again is a no-op
    let resp = server
        .request(Method::DELETE, "wallets/cold", "tok-A")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_write_without_body_rejected() {
    let server = TestServer::start().await;

    let resp = server
        .request(Method::PUT, "slot", "tok-A")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = server
        .request(Method::PUT, "slot", "tok-A")
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_accounts() {
    let server = TestServer::start().await;

    for id in ["b", "a"] {
        server
            .request(Method::POST, "account", "tok-A")
            .json(&json!({"accountId": id}))
            .send()
            .await
            .unwrap();
    }

    let list = Method::from_bytes(b"LIST").unwrap();
    let body: Value = server
        .request(list, "accounts/", "tok-A")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["keys"], json!(["a", "b"]));

    let body: Value = server
        .request(Method::GET, "accounts?list=true", "tok-B")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["keys"], json!([]));
}

#[tokio::test]
async fn test_request_id_echoed() {
    let server = TestServer::start().await;

    let body: Value = server
        .request(Method::GET, "account", "tok-A")
        .header("X-Request-Id", "req-123")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // accountId is required
    assert_eq!(body["request_id"], "req-123");
    assert!(body["errors"][0].as_str().unwrap().contains("accountId"));
}
