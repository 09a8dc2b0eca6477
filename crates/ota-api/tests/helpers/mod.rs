//! Shared test helpers for HTTP tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use bytes::Bytes;
use serde_json::Value;
use tower::ServiceExt;

use ota_auth::{JwtEncoder, TokenSubject};
use ota_core::config::{
    AppConfig, AuthConfig, DatabaseConfig, LoggingConfig, ServerConfig, StorageConfig,
};
use ota_core::traits::BinaryStore;
use ota_database::DatabasePool;
use ota_database::migration::run_migrations;
use ota_storage::LocalBinaryStore;

/// Public URL the test app composes download links from.
pub const PUBLIC_URL: &str = "http://ota.test";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Token issuer sharing the app's signing key
    pub encoder: JwtEncoder,
    /// Application config
    pub config: AppConfig,
    _dir: tempfile::TempDir,
}

impl TestApp {
    /// Create a new test application on a fresh temp directory
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");

        let config = AppConfig {
            server: ServerConfig {
                public_url: format!("{PUBLIC_URL}/"),
                max_upload_size_bytes: 1024,
                ..ServerConfig::default()
            },
            database: DatabaseConfig {
                url: format!("sqlite://{}", dir.path().join("catalog.db").display()),
                ..DatabaseConfig::default()
            },
            storage: StorageConfig {
                root_path: dir.path().join("bins").display().to_string(),
                orphan_grace_seconds: 3600,
            },
            auth: AuthConfig {
                jwt_signing_key: "test-signing-key".to_string(),
                jwt_issuer: "ota-test".to_string(),
            },
            logging: LoggingConfig::default(),
        };

        let db = DatabasePool::connect(&config.database)
            .await
            .expect("Failed to connect to test database");
        run_migrations(db.pool())
            .await
            .expect("Failed to run migrations");

        let store: Arc<dyn BinaryStore> = Arc::new(
            LocalBinaryStore::new(&config.storage.root_path)
                .await
                .expect("Failed to init storage"),
        );

        let state = ota_api::AppState::new(config.clone(), db, store);
        let router = ota_api::build_app(state);

        Self {
            router,
            encoder: JwtEncoder::new(&config.auth),
            config,
            _dir: dir,
        }
    }

    /// Token for an operator
    pub fn operator_token(&self) -> String {
        self.encoder
            .issue(&TokenSubject::operator("ci"))
            .expect("Failed to issue token")
    }

    /// Token for a board
    pub fn board_token(&self, board: &str) -> String {
        self.encoder
            .issue(&TokenSubject::board(board))
            .expect("Failed to issue token")
    }

    /// Make a JSON request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        self.send(req.body(Body::from(body_str)).expect("Failed to build request"))
            .await
    }

    /// Send a request with a literal body
    pub async fn request_raw(
        &self,
        method: &str,
        path: &str,
        body: &'static str,
        token: &str,
    ) -> TestResponse {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {token}"));

        self.send(req.body(Body::from(body)).expect("Failed to build request"))
            .await
    }

    /// Upload a raw payload
    pub async fn upload(
        &self,
        id: &str,
        payload: &'static [u8],
        digest: Option<&str>,
        token: &str,
    ) -> TestResponse {
        let mut req = Request::builder()
            .method("PUT")
            .uri(format!("/api/v1/firmwares/{id}/binary"))
            .header("Content-Type", "application/octet-stream")
            .header("Authorization", format!("Bearer {token}"));

        if let Some(digest) = digest {
            req = req.header("X-Firmware-Digest", digest);
        }

        self.send(req.body(Body::from(payload)).expect("Failed to build request"))
            .await
    }

    /// Create a firmware record and return its id
    pub async fn create_firmware(&self, repo: &str, boards: &[&str]) -> String {
        let response = self
            .request(
                "POST",
                "/api/v1/firmwares",
                Some(serde_json::json!({
                    "repo_name": repo,
                    "commit_id": "deadbeef",
                    "boards": boards,
                    "description": "test build",
                })),
                Some(&self.operator_token()),
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Create failed: {:?}",
            response.body
        );
        response.body["id"]
            .as_str()
            .expect("No id in create response")
            .to_string()
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let raw = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&raw).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
            raw,
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body (`Null` when not JSON)
    pub body: Value,
    /// Raw body bytes
    pub raw: Bytes,
}
