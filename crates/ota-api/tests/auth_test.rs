//! HTTP tests for bearer authentication and capability checks.

mod helpers;

use axum::http::StatusCode;

#[tokio::test]
async fn test_missing_token_unauthorized() {
    let app = helpers::TestApp::new().await;

    for (method, path) in [
        ("GET", "/api/v1/firmwares"),
        ("POST", "/api/v1/firmwares"),
        ("GET", "/api/v1/firmwares/latest?repo=r1"),
    ] {
        let response = app.request(method, path, None, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{method} {path}");
        assert_eq!(response.body["error"], "UNAUTHORIZED");
    }
}

#[tokio::test]
async fn test_tampered_token_unauthorized() {
    let app = helpers::TestApp::new().await;
    let token = app.operator_token();
    let (unsigned, signature) = token.rsplit_once('.').unwrap();
    let flipped = if signature.starts_with('A') { "B" } else { "A" };
    let token = format!("{unsigned}.{flipped}{}", &signature[1..]);

    let response = app
        .request("GET", "/api/v1/firmwares", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_foreign_key_token_unauthorized() {
    let app = helpers::TestApp::new().await;
    let foreign = ota_auth::JwtEncoder::new(&ota_core::config::AuthConfig {
        jwt_signing_key: "someone-else".to_string(),
        jwt_issuer: app.config.auth.jwt_issuer.clone(),
    })
    .issue(&ota_auth::TokenSubject::operator("ci"))
    .unwrap();

    let response = app
        .request("GET", "/api/v1/firmwares", None, Some(&foreign))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_board_token_forbidden_for_operator_routes() {
    let app = helpers::TestApp::new().await;
    let board = app.board_token("b1");
    let id = app.create_firmware("r1", &["b1"]).await;

    let response = app
        .request(
            "POST",
            "/api/v1/firmwares",
            Some(serde_json::json!({ "repo_name": "r1", "boards": ["b1"] })),
            Some(&board),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.request("GET", "/api/v1/firmwares", None, Some(&board)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app.upload(&id, b"abc", None, &board).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_operator_token_forbidden_for_latest() {
    let app = helpers::TestApp::new().await;
    let response = app
        .request(
            "GET",
            "/api/v1/firmwares/latest?repo=r1",
            None,
            Some(&app.operator_token()),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "FORBIDDEN");
}
