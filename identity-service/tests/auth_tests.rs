mod common;

use common::TestApp;
use common::PASSWORD;
use common::SESSION_COOKIE;
use common::VALID_CODE;
use reqwest::StatusCode;
use serde_json::json;
use serde_json::Value;

#[tokio::test]
async fn test_register_success() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/auth/register")
        .json(&json!({ "email": "a@x.com", "password": "longenoughpwd" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(!body["id"].as_str().unwrap().is_empty());
    assert_eq!(body["kind"], "user");
    assert_eq!(body["email"], "a@x.com");
    assert!(body["username"].as_str().unwrap().starts_with("user"));
    assert!(body["avatar_url"]
        .as_str()
        .unwrap()
        .starts_with("https://www.gravatar.com/avatar/"));
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = TestApp::spawn().await;
    app.register("dup@example.com", PASSWORD).await;

    let response = app
        .post("/auth/register")
        .json(&json!({ "email": "DUP@example.com", "password": PASSWORD }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_short_password() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/auth/register")
        .json(&json!({ "email": "short@example.com", "password": "short" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_invalid_json() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/auth/register")
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_password_login_success() {
    let app = TestApp::spawn().await;
    app.register("login@example.com", PASSWORD).await;

    let response = app.password_login("login@example.com", PASSWORD).await;

    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get("set-cookie")
        .expect("Missing session cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with(&format!("{}=", SESSION_COOKIE)));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["access_token"].is_string());
    assert!(body["refresh_token"].is_string());
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 900);
    assert_eq!(body["user"]["email"], "login@example.com");
}

#[tokio::test]
async fn test_password_login_by_username() {
    let app = TestApp::spawn().await;
    let user = app.register("byname@example.com", PASSWORD).await;
    let username = user["username"].as_str().unwrap();

    let response = app.password_login(username, PASSWORD).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["user"]["id"], user["id"]);
}

#[tokio::test]
async fn test_password_login_failures_are_identical() {
    let app = TestApp::spawn().await;
    let user = app.register("victim@example.com", PASSWORD).await;

    let unknown = app.password_login("nobody_here", PASSWORD).await;
    let wrong = app
        .password_login(user["username"].as_str().unwrap(), "wrong-password")
        .await;

    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let unknown_body: Value = unknown.json().await.unwrap();
    let wrong_body: Value = wrong.json().await.unwrap();
    assert_eq!(unknown_body, wrong_body);
}

#[tokio::test]
async fn test_login_unknown_method() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/auth/login")
        .json(&json!({ "method": "magic-link", "email": "a@x.com" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_auth_methods() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/auth/methods?redirect_url=https%3A%2F%2Fapp.example.com%2Fdone")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse response");
    let providers = body["auth_providers"].as_array().unwrap();
    assert_eq!(providers.len(), 2);
    assert_eq!(providers[0]["name"], "google");
    assert_eq!(providers[1]["name"], "github");

    let first_state = providers[0]["state"].as_str().unwrap();
    let second_state = providers[1]["state"].as_str().unwrap();
    assert_ne!(first_state, second_state);
    assert!(first_state.len() >= 16);
    assert!(second_state.len() >= 16);

    let auth_url = providers[0]["auth_url"].as_str().unwrap();
    assert!(auth_url.contains(&format!("state={}", first_state)));
    assert!(auth_url.contains("client_id=google-client"));
    assert!(auth_url.contains("redirect_url=https%3A%2F%2Fapp.example.com%2Fdone"));
}

#[tokio::test]
async fn test_oauth_login_success() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/auth/login")
        .json(&json!({
            "method": "oauth2",
            "provider": "github",
            "code": VALID_CODE,
            "redirection_url": "https://app.example.com/done"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["provider"], "github");
    assert_eq!(body["token"]["access_token"], "github-client-access-token");
    assert_eq!(body["token"]["expires_in"], 3600);
}

#[tokio::test]
async fn test_oauth_login_unknown_provider() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/auth/login")
        .json(&json!({ "method": "oauth2", "provider": "myspace", "code": VALID_CODE }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["message"], "unknown provider 'myspace'");
}

#[tokio::test]
async fn test_oauth_login_rejected_code() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/auth/login")
        .json(&json!({ "method": "oauth2", "provider": "google", "code": "stale-code" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_returns_usable_access_token() {
    let app = TestApp::spawn().await;
    let login = app.register_and_login("refresh@example.com").await;

    let response = app
        .post("/auth/refresh")
        .json(&json!({ "refresh_token": login["refresh_token"] }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["token_type"], "Bearer");
    let access_token = body["access_token"].as_str().unwrap();

    let me = app
        .get_authenticated("/users/me", access_token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(me.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_second_login_invalidates_first_refresh_token() {
    let app = TestApp::spawn().await;
    let first = app.register_and_login("twice@example.com").await;

    let second = app.password_login("twice@example.com", PASSWORD).await;
    assert_eq!(second.status(), StatusCode::OK);
    let second: Value = second.json().await.unwrap();

    let stale = app
        .post("/auth/refresh")
        .json(&json!({ "refresh_token": first["refresh_token"] }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(stale.status(), StatusCode::UNAUTHORIZED);

    let current = app
        .post("/auth/refresh")
        .json(&json!({ "refresh_token": second["refresh_token"] }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(current.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let app = TestApp::spawn().await;
    let login = app.register_and_login("scope@example.com").await;

    let response = app
        .post("/auth/refresh")
        .json(&json!({ "refresh_token": login["access_token"] }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_revokes_refresh_token() {
    let app = TestApp::spawn().await;
    let login = app.register_and_login("logout@example.com").await;
    let access_token = login["access_token"].as_str().unwrap();

    let response = app
        .post_authenticated("/auth/logout", access_token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let set_cookie = response
        .headers()
        .get("set-cookie")
        .expect("Missing cookie removal")
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with(&format!("{}=", SESSION_COOKIE)));

    let refresh = app
        .post("/auth/refresh")
        .json(&json!({ "refresh_token": login["refresh_token"] }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(refresh.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_requires_authentication() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/auth/logout")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
