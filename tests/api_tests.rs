//! HTTP API tests
//!
//! Full request/response round trips through the actix app, backed by a
//! temporary SQLite database.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use snaplink::api::jwt::JwtService;
use snaplink::api::services::not_found;
use snaplink::config::{AppConfig, DatabaseConfig};
use snaplink::runtime::server::AppState;
use snaplink::storage::{Link, LinkStore, SeaOrmStorage};
use tempfile::TempDir;

const SECRET: &str = "api_test_secret_at_least_32_bytes!";

// =============================================================================
// Test Setup
// =============================================================================

struct TestEnv {
    state: AppState,
    storage: Arc<SeaOrmStorage>,
    jwt: JwtService,
    _dir: TempDir,
}

impl TestEnv {
    fn token(&self, user: &str) -> String {
        let token = self
            .jwt
            .generate_access_token(user, Some(30))
            .expect("Failed to sign token");
        format!("Bearer {}", token)
    }
}

async fn create_test_env() -> TestEnv {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("api_test.db");

    let mut config = AppConfig::default();
    config.database = DatabaseConfig {
        database_url: format!("sqlite://{}?mode=rwc", db_path.display()),
        ..Default::default()
    };
    config.auth.jwt_secret = SECRET.to_string();

    let storage = Arc::new(
        SeaOrmStorage::new(&config.database, "sqlite")
            .await
            .expect("Failed to create storage"),
    );
    let state = AppState::new(Arc::new(config), storage.clone());

    TestEnv {
        state,
        storage,
        jwt: JwtService::new(SECRET, 60),
        _dir: temp_dir,
    }
}

macro_rules! init_app {
    ($env:expr) => {{
        let state = $env.state.clone();
        test::init_service(
            App::new()
                .configure(move |cfg| state.configure(cfg))
                .default_service(web::to(not_found)),
        )
        .await
    }};
}

async fn seed_link(storage: &SeaOrmStorage, code: &str, owner: &str, expired: bool) -> Link {
    let link = Link {
        id: uuid::Uuid::new_v4().to_string(),
        short_code: code.to_string(),
        original_url: format!("https://example.com/{}", code),
        owner_id: owner.to_string(),
        created_at: Utc::now(),
        expiration_date: expired.then(|| Utc::now() - Duration::hours(1)),
        click_count: 0,
    };
    storage.insert_link(&link).await.unwrap();
    link
}

// =============================================================================
// Create / list
// =============================================================================

#[actix_rt::test]
async fn test_create_link_returns_201() {
    let env = create_test_env().await;
    let app = init_app!(env);

    let req = test::TestRequest::post()
        .uri("/api/links")
        .insert_header(("Authorization", env.token("user-1")))
        .set_json(json!({
            "originalUrl": "https://www.rust-lang.org/learn",
            "customAlias": "learn",
            "expirationDate": "7d"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["link"]["shortCode"], "learn");
    assert_eq!(body["link"]["originalUrl"], "https://www.rust-lang.org/learn");
    assert_eq!(body["link"]["clicks"], 0);
    assert!(body["link"]["expirationDate"].is_string());
    assert!(body["link"]["id"].is_string());
    assert!(body["link"].get("isExpired").is_none());
}

#[actix_rt::test]
async fn test_create_link_validation_and_conflict() {
    let env = create_test_env().await;
    let app = init_app!(env);

    let req = test::TestRequest::post()
        .uri("/api/links")
        .insert_header(("Authorization", env.token("user-1")))
        .set_json(json!({ "originalUrl": "javascript:alert(1)" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());

    seed_link(&env.storage, "taken", "someone", false).await;
    let req = test::TestRequest::post()
        .uri("/api/links")
        .insert_header(("Authorization", env.token("user-1")))
        .set_json(json!({
            "originalUrl": "https://example.com",
            "customAlias": "taken"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Custom alias already in use");
}

#[actix_rt::test]
async fn test_malformed_json_uses_error_envelope() {
    let env = create_test_env().await;
    let app = init_app!(env);

    let req = test::TestRequest::post()
        .uri("/api/links")
        .insert_header(("Authorization", env.token("user-1")))
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid request body")
    );
}

#[actix_rt::test]
async fn test_list_links_is_owner_scoped() {
    let env = create_test_env().await;
    let app = init_app!(env);

    seed_link(&env.storage, "mine-a", "user-1", false).await;
    seed_link(&env.storage, "mine-b", "user-1", true).await;
    seed_link(&env.storage, "theirs", "user-2", false).await;

    let req = test::TestRequest::get()
        .uri("/api/links?page=1&limit=abc")
        .insert_header(("Authorization", env.token("user-1")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["pagination"]["total"], 2);
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["limit"], 10);
    assert_eq!(body["pagination"]["pages"], 1);

    let links = body["links"].as_array().unwrap();
    assert_eq!(links.len(), 2);
    for link in links {
        assert_ne!(link["shortCode"], "theirs");
        let expected = link["shortCode"] == "mine-b";
        assert_eq!(link["isExpired"], expected);
    }
}

// =============================================================================
// Auth
// =============================================================================

#[actix_rt::test]
async fn test_missing_or_bad_token_is_401() {
    let env = create_test_env().await;
    let app = init_app!(env);

    let req = test::TestRequest::get().uri("/api/links").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "No token, authorization denied");

    let req = test::TestRequest::get()
        .uri("/api/links")
        .insert_header(("Authorization", "Bearer not.a.token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Token is not valid");

    // 别的密钥签出来的 token
    let foreign = JwtService::new("some_other_secret_value_32_bytes", 5)
        .generate_access_token("user-1", None)
        .unwrap();
    let req = test::TestRequest::post()
        .uri("/api/links")
        .insert_header(("Authorization", format!("Bearer {}", foreign)))
        .set_json(json!({ "originalUrl": "https://example.com" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Redirect
// =============================================================================

#[actix_rt::test]
async fn test_redirect_is_public_and_counts() {
    let env = create_test_env().await;
    let app = init_app!(env);
    let link = seed_link(&env.storage, "jump", "user-1", false).await;

    let req = test::TestRequest::get()
        .uri("/api/links/jump")
        .insert_header(("User-Agent", "Mozilla/5.0 (X11; Linux x86_64; rv:127.0) Gecko/20100101 Firefox/127.0"))
        .insert_header(("Referer", "https://lobste.rs/"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get("Location").and_then(|v| v.to_str().ok()),
        Some("https://example.com/jump")
    );
    assert_eq!(
        resp.headers()
            .get("Cache-Control")
            .and_then(|v| v.to_str().ok()),
        Some("no-store")
    );

    let events = env.storage.click_events(&link.id).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].referrer.as_deref(), Some("https://lobste.rs/"));
}

#[actix_rt::test]
async fn test_url_with_control_characters_redirects_cleanly() {
    let env = create_test_env().await;
    let app = init_app!(env);

    let req = test::TestRequest::post()
        .uri("/api/links")
        .insert_header(("Authorization", env.token("user-1")))
        .set_json(json!({
            "originalUrl": "https://example.com/a\nb\r\tc",
            "customAlias": "ctrl"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["link"]["originalUrl"], "https://example.com/abc");

    let req = test::TestRequest::get().uri("/api/links/ctrl").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get("Location").and_then(|v| v.to_str().ok()),
        Some("https://example.com/abc")
    );
}

#[actix_rt::test]
async fn test_redirect_errors() {
    let env = create_test_env().await;
    let app = init_app!(env);
    seed_link(&env.storage, "gone", "user-1", true).await;

    let req = test::TestRequest::get().uri("/api/links/gone").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::GONE);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Link has expired");

    let req = test::TestRequest::get().uri("/api/links/nothing").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "URL not found");
}

// =============================================================================
// Analytics / QR
// =============================================================================

#[actix_rt::test]
async fn test_analytics_shape() {
    let env = create_test_env().await;
    let app = init_app!(env);
    let link = seed_link(&env.storage, "counted", "user-1", false).await;

    for ua in [
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36 Edg/126.0.0.0",
    ] {
        let req = test::TestRequest::get()
            .uri("/api/links/counted")
            .insert_header(("User-Agent", ua))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
    }

    let req = test::TestRequest::get()
        .uri(&format!("/api/links/{}/analytics", link.id))
        .insert_header(("Authorization", env.token("user-1")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["link"]["shortCode"], "counted");
    assert_eq!(body["link"]["isExpired"], false);
    assert_eq!(body["analytics"]["totalClicks"], 2);
    assert_eq!(body["analytics"]["devices"]["desktop"], 2);
    assert_eq!(body["analytics"]["browsers"]["chrome"], 1);
    assert_eq!(body["analytics"]["browsers"]["edge"], 1);
    assert_eq!(body["analytics"]["referrers"]["direct"], 2);

    let today = Utc::now().format("%Y-%m-%d").to_string();
    assert_eq!(body["analytics"]["clicksByDate"][today.as_str()], 2);

    // 其他用户看不到
    let req = test::TestRequest::get()
        .uri(&format!("/api/links/{}/analytics", link.id))
        .insert_header(("Authorization", env.token("user-2")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Link not found");
}

#[actix_rt::test]
async fn test_qr_payload() {
    let env = create_test_env().await;
    let app = init_app!(env);
    seed_link(&env.storage, "scan", "user-1", false).await;

    let req = test::TestRequest::get()
        .uri("/api/links/scan/qr")
        .insert_header(("Authorization", env.token("user-1")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["shortCode"], "scan");
    assert!(
        body["shortUrl"]
            .as_str()
            .unwrap()
            .ends_with("/api/links/scan")
    );

    let req = test::TestRequest::get().uri("/api/links/scan/qr").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/links/missing/qr")
        .insert_header(("Authorization", env.token("user-1")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Health / fallback
// =============================================================================

#[actix_rt::test]
async fn test_health_check() {
    let env = create_test_env().await;
    let app = init_app!(env);

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "ok");
    assert!(body["uptime"].is_u64());
}

#[actix_rt::test]
async fn test_unknown_route_is_json_404() {
    let env = create_test_env().await;
    let app = init_app!(env);

    let req = test::TestRequest::get().uri("/nope").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Route not found");
}
