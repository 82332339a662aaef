use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use watered_backend::{
    auth::{AuthConfig, AuthMode, IdentityProvider, ProviderIdentity},
    build_router,
    services::StaticAllowlist,
    storage::{MemoryStorage, Storage},
    AppState,
};

struct FakeProvider;

#[async_trait]
impl IdentityProvider for FakeProvider {
    fn authorization_url(&self, state: &str) -> String {
        format!("https://provider.test/auth?state={}", state)
    }

    async fn exchange_code(&self, code: &str) -> anyhow::Result<ProviderIdentity> {
        let email = match code {
            "member" => "user1@example.com",
            "stranger" => "stranger@example.com",
            _ => anyhow::bail!("unknown code"),
        };
        Ok(ProviderIdentity {
            email: email.to_string(),
            name: "Provider User".to_string(),
            picture: None,
        })
    }
}

fn app(mode: AuthMode) -> Router {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let seed = StaticAllowlist::from_lists_or_demo(Vec::new(), Vec::new());
    let provider: Arc<dyn IdentityProvider> = Arc::new(FakeProvider);
    let state = AppState::new(
        storage,
        seed,
        AuthConfig::new(mode, "integration-test-secret", false),
        Some(provider),
        "no-frontend-here",
    );
    build_router(state, None)
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn with_json(method: &str, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn empty(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// `name=value` pairs of every cookie set on the response.
fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .map(str::to_string)
        .collect()
}

fn cookie_named(response: &Response, name: &str) -> Option<String> {
    set_cookies(response)
        .into_iter()
        .find(|c| c.starts_with(&format!("{}=", name)))
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

async fn demo_login(app: &Router, email: &str) -> String {
    let response = send(app, get(&format!("/auth/demo-login?email={}", email), None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    cookie_named(&response, "watered_session").expect("session cookie")
}

#[tokio::test]
async fn health_is_static() {
    let app = app(AuthMode::Demo);
    let response = send(&app, get("/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"status": "ok", "service": "watered"})
    );
}

#[tokio::test]
async fn api_status_reports_uptime() {
    let app = app(AuthMode::Demo);
    let response = send(&app, get("/api/status", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["uptime_formatted"], "1 minute");
}

#[tokio::test]
async fn new_plant_is_critical_until_watered() {
    let app = app(AuthMode::Demo);

    let status = body_json(send(&app, get("/api/plant/status", None)).await).await;
    assert_eq!(status["status"], "critical");
    assert_eq!(status["is_overdue"], true);
    assert_eq!(status["time_since_watering_formatted"], "Never watered");

    let session = demo_login(&app, "user1@example.com").await;
    let response = send(&app, empty("POST", "/api/plant/water", Some(&session))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let watered = body_json(response).await;
    assert_eq!(watered["success"], true);
    assert_eq!(watered["plant"]["watered_by"], "user1@example.com");

    let status = body_json(send(&app, get("/api/plant/status", None)).await).await;
    assert_eq!(status["status"], "healthy");
    assert_eq!(status["is_overdue"], false);

    let plant = body_json(send(&app, get("/api/plant", None)).await).await;
    assert_eq!(plant["watered_by"], "user1@example.com");
    assert_eq!(plant["health_status"], "healthy");
}

#[tokio::test]
async fn unauthenticated_water_is_rejected() {
    let app = app(AuthMode::Demo);

    let response = send(&app, empty("POST", "/api/plant/water", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let plant = body_json(send(&app, get("/api/plant", None)).await).await;
    assert!(plant["last_watered"].is_null());
    assert_eq!(plant["watered_by"], "");
}

#[tokio::test]
async fn forged_session_is_rejected() {
    let app = app(AuthMode::Demo);
    let response = send(
        &app,
        empty("POST", "/api/plant/water", Some("watered_session=not-a-jwt")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn timeout_update_reaches_plant_and_config() {
    let app = app(AuthMode::Demo);
    let admin = demo_login(&app, "admin@example.com").await;

    let response = send(
        &app,
        with_json(
            "PUT",
            "/admin/config/timeout",
            Some(&admin),
            json!({"timeoutHours": 72}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["timeoutHours"], 72);
    assert_eq!(body["message"], "Timeout updated to 72 hours");

    let timer = body_json(send(&app, get("/api/plant/timer", None)).await).await;
    assert_eq!(timer["timeout_hours"], 72);

    let config = body_json(send(&app, get("/admin/config", Some(&admin))).await).await;
    assert_eq!(config["timeout_hours"], 72);
    assert_eq!(config["modified_by"], "admin@example.com");
}

#[tokio::test]
async fn settings_timeout_change_shows_in_admin_config() {
    let app = app(AuthMode::Demo);
    let admin = demo_login(&app, "admin@example.com").await;

    let response = send(
        &app,
        with_json(
            "PUT",
            "/api/plant/settings",
            Some(&admin),
            json!({"name": "", "timeout_hours": 48}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["plant"]["timeout_hours"], 48);

    let config = body_json(send(&app, get("/admin/config", Some(&admin))).await).await;
    assert_eq!(config["timeout_hours"], 48);

    let stats = body_json(send(&app, get("/admin/stats", Some(&admin))).await).await;
    assert_eq!(stats["timeoutHours"], 48);
}

#[tokio::test]
async fn timeout_outside_admin_range_is_rejected() {
    let app = app(AuthMode::Demo);
    let admin = demo_login(&app, "admin@example.com").await;

    for hours in [0, 169] {
        let response = send(
            &app,
            with_json(
                "PUT",
                "/admin/config/timeout",
                Some(&admin),
                json!({"timeoutHours": hours}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"],
            "Timeout must be between 1 and 168 hours"
        );
    }
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = app(AuthMode::Demo);
    let admin = demo_login(&app, "admin@example.com").await;

    let request = Request::builder()
        .method("PUT")
        .uri("/admin/config/timeout")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, &admin)
        .body(Body::from("{not json"))
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_user_conflicts() {
    let app = app(AuthMode::Demo);
    let admin = demo_login(&app, "admin@example.com").await;

    let add = || with_json("POST", "/admin/users", Some(&admin), json!({"email": "dup@x.com"}));

    let first = send(&app, add()).await;
    assert_eq!(first.status(), StatusCode::CREATED);
    assert_eq!(body_json(first).await["email"], "dup@x.com");

    let second = send(&app, add()).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let users = body_json(send(&app, get("/admin/users", Some(&admin))).await).await;
    let allowed = users["allowedEmails"].as_array().unwrap();
    assert_eq!(allowed.iter().filter(|e| *e == "dup@x.com").count(), 1);
}

#[tokio::test]
async fn invalid_email_is_rejected() {
    let app = app(AuthMode::Demo);
    let admin = demo_login(&app, "admin@example.com").await;

    let response = send(
        &app,
        with_json("POST", "/admin/users", Some(&admin), json!({"email": "nope"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid email format");
}

#[tokio::test]
async fn removing_unknown_user_is_not_found() {
    let app = app(AuthMode::Demo);
    let admin = demo_login(&app, "admin@example.com").await;

    let response = send(&app, empty("DELETE", "/admin/users/ghost@x.com", Some(&admin))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn removed_user_loses_access() {
    let app = app(AuthMode::Demo);
    let admin = demo_login(&app, "admin@example.com").await;
    let member = demo_login(&app, "user2@example.com").await;

    let response = send(
        &app,
        empty("DELETE", "/admin/users?email=user2@example.com", Some(&admin)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, empty("POST", "/api/plant/water", Some(&member))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(&app, get("/auth/demo-login?email=user2@example.com", None)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn non_admin_is_forbidden_from_admin_surface() {
    let app = app(AuthMode::Demo);
    let member = demo_login(&app, "user1@example.com").await;

    for request in [
        get("/admin/config", Some(&member)),
        get("/admin/stats", Some(&member)),
        empty("POST", "/api/plant/reset", Some(&member)),
        with_json(
            "PUT",
            "/api/plant/settings",
            Some(&member),
            json!({"name": "Fern"}),
        ),
    ] {
        let response = send(&app, request).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    let response = send(&app, get("/admin/config", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_updates_settings_and_resets() {
    let app = app(AuthMode::Demo);
    let admin = demo_login(&app, "admin@example.com").await;

    send(&app, empty("POST", "/api/plant/water", Some(&admin))).await;

    let response = send(
        &app,
        with_json(
            "PUT",
            "/api/plant/settings",
            Some(&admin),
            json!({"name": "Fern", "timeout_hours": 0}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["plant"]["name"], "Fern");
    assert_eq!(body["plant"]["timeout_hours"], 24);

    let response = send(
        &app,
        with_json(
            "PUT",
            "/api/plant/settings",
            Some(&admin),
            json!({"timeout_hours": -1}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&app, empty("POST", "/api/plant/reset", Some(&admin))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let plant = body_json(response).await["plant"].clone();
    assert!(plant["last_watered"].is_null());
    assert_eq!(plant["name"], "Fern");
    assert_eq!(plant["health_status"], "critical");

    let stats = body_json(send(&app, get("/admin/stats", Some(&admin))).await).await;
    assert_eq!(stats["plantWatered"], false);
    assert_eq!(stats["systemStatus"], "healthy");
}

#[tokio::test]
async fn auth_status_reflects_session() {
    let app = app(AuthMode::Demo);

    let status = body_json(send(&app, get("/auth/status", None)).await).await;
    assert_eq!(status["authenticated"], false);
    assert_eq!(status["demo_mode"], true);
    assert!(status.get("user").is_none());

    let session = demo_login(&app, "admin@example.com").await;
    let status = body_json(send(&app, get("/auth/status", Some(&session))).await).await;
    assert_eq!(status["authenticated"], true);
    assert_eq!(status["user"]["email"], "admin@example.com");
    assert_eq!(status["user"]["is_admin"], true);
}

#[tokio::test]
async fn demo_login_via_json_body() {
    let app = app(AuthMode::Demo);

    let response = send(
        &app,
        with_json(
            "POST",
            "/auth/demo-login",
            None,
            json!({"email": "demo@example.com", "name": "Demo Person"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let session = cookie_named(&response, "watered_session").unwrap();

    let status = body_json(send(&app, get("/auth/status", Some(&session))).await).await;
    assert_eq!(status["user"]["name"], "Demo Person");
    assert_eq!(status["user"]["is_admin"], false);

    let response = send(&app, with_json("POST", "/auth/demo-login", None, json!({}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn demo_login_disabled_with_provider() {
    let app = app(AuthMode::Provider);
    let response = send(&app, get("/auth/demo-login?email=demo@example.com", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Demo login not available");
}

#[tokio::test]
async fn demo_mode_login_goes_to_login_page() {
    let app = app(AuthMode::Demo);
    let response = send(&app, get("/auth/login", None)).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn provider_login_round_trip() {
    let app = app(AuthMode::Provider);

    let response = send(&app, get("/auth/login", None)).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let url = location(&response).to_string();
    assert!(url.starts_with("https://provider.test/auth?state="));
    let state = url.rsplit('=').next().unwrap().to_string();
    let state_cookie = cookie_named(&response, "watered_oauth_state").unwrap();

    let response = send(
        &app,
        get(
            &format!("/auth/callback?code=member&state={}", state),
            Some(&state_cookie),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert_eq!(
        cookie_named(&response, "watered_oauth_state").as_deref(),
        Some("watered_oauth_state=")
    );
    let session = cookie_named(&response, "watered_session").unwrap();

    let status = body_json(send(&app, get("/auth/status", Some(&session))).await).await;
    assert_eq!(status["user"]["email"], "user1@example.com");
    assert_eq!(status["demo_mode"], false);
}

#[tokio::test]
async fn callback_failures() {
    let app = app(AuthMode::Provider);

    let response = send(&app, get("/auth/login", None)).await;
    let url = location(&response).to_string();
    let state = url.rsplit('=').next().unwrap().to_string();
    let state_cookie = cookie_named(&response, "watered_oauth_state").unwrap();

    let cases = [
        (format!("/auth/callback?state={}", state), StatusCode::BAD_REQUEST),
        (
            "/auth/callback?code=member&state=forged".to_string(),
            StatusCode::BAD_REQUEST,
        ),
        (
            format!("/auth/callback?code=broken&state={}", state),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
        (
            format!("/auth/callback?code=stranger&state={}", state),
            StatusCode::FORBIDDEN,
        ),
    ];

    for (uri, expected) in cases {
        let response = send(&app, get(&uri, Some(&state_cookie))).await;
        assert_eq!(response.status(), expected, "{}", uri);
        assert!(cookie_named(&response, "watered_session").is_none());
    }

    let response = send(
        &app,
        get(&format!("/auth/callback?code=member&state={}", state), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn logout_clears_session() {
    let app = app(AuthMode::Demo);
    let session = demo_login(&app, "demo@example.com").await;

    let response = send(&app, empty("POST", "/auth/logout", Some(&session))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    assert_eq!(
        cookie_named(&response, "watered_session").as_deref(),
        Some("watered_session=")
    );
}

#[tokio::test]
async fn admin_page_redirects_anonymous_users() {
    let app = app(AuthMode::Demo);

    let response = send(&app, get("/admin", None)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let member = demo_login(&app, "user1@example.com").await;
    let response = send(&app, get("/admin", Some(&member))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn login_page_sends_signed_in_users_home() {
    let app = app(AuthMode::Demo);
    let session = demo_login(&app, "demo@example.com").await;

    let response = send(&app, get("/login", Some(&session))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}
