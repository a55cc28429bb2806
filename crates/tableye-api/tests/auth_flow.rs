//! 인증 흐름 통합 테스트.
//!
//! 가입 → 로그인 → 권한 거부 → 관리자 승격 → 재발급까지 공개 API만으로 검증합니다.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use tableye_api::{create_api_router, AppState, CookieSettings, PemKeys, TokenCodec};
use tableye_core::{InMemoryUserStore, Role, UserStore};

fn build_app() -> (Router, Arc<AppState>, Arc<InMemoryUserStore>) {
    let tokens = TokenCodec::from_pem(
        PemKeys {
            access_private: include_bytes!("fixtures/access_private.pem"),
            access_public: include_bytes!("fixtures/access_public.pem"),
            refresh_private: include_bytes!("fixtures/refresh_private.pem"),
            refresh_public: include_bytes!("fixtures/refresh_public.pem"),
        },
        chrono::Duration::minutes(15),
        chrono::Duration::minutes(60),
    )
    .unwrap();

    let cookies = CookieSettings {
        domain: "localhost".to_string(),
        secure: false,
        access_max_age: 15 * 60,
        refresh_max_age: 60 * 60,
    };

    let store = Arc::new(InMemoryUserStore::new());
    let state = Arc::new(AppState::new(
        store.clone(),
        tokens,
        cookies,
        Role::from_stored(Role::USER),
        Role::defaults(),
    ));

    (create_api_router(state.clone()), state, store)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn bearer(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Set-Cookie 헤더에서 `name=value` 쌍을 찾습니다.
fn cookie_pair(response: &Response, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&prefix))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

async fn sign_up(app: &Router, name: &str, email: &str, password: &str) -> Response {
    app.clone()
        .oneshot(post_json(
            "/api/auth/register",
            json!({
                "name": name,
                "email": email,
                "password": password,
                "passwordConfirm": password,
            }),
        ))
        .await
        .unwrap()
}

async fn sign_in(app: &Router, email: &str, password: &str) -> Response {
    app.clone()
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "email": email, "password": password }),
        ))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_full_role_lifecycle() {
    let (app, state, store) = build_app();

    // 가입: 기본 역할 부여
    let response = sign_up(&app, "Floor Staff", "Staff@Casino.com", "password123").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["data"]["user"]["role"], "user");
    assert_eq!(body["data"]["user"]["email"], "staff@casino.com");
    let staff_id: Uuid = body["data"]["user"]["id"].as_str().unwrap().parse().unwrap();

    // 로그인: 토큰과 쿠키 발급
    let response = sign_in(&app, "staff@casino.com", "password123").await;
    assert_eq!(response.status(), StatusCode::OK);
    let refresh_cookie = cookie_pair(&response, "refresh_token").unwrap();
    assert!(cookie_pair(&response, "access_token").is_some());
    assert_eq!(cookie_pair(&response, "logged_in").as_deref(), Some("logged_in=true"));
    let body = body_json(response).await;
    let staff_token = body["access_token"].as_str().unwrap().to_string();

    // 관리자 라우트 거부
    let response = app
        .clone()
        .oneshot(bearer(
            "POST",
            "/api/admin/assign-admin",
            &staff_token,
            Some(json!({ "userId": staff_id })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // 관리자 시드 후 승격
    let response = sign_up(&app, "Pit Boss", "boss@casino.com", "password123").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let boss = store.find_user_by_email("boss@casino.com").await.unwrap().unwrap();
    store.update_user_role(boss.id, &Role::admin()).await.unwrap();

    let response = sign_in(&app, "boss@casino.com", "password123").await;
    let boss_token = body_json(response).await["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .clone()
        .oneshot(bearer(
            "POST",
            "/api/admin/assign-admin",
            &boss_token,
            Some(json!({ "userId": staff_id })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "User role updated to admin");

    // 기존 Access Token으로도 즉시 새 역할이 적용됨
    let response = app
        .clone()
        .oneshot(bearer("GET", "/api/users/me", &staff_token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["user"]["role"], "admin");

    // 재발급된 Access Token에도 새 역할이 실림
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/refresh")
                .header(header::COOKIE, refresh_cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let refreshed = body["access_token"].as_str().unwrap();
    let claims = state.tokens.validate_access(refreshed).unwrap();
    assert_eq!(claims.role(), Some("admin"));
    assert_eq!(claims.sub, staff_id.to_string());
}

#[tokio::test]
async fn test_sign_in_failures_do_not_reveal_account_existence() {
    let (app, _, _) = build_app();
    let response = sign_up(&app, "Dealer", "dealer@casino.com", "password123").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let wrong_password = sign_in(&app, "dealer@casino.com", "not-the-password").await;
    let unknown_email = sign_in(&app, "nobody@casino.com", "password123").await;

    assert_eq!(wrong_password.status(), StatusCode::BAD_REQUEST);
    assert_eq!(unknown_email.status(), StatusCode::BAD_REQUEST);
    assert!(wrong_password.headers().get(header::SET_COOKIE).is_none());
    assert!(unknown_email.headers().get(header::SET_COOKIE).is_none());

    let a = body_json(wrong_password).await;
    let b = body_json(unknown_email).await;
    assert_eq!(a, b);
    assert_eq!(a["message"], "Invalid email or Password");
}

#[tokio::test]
async fn test_deleted_user_token_is_rejected() {
    let (app, _, store) = build_app();
    sign_up(&app, "Temp", "temp@casino.com", "password123").await;
    let response = sign_in(&app, "temp@casino.com", "password123").await;
    let token = body_json(response).await["access_token"]
        .as_str()
        .unwrap()
        .to_string();

    let user = store.find_user_by_email("temp@casino.com").await.unwrap().unwrap();
    assert!(store.remove_user(user.id).await);

    let response = app
        .oneshot(bearer("GET", "/api/users/me", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        body_json(response).await["message"],
        "The user belonging to this token no longer exists"
    );
}
