//! 인증 endpoint.
//!
//! 가입, 로그인, Access Token 재발급, 로그아웃을 제공합니다.
//!
//! # 엔드포인트
//!
//! - `POST /api/auth/register` - 가입
//! - `POST /api/auth/login` - 로그인 (토큰 + 쿠키 발급)
//! - `POST /api/auth/refresh` - Refresh 쿠키로 Access Token 재발급
//! - `POST /api/auth/logout` - 인증 쿠키 삭제

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, HeaderName, StatusCode},
    response::{AppendHeaders, IntoResponse},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};
use validator::Validate;

use tableye_core::{normalize_email, CasinoSummary, DealerSummary, NewUser, User};

use super::users::UserResponse;
use crate::auth::{self, read_cookie, PasswordError, REFRESH_TOKEN_COOKIE};
use crate::error::{ApiResult, AuthError, ValidatedJson};
use crate::metrics::{record_auth_event, AuthEvent};
use crate::state::AppState;

type SetCookies<const N: usize> = AppendHeaders<[(HeaderName, String); N]>;

/// 가입 요청.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "passwordConfirm is required"))]
    pub password_confirm: String,
}

/// 로그인 요청.
#[derive(Debug, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// 로그인 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct SignInResponse {
    pub status: String,
    pub access_token: String,
    pub user: UserResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dealer: Option<DealerSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub casino: Option<CasinoSummary>,
}

/// 가입.
///
/// 비밀번호 확인 불일치는 해싱 전에 거부합니다. 이메일은 소문자로
/// 정규화되고 역할은 설정된 기본 역할이 부여됩니다.
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<SignUpRequest>,
) -> ApiResult<impl IntoResponse> {
    if payload.password != payload.password_confirm {
        return Err(AuthError::PasswordMismatch);
    }

    let password_hash = auth::hash_password(payload.password).await?;
    let new_user = NewUser::local(
        payload.name,
        &payload.email,
        password_hash,
        state.default_role.clone(),
    );

    let user = state.store.create_user(new_user).await.map_err(|e| {
        record_auth_event(AuthEvent::SignUp, false);
        AuthError::from(e)
    })?;

    info!(user_id = %user.id, role = %user.role, "User registered");
    record_auth_event(AuthEvent::SignUp, true);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "data": { "user": UserResponse::from(&user) }
        })),
    ))
}

/// 로그인.
///
/// 이메일이 없는 경우와 비밀번호가 틀린 경우 모두 같은 에러를 반환합니다.
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<SignInRequest>,
) -> ApiResult<(SetCookies<3>, Json<SignInResponse>)> {
    let email = normalize_email(&payload.email);
    let user = authenticate(&state, &email, payload.password)
        .await
        .inspect_err(|_| record_auth_event(AuthEvent::SignIn, false))?;

    let access_token = state.tokens.issue_access(user.id, &user.role)?;
    let refresh_token = state.tokens.issue_refresh(user.id)?;

    let profile = match state.store.find_dealer_profile(user.id).await {
        Ok(profile) => profile,
        Err(e) => {
            warn!(user_id = %user.id, error = %e, "Dealer profile lookup failed");
            None
        }
    };
    let (dealer, casino) = match profile {
        Some(p) => (Some(p.dealer), p.casino),
        None => (None, None),
    };

    info!(user_id = %user.id, role = %user.role, "User signed in");
    record_auth_event(AuthEvent::SignIn, true);

    let cookies = AppendHeaders([
        (SET_COOKIE, state.cookies.access_token(&access_token)),
        (SET_COOKIE, state.cookies.refresh_token(&refresh_token)),
        (SET_COOKIE, state.cookies.logged_in()),
    ]);

    Ok((
        cookies,
        Json(SignInResponse {
            status: "success".to_string(),
            access_token,
            user: UserResponse::from(&user),
            dealer,
            casino,
        }),
    ))
}

async fn authenticate(state: &AppState, email: &str, password: String) -> ApiResult<User> {
    let Some(user) = state.store.find_user_by_email(email).await? else {
        auth::verify_dummy_password(password).await;
        warn!(%email, "Sign-in failed: unknown email");
        return Err(AuthError::InvalidCredentials);
    };

    match auth::verify_password(user.password_hash.clone(), password).await {
        Ok(()) => Ok(user),
        Err(PasswordError::Mismatch) => {
            warn!(%email, "Sign-in failed: wrong password");
            Err(AuthError::InvalidCredentials)
        }
        Err(PasswordError::InvalidHashFormat) => {
            error!(user_id = %user.id, "Stored password hash is unreadable");
            Err(AuthError::InvalidCredentials)
        }
        Err(e) => Err(e.into()),
    }
}

/// Access Token 재발급.
///
/// Refresh Token은 쿠키에서만 읽습니다. Refresh Token 자체는 교체하지 않습니다.
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<(SetCookies<2>, Json<serde_json::Value>)> {
    let result = refresh_access_token(&state, &headers).await;
    record_auth_event(AuthEvent::Refresh, result.is_ok());
    let (user, access_token) = result?;

    info!(user_id = %user.id, role = %user.role, "Access token refreshed");

    let cookies = AppendHeaders([
        (SET_COOKIE, state.cookies.access_token(&access_token)),
        (SET_COOKIE, state.cookies.logged_in()),
    ]);

    Ok((
        cookies,
        Json(json!({ "status": "success", "access_token": access_token })),
    ))
}

async fn refresh_access_token(state: &AppState, headers: &HeaderMap) -> ApiResult<(User, String)> {
    let token = read_cookie(headers, REFRESH_TOKEN_COOKIE).ok_or_else(|| {
        AuthError::RefreshDenied("could not refresh access token".to_string())
    })?;

    let claims = state
        .tokens
        .validate_refresh(token)
        .map_err(|e| AuthError::RefreshDenied(e.to_string()))?;
    let user_id = claims
        .subject_id()
        .map_err(|e| AuthError::RefreshDenied(e.to_string()))?;

    let user = state
        .store
        .find_user_by_id(user_id)
        .await?
        .ok_or(AuthError::IdentityGone)?;

    // 새 Access Token에는 현재 역할이 실립니다
    let access_token = state.tokens.issue_access(user.id, &user.role)?;
    Ok((user, access_token))
}

/// 로그아웃.
///
/// 로그인 상태가 아니어도 성공합니다.
pub async fn logout(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let [access, refresh, logged_in] = state.cookies.cleared();
    info!("User signed out");
    record_auth_event(AuthEvent::Logout, true);

    (
        AppendHeaders([
            (SET_COOKIE, access),
            (SET_COOKIE, refresh),
            (SET_COOKIE, logged_in),
        ]),
        Json(json!({ "status": "success" })),
    )
}

/// 인증 라우터 생성.
pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
}
