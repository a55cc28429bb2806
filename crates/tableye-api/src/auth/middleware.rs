//! Axum용 인증/인가 미들웨어.
//!
//! - [`deserialize_user`]: 토큰을 검증하고 사용자를 다시 조회하여
//!   [`CurrentUser`]를 요청 extension에 넣습니다.
//! - [`authorize_roles`]: [`CurrentUser`]의 역할을 라우트 허용 목록과 비교합니다.
//!
//! 게이트는 리졸버 뒤에서만 동작합니다. `route_layer`는 나중에 추가한 레이어가
//! 먼저 실행되므로 게이트를 먼저, 리졸버를 나중에 추가해야 합니다.
//!
//! ```rust,ignore
//! Router::new()
//!     .route("/assign-role", post(assign_role))
//!     .route_layer(from_fn_with_state(AllowedRoles::ADMIN, authorize_roles))
//!     .route_layer(from_fn_with_state(state.clone(), deserialize_user))
//! ```

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use tableye_core::{Role, User};

use super::cookies::{read_cookie, ACCESS_TOKEN_COOKIE};
use crate::error::AuthError;
use crate::metrics::{record_auth_event, AuthEvent};
use crate::state::AppState;

/// 요청 단위로 확인된 사용자.
///
/// 리졸버가 요청당 한 번 생성하며 핸들러에서 추출기로 사용합니다.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// 저장소에서 다시 읽은 사용자 레코드
    pub user: User,
}

impl CurrentUser {
    /// 현재 역할. 항상 저장소 레코드 기준입니다.
    pub fn role(&self) -> &Role {
        &self.user.role
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| AuthError::Unauthenticated("Unauthorized".to_string()))
    }
}

/// 요청에서 Access Token 추출.
///
/// `Authorization: Bearer` 헤더를 우선하고, 없으면 `access_token` 쿠키를 사용합니다.
pub fn extract_access_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token)
        .or_else(|| read_cookie(headers, ACCESS_TOKEN_COOKIE))
}

/// 스킴 이름은 대소문자를 구분하지 않습니다 (RFC 7235).
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim_start().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token.trim()).filter(|token| !token.is_empty())
}

/// Identity Resolver 미들웨어.
///
/// - 토큰 없음/무효/만료 → 401 (사유를 메시지로 노출)
/// - 토큰의 사용자가 저장소에 없음 → 403
pub async fn deserialize_user(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = extract_access_token(request.headers())
        .map(str::to_owned)
        .ok_or_else(|| AuthError::Unauthenticated("You are not logged in".to_string()))?;

    let claims = state.tokens.validate_access(&token).map_err(|e| {
        debug!(error = %e, "Access token rejected");
        AuthError::from(e)
    })?;
    let user_id = claims.subject_id()?;

    let user = state
        .store
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| {
            debug!(%user_id, "Token subject no longer exists");
            AuthError::IdentityGone
        })?;

    if let Some(token_role) = claims.role() {
        if token_role != user.role.as_str() {
            debug!(
                user_id = %user.id,
                token_role,
                stored_role = %user.role,
                "Role changed since token issuance"
            );
        }
    }

    request.extensions_mut().insert(CurrentUser { user });

    Ok(next.run(request).await)
}

/// 라우트가 선언한 역할 허용 목록.
///
/// 정확한 문자열 일치만 허용합니다. 계층이 없으므로 admin도 접근해야 하는
/// 라우트라면 목록에 명시해야 합니다.
#[derive(Debug, Clone, Copy)]
pub struct AllowedRoles(pub &'static [&'static str]);

impl AllowedRoles {
    pub const ADMIN: AllowedRoles = AllowedRoles(&[Role::ADMIN]);
    pub const ADMIN_OR_DEALER: AllowedRoles = AllowedRoles(&[Role::ADMIN, Role::DEALER]);
}

/// Role Gate 미들웨어.
///
/// - 확인된 사용자 없음 → 401
/// - 역할이 허용 목록에 없음 → 403
pub async fn authorize_roles(
    State(allowed): State<AllowedRoles>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let identity = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| AuthError::Unauthenticated("Unauthorized".to_string()))?;

    if !identity.role().is_one_of(allowed.0) {
        warn!(
            user_id = %identity.user.id,
            role = %identity.role(),
            allowed = ?allowed.0,
            "Access denied by role gate"
        );
        record_auth_event(AuthEvent::AccessDenied, false);
        return Err(AuthError::Forbidden);
    }

    Ok(next.run(request).await)
}
