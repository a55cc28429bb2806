//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/api/healthchecker` - 클라이언트용 헬스 체크
//! - `/api/auth` - 가입, 로그인, 토큰 재발급, 로그아웃
//! - `/api/users` - 현재 사용자 (로그인 필요)
//! - `/api/admin` - 역할 관리 (`admin` 역할 필요)

pub mod admin;
pub mod auth;
pub mod health;
pub mod users;

pub use admin::{admin_router, AssignAdminRequest, AssignRoleRequest};
pub use auth::{auth_router, SignInRequest, SignInResponse, SignUpRequest};
pub use health::{health_router, HealthResponse};
pub use users::{users_router, UserResponse};

use axum::{middleware::from_fn_with_state, routing::get, Router};
use std::sync::Arc;

use crate::auth::{authorize_roles, deserialize_user, AllowedRoles};
use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// 보호된 라우터는 `route_layer` 순서상 Role Gate를 먼저, Identity Resolver를
/// 나중에 추가합니다. 실행 순서는 리졸버 → 게이트 → 핸들러입니다.
pub fn create_api_router(state: Arc<AppState>) -> Router {
    let users = users_router().route_layer(from_fn_with_state(state.clone(), deserialize_user));

    let admin = admin_router()
        .route_layer(from_fn_with_state(AllowedRoles::ADMIN, authorize_roles))
        .route_layer(from_fn_with_state(state.clone(), deserialize_user));

    Router::new()
        .nest("/health", health_router())
        .route("/api/healthchecker", get(health::health_checker))
        .nest("/api/auth", auth_router())
        .nest("/api/users", users)
        .nest("/api/admin", admin)
        .with_state(state)
}
