//! 카지노 운영 추적 API 인증 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API
//! - RS256 JWT Access/Refresh 토큰 인증
//! - 역할 기반 접근 제어
//! - 헬스 체크 엔드포인트
//! - Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`auth`]: 토큰, 비밀번호, 쿠키, 인증 미들웨어
//! - [`repository`]: Postgres 사용자 저장소
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어

pub mod auth;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod repository;
pub mod routes;
pub mod state;

pub use auth::{
    hash_password, verify_password, AllowedRoles, CookieSettings, CurrentUser, PasswordError,
    PemKeys, TokenClaims, TokenCodec, TokenError,
};
pub use error::{ApiErrorResponse, ApiResult, AuthError};
pub use metrics::setup_metrics_recorder;
pub use middleware::metrics_layer;
pub use repository::PgUserStore;
pub use routes::{
    admin_router, auth_router, create_api_router, health_router, users_router, HealthResponse,
    SignInRequest, SignInResponse, SignUpRequest, UserResponse,
};
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use state::{create_test_state, create_test_state_with_store};
