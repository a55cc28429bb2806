//! 관리자 endpoint.
//!
//! 사용자 역할 변경. 두 라우트 모두 Identity Resolver와 `admin` 전용
//! Role Gate 뒤에 배치됩니다 ([`super::create_api_router`] 참고).

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use tableye_core::Role;

use crate::auth::CurrentUser;
use crate::error::{ApiResult, AuthError, ValidatedJson};
use crate::metrics::{record_auth_event, AuthEvent};
use crate::state::AppState;

/// 관리자 권한 부여 요청.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignAdminRequest {
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,
}

/// 역할 변경 요청.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignRoleRequest {
    #[validate(length(min = 1, message = "userId is required"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "role is required"))]
    pub role: String,
}

fn parse_user_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| AuthError::Validation("Invalid user ID".to_string()))
}

async fn assign(state: &AppState, actor: &CurrentUser, user_id: Uuid, role: Role) -> ApiResult<Value> {
    let user = state.store.update_user_role(user_id, &role).await?;

    info!(
        actor_id = %actor.user.id,
        user_id = %user.id,
        role = %user.role,
        "User role updated"
    );
    record_auth_event(AuthEvent::RoleAssigned, true);

    Ok(json!({
        "status": "success",
        "message": format!("User role updated to {}", user.role),
    }))
}

/// 관리자 권한 부여.
///
/// POST /api/admin/assign-admin
pub async fn assign_admin(
    State(state): State<Arc<AppState>>,
    actor: CurrentUser,
    ValidatedJson(payload): ValidatedJson<AssignAdminRequest>,
) -> ApiResult<Json<Value>> {
    let user_id = parse_user_id(&payload.user_id)?;
    let role = Role::parse(Role::ADMIN, &state.known_roles)?;
    assign(&state, &actor, user_id, role).await.map(Json)
}

/// 역할 변경. 알려진 역할만 허용합니다 (대소문자 구분).
///
/// POST /api/admin/assign-role
pub async fn assign_role(
    State(state): State<Arc<AppState>>,
    actor: CurrentUser,
    ValidatedJson(payload): ValidatedJson<AssignRoleRequest>,
) -> ApiResult<Json<Value>> {
    let user_id = parse_user_id(&payload.user_id)?;
    let role = Role::parse(&payload.role, &state.known_roles)?;
    assign(&state, &actor, user_id, role).await.map(Json)
}

/// 관리자 라우터 생성. 인증/인가 레이어는 호출 측에서 적용합니다.
pub fn admin_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/assign-admin", post(assign_admin))
        .route("/assign-role", post(assign_role))
}
