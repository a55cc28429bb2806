//! 현재 사용자 endpoint.

use axum::{routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use tableye_core::{Role, User};

use crate::auth::CurrentUser;
use crate::state::AppState;

/// 공개 가능한 사용자 정보. 비밀번호 해시는 포함하지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub verified: bool,
    pub provider: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            verified: user.verified,
            provider: user.provider.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// 현재 로그인한 사용자 조회.
///
/// GET /api/users/me
pub async fn get_me(current: CurrentUser) -> Json<Value> {
    Json(json!({
        "status": "success",
        "data": { "user": UserResponse::from(&current.user) }
    }))
}

/// 사용자 라우터 생성. Identity Resolver 레이어는 호출 측에서 적용합니다.
pub fn users_router() -> Router<Arc<AppState>> {
    Router::new().route("/me", get(get_me))
}
