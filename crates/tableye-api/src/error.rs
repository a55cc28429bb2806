//! 통합 API 에러 응답 타입.
//!
//! 모든 에러는 `{ "status": "fail" | "error", "message": ... }` 형식으로 응답합니다.
//! 클라이언트 원인(4xx)은 `fail`, 서버 원인(5xx)은 `error`입니다.

use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use tableye_core::{CoreError, StoreError};

use crate::auth::{PasswordError, TokenError};

/// 내부 에러 대신 노출되는 일반 메시지.
const GENERIC_ERROR_MESSAGE: &str = "Something bad happened";

/// API 에러 응답 본문.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// "fail" (클라이언트 원인) | "error" (서버 원인)
    pub status: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
}

impl ApiErrorResponse {
    /// 상태 코드에 맞는 `status` 필드로 생성합니다.
    pub fn for_status(code: StatusCode, message: impl Into<String>) -> Self {
        let status = if code.is_server_error() { "error" } else { "fail" };
        Self {
            status: status.to_string(),
            message: message.into(),
        }
    }
}

/// 인증/인가 경계 에러.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// 요청 본문 형식/검증 실패
    #[error("{0}")]
    Validation(String),
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("User with that email already exists")]
    DuplicateEmail,
    /// 이메일 없음과 비밀번호 불일치를 구분하지 않음
    #[error("Invalid email or Password")]
    InvalidCredentials,
    /// 토큰 없음/무효/만료. 사유를 메시지로 노출
    #[error("{0}")]
    Unauthenticated(String),
    /// 토큰은 유효하지만 사용자가 사라짐
    #[error("The user belonging to this token no longer exists")]
    IdentityGone,
    #[error("Access denied")]
    Forbidden,
    /// Refresh Token 재발급 거부
    #[error("{0}")]
    RefreshDenied(String),
    #[error("{0}")]
    NotFound(String),
    /// 해싱/저장소 실패 (502)
    #[error("upstream failure: {0}")]
    Upstream(String),
    /// 서명 등 내부 실패 (500)
    #[error("internal failure: {0}")]
    Internal(String),
}

impl AuthError {
    /// HTTP 상태 코드.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation(_)
            | AuthError::PasswordMismatch
            | AuthError::InvalidCredentials => StatusCode::BAD_REQUEST,
            AuthError::DuplicateEmail => StatusCode::CONFLICT,
            AuthError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AuthError::IdentityGone | AuthError::Forbidden | AuthError::RefreshDenied(_) => {
                StatusCode::FORBIDDEN
            }
            AuthError::NotFound(_) => StatusCode::NOT_FOUND,
            AuthError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 응답 본문에 노출할 메시지. 서버 측 상세는 숨깁니다.
    pub fn public_message(&self) -> String {
        match self {
            AuthError::Upstream(_) | AuthError::Internal(_) => GENERIC_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        }

        let body = ApiErrorResponse::for_status(status, self.public_message());
        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AuthError::NotFound("User not found".to_string()),
            StoreError::DuplicateEmail => AuthError::DuplicateEmail,
            StoreError::Backend(e) => AuthError::Upstream(e),
        }
    }
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::Mismatch => AuthError::InvalidCredentials,
            other => AuthError::Upstream(other.to_string()),
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(_) | TokenError::InvalidKey(_) => {
                AuthError::Internal(err.to_string())
            }
            other => AuthError::Unauthenticated(other.to_string()),
        }
    }
}

impl From<CoreError> for AuthError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidRole(_) => AuthError::Validation(err.to_string()),
            CoreError::Config(_) => AuthError::Internal(err.to_string()),
        }
    }
}

/// API 핸들러 Result 타입.
pub type ApiResult<T> = Result<T, AuthError>;

/// JSON 역직렬화 후 `validator` 검증까지 수행하는 추출기.
///
/// 실패 시 400 `fail` 응답을 반환합니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AuthError::Validation(rejection.body_text()))?;

        value
            .validate()
            .map_err(|errors| AuthError::Validation(validation_message(&errors)))?;

        Ok(ValidatedJson(value))
    }
}

fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{}: invalid value", field))
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}
