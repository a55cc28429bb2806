//! 인증 및 권한 부여.
//!
//! RS256 JWT 기반 인증과 역할 기반 접근 제어를 제공합니다.
//!
//! # 구성 요소
//!
//! - [`TokenCodec`]: Access/Refresh 토큰 발급 및 검증
//! - [`hash_password`], [`verify_password`]: Argon2 비밀번호 해싱
//! - [`deserialize_user`]: 토큰 → 확인된 사용자 ([`CurrentUser`])
//! - [`authorize_roles`]: 라우트별 역할 허용 목록 검사
//! - [`CookieSettings`]: 인증 쿠키 발급/삭제

mod cookies;
mod jwt;
mod middleware;
mod password;

pub use cookies::{
    read_cookie, CookieSettings, ACCESS_TOKEN_COOKIE, LOGGED_IN_COOKIE, REFRESH_TOKEN_COOKIE,
};
pub use jwt::{issue, validate, PemKeys, TokenClaims, TokenCodec, TokenError, SIGNING_ALGORITHM};
pub use middleware::{
    authorize_roles, deserialize_user, extract_access_token, AllowedRoles, CurrentUser,
};
pub use password::{
    hash_password, hash_password_blocking, prepare_dummy_hash, verify_dummy_password,
    verify_password, verify_password_blocking, PasswordError,
};

#[cfg(test)]
pub(crate) use password::dummy_verifications;
