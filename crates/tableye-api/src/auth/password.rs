//! 비밀번호 해싱 유틸리티.
//!
//! Argon2 기반 비밀번호 해싱 및 검증. 해싱은 의도적으로 비싼 연산이므로
//! 요청 처리 경로에서는 `*_blocking` 대신 블로킹 풀에서 실행되는
//! async 래퍼를 사용합니다.

use std::sync::LazyLock;

use argon2::{
    password_hash::{
        rand_core::OsRng, Error as HashError, PasswordHash, PasswordHasher, PasswordVerifier,
        SaltString,
    },
    Argon2,
};

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
    #[error("비밀번호 불일치")]
    Mismatch,
    #[error("잘못된 해시 형식")]
    InvalidHashFormat,
}

/// 비밀번호 해싱.
///
/// Argon2id 알고리즘을 사용하며 솔트는 매번 새로 생성됩니다.
/// 반환값은 솔트를 포함한 PHC 형식 문자열입니다.
pub fn hash_password_blocking(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| PasswordError::HashingFailed)?;

    Ok(hash.to_string())
}

/// 비밀번호 검증.
///
/// 비교는 알고리즘 자체의 검증 루틴으로 수행됩니다.
/// 불일치는 [`PasswordError::Mismatch`]입니다.
pub fn verify_password_blocking(hash: &str, password: &str) -> Result<(), PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|e| match e {
            HashError::Password => PasswordError::Mismatch,
            _ => PasswordError::InvalidHashFormat,
        })
}

/// 존재하지 않는 계정의 로그인 시도에 사용할 해시.
///
/// 알 수 없는 이메일도 실제 검증과 같은 비용을 치르게 하여 응답 시간으로
/// 계정 존재 여부가 드러나지 않게 합니다.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password_blocking("tableye-unknown-account").ok());

#[cfg(test)]
static DUMMY_VERIFICATIONS: std::sync::atomic::AtomicUsize =
    std::sync::atomic::AtomicUsize::new(0);

/// 더미 해시를 미리 계산합니다. 시작 시 한 번 호출합니다.
pub fn prepare_dummy_hash() -> bool {
    DUMMY_HASH.is_some()
}

/// 블로킹 풀에서 더미 해시에 대해 검증을 수행합니다. 결과는 버립니다.
pub async fn verify_dummy_password(password: String) {
    let _ = tokio::task::spawn_blocking(move || {
        #[cfg(test)]
        DUMMY_VERIFICATIONS.fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        if let Some(hash) = DUMMY_HASH.as_deref() {
            let _ = verify_password_blocking(hash, &password);
        }
    })
    .await;
}

#[cfg(test)]
pub(crate) fn dummy_verifications() -> usize {
    DUMMY_VERIFICATIONS.load(std::sync::atomic::Ordering::SeqCst)
}

/// 블로킹 풀에서 비밀번호 해싱.
pub async fn hash_password(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password_blocking(&password))
        .await
        .map_err(|_| PasswordError::HashingFailed)?
}

/// 블로킹 풀에서 비밀번호 검증.
pub async fn verify_password(hash: String, password: String) -> Result<(), PasswordError> {
    tokio::task::spawn_blocking(move || verify_password_blocking(&hash, &password))
        .await
        .map_err(|_| PasswordError::HashingFailed)?
}
