//! 사용자 식별 레코드.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Role;

/// 비밀번호 기반 가입을 나타내는 provider 태그.
pub const LOCAL_PROVIDER: &str = "local";

/// 사용자 레코드.
///
/// 저장소가 소유하며, 인증 코어는 요청마다 읽기 전용 사본만 보유합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// 소문자로 정규화된 이메일
    pub email: String,
    /// PHC 형식 비밀번호 해시 (직렬화되지 않음)
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    pub verified: bool,
    pub provider: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 새 사용자 입력.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub verified: bool,
    pub provider: String,
}

impl NewUser {
    /// 로컬 (비밀번호) 가입 사용자 생성.
    ///
    /// 이메일은 여기서 소문자로 정규화됩니다.
    pub fn local(
        name: impl Into<String>,
        email: &str,
        password_hash: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            name: name.into(),
            email: normalize_email(email),
            password_hash: password_hash.into(),
            role,
            verified: true,
            provider: LOCAL_PROVIDER.to_string(),
        }
    }

    /// 식별자와 타임스탬프를 부여해 레코드로 변환.
    pub fn into_user(self, id: Uuid, now: DateTime<Utc>) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            role: self.role,
            verified: self.verified,
            provider: self.provider,
            created_at: now,
            updated_at: now,
        }
    }
}

/// 이메일 정규화 (앞뒤 공백 제거 + 소문자).
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// 딜러 요약.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealerSummary {
    pub id: Uuid,
    pub dealer_code: String,
    pub status: String,
}

/// 카지노 요약.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CasinoSummary {
    pub id: Uuid,
    pub name: String,
}

/// 사용자와 연결된 딜러 및 소속 카지노.
#[derive(Debug, Clone, PartialEq)]
pub struct DealerProfile {
    pub dealer: DealerSummary,
    pub casino: Option<CasinoSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_user_normalizes_email() {
        let user = NewUser::local("A", "  Mixed@Example.COM ", "hash", Role::from_stored("user"));
        assert_eq!(user.email, "mixed@example.com");
        assert_eq!(user.provider, LOCAL_PROVIDER);
        assert!(user.verified);
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = NewUser::local("A", "a@b.com", "$argon2id$secret", Role::admin())
            .into_user(Uuid::new_v4(), Utc::now());
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("secret"));
    }
}
