//! 사용자 역할.
//!
//! 역할은 운영자가 설정할 수 있는 열린 집합이므로 닫힌 enum 대신
//! 검증된 문자열 newtype으로 표현합니다. 비교는 항상 정확한 문자열
//! 일치로만 수행하며 계층(예: admin ⊃ dealer)은 존재하지 않습니다.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// 사용자 역할.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    /// 관리자
    pub const ADMIN: &'static str = "admin";
    /// 딜러
    pub const DEALER: &'static str = "dealer";
    /// 일반 사용자
    pub const USER: &'static str = "user";
    /// 카지노 소유자
    pub const OWNER: &'static str = "owner";

    /// 기본 역할 집합.
    pub fn defaults() -> Vec<String> {
        [Self::ADMIN, Self::DEALER, Self::USER, Self::OWNER]
            .iter()
            .map(|r| r.to_string())
            .collect()
    }

    /// 저장소에서 읽은 값을 그대로 감쌉니다 (검증 없음).
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// 관리자 역할.
    pub fn admin() -> Self {
        Self(Self::ADMIN.to_string())
    }

    /// 허용된 역할 집합에 속하는지 확인한 뒤 역할을 생성합니다.
    ///
    /// 대소문자를 변환하지 않습니다. `"Admin"`은 `"admin"`과 다른 역할입니다.
    pub fn parse(value: &str, known: &[String]) -> CoreResult<Self> {
        if known.iter().any(|k| k == value) {
            Ok(Self(value.to_string()))
        } else {
            Err(CoreError::InvalidRole(value.to_string()))
        }
    }

    /// 문자열 표현 반환.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 허용 목록에 정확히 일치하는 항목이 있는지 확인.
    pub fn is_one_of(&self, allowed: &[&str]) -> bool {
        allowed.iter().any(|a| *a == self.0)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Role {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_role() {
        let known = Role::defaults();
        assert_eq!(Role::parse("dealer", &known).unwrap().as_str(), "dealer");
        assert_eq!(Role::parse("owner", &known).unwrap().as_str(), "owner");
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        let known = Role::defaults();
        assert!(matches!(
            Role::parse("Admin", &known),
            Err(CoreError::InvalidRole(r)) if r == "Admin"
        ));
        assert!(Role::parse("ADMIN", &known).is_err());
    }

    #[test]
    fn test_parse_operator_defined_role() {
        let known = vec!["pit_boss".to_string()];
        assert!(Role::parse("pit_boss", &known).is_ok());
        assert!(Role::parse("admin", &known).is_err());
    }

    #[test]
    fn test_is_one_of_exact() {
        let dealer = Role::from_stored("dealer");
        assert!(!dealer.is_one_of(&["admin"]));
        assert!(dealer.is_one_of(&["admin", "dealer"]));
        assert!(!Role::from_stored("Admin").is_one_of(&["admin"]));
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Role::admin()).unwrap();
        assert_eq!(json, "\"admin\"");

        let parsed: Role = serde_json::from_str("\"dealer\"").unwrap();
        assert_eq!(parsed, Role::from_stored("dealer"));
    }
}
