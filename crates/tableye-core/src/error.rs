//! 핵심 에러 타입.
//!
//! 설정 로드와 도메인 값 검증 중 발생하는 에러를 정의합니다.

use thiserror::Error;

/// 핵심 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 알 수 없는 역할
    #[error("unknown role: {0}")]
    InvalidRole(String),
}

/// 핵심 작업을 위한 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_role_message() {
        let err = CoreError::InvalidRole("Admin".to_string());
        assert_eq!(err.to_string(), "unknown role: Admin");
    }

    #[test]
    fn test_from_config_error() {
        let err: CoreError = config::ConfigError::Message("boom".to_string()).into();
        assert!(matches!(err, CoreError::Config(msg) if msg.contains("boom")));
    }
}
