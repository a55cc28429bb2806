//! 설정 관리.
//!
//! 기본값, 선택적 TOML 파일, `TABLEYE__` 접두사 환경 변수 순으로 병합하여
//! 프로세스 시작 시 한 번만 로드합니다. 요청 처리 중에는 다시 읽지 않습니다.

use std::path::Path;

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

use crate::domain::Role;
use crate::error::{CoreError, CoreResult};

/// 애플리케이션 설정.
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 데이터베이스 설정
    #[serde(default)]
    pub database: DatabaseConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 인증 설정
    pub auth: AuthConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// CORS 허용 origin (클라이언트 주소)
    pub client_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            client_origin: "http://localhost:3000".to_string(),
        }
    }
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// 연결 URL. 없으면 인메모리 저장소 사용
    pub url: Option<String>,
    /// 최대 연결 수
    pub max_connections: u32,
    /// 연결 타임아웃 (초)
    pub connection_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            connection_timeout_secs: 10,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 인증 설정.
///
/// 키는 base64로 인코딩된 PEM 형식 RSA 키입니다. Access/Refresh 토큰은
/// 서로 다른 키 쌍을 사용해야 합니다.
#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    #[serde(deserialize_with = "deserialize_secret")]
    pub access_token_private_key: SecretString,
    pub access_token_public_key: String,
    #[serde(deserialize_with = "deserialize_secret")]
    pub refresh_token_private_key: SecretString,
    pub refresh_token_public_key: String,
    /// Access Token 유효 시간 (분)
    #[serde(default = "default_access_minutes")]
    pub access_token_minutes: i64,
    /// Refresh Token 유효 시간 (분)
    #[serde(default = "default_refresh_minutes")]
    pub refresh_token_minutes: i64,
    /// 쿠키 도메인
    #[serde(default = "default_cookie_domain")]
    pub cookie_domain: String,
    /// 쿠키 Secure 속성
    #[serde(default)]
    pub cookie_secure: bool,
    /// 가입 시 부여할 기본 역할
    #[serde(default = "default_role")]
    pub default_role: String,
    /// 허용되는 역할 집합
    #[serde(default = "Role::defaults")]
    pub known_roles: Vec<String>,
}

fn default_access_minutes() -> i64 {
    15
}

fn default_refresh_minutes() -> i64 {
    60
}

fn default_cookie_domain() -> String {
    "localhost".to_string()
}

fn default_role() -> String {
    Role::USER.to_string()
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(SecretString::new(raw.into()))
}

/// 토큰 유효 시간 상한 (1년, 분 단위)
pub const MAX_TOKEN_MINUTES: i64 = 60 * 24 * 365;

impl AuthConfig {
    /// 설정 불변식 검증.
    ///
    /// - 두 유효 시간은 양수이며 [`MAX_TOKEN_MINUTES`] 이하
    /// - Access Token 유효 시간 < Refresh Token 유효 시간
    /// - 기본 역할은 허용 역할 집합에 포함
    pub fn validate(&self) -> CoreResult<()> {
        if self.access_token_minutes <= 0 || self.refresh_token_minutes <= 0 {
            return Err(CoreError::Config(
                "token lifetimes must be positive".to_string(),
            ));
        }
        if self.access_token_minutes > MAX_TOKEN_MINUTES
            || self.refresh_token_minutes > MAX_TOKEN_MINUTES
        {
            return Err(CoreError::Config(format!(
                "token lifetimes must not exceed {} minutes",
                MAX_TOKEN_MINUTES
            )));
        }
        if self.access_token_minutes >= self.refresh_token_minutes {
            return Err(CoreError::Config(format!(
                "access token lifetime ({}m) must be shorter than refresh token lifetime ({}m)",
                self.access_token_minutes, self.refresh_token_minutes
            )));
        }
        self.default_role()?;
        Ok(())
    }

    /// 가입 기본 역할.
    pub fn default_role(&self) -> CoreResult<Role> {
        Role::parse(&self.default_role, &self.known_roles)
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let builder = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("server.client_origin", "http://localhost:3000")?
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("TABLEYE")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("auth.known_roles")
                    .try_parsing(true),
            );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.auth.validate()?;
        Ok(config)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> CoreResult<Self> {
        Self::load("config/default.toml")
    }
}
