//! JWT 토큰 처리.
//!
//! Access Token 및 Refresh Token 발급/검증 로직. 서명 알고리즘은 RS256으로
//! 고정되며, 검증 키(공개키)는 서명 키(개인키)와 분리되어 배포될 수 있습니다.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use tableye_core::{AuthConfig, Role};

/// 고정 서명 알고리즘.
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::RS256;

const ACCESS_TOKEN_TYPE: &str = "access";
const REFRESH_TOKEN_TYPE: &str = "refresh";

/// JWT 페이로드.
///
/// `sub`, `iat`, `exp`, `jti` 외의 클레임은 `extra`에 그대로 보존됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject - 사용자 ID
    pub sub: String,
    /// Issued At (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
    /// JWT ID
    pub jti: String,
    /// 추가 클레임 (role, token_type 등)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenClaims {
    /// 발급 시점에 포함된 역할 클레임.
    ///
    /// 정보 제공용입니다. 권한 판단은 항상 저장소에서 다시 읽은 역할로 합니다.
    pub fn role(&self) -> Option<&str> {
        self.extra.get("role").and_then(Value::as_str)
    }

    /// 토큰 종류 (`access` | `refresh`).
    pub fn token_type(&self) -> Option<&str> {
        self.extra.get("token_type").and_then(Value::as_str)
    }

    /// Subject를 사용자 ID로 파싱.
    pub fn subject_id(&self) -> Result<Uuid, TokenError> {
        Uuid::parse_str(&self.sub).map_err(|_| TokenError::Malformed)
    }
}

/// 토큰 코덱 에러.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    SignatureInvalid,
    #[error("token has expired")]
    Expired,
    #[error("unexpected signing algorithm")]
    UnexpectedAlgorithm,
    #[error("failed to sign token: {0}")]
    Signing(String),
    #[error("invalid key material: {0}")]
    InvalidKey(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                TokenError::UnexpectedAlgorithm
            }
            ErrorKind::InvalidRsaKey(_) | ErrorKind::InvalidKeyFormat => {
                TokenError::InvalidKey(err.to_string())
            }
            _ => TokenError::Malformed,
        }
    }
}

/// 토큰 발급.
///
/// `{sub, iat, exp = now + ttl, jti, ...extra}`를 RS256으로 서명합니다.
/// `extra`에 `sub`/`iat`/`exp`/`jti`가 있으면 무시됩니다.
pub fn issue(
    subject: &str,
    ttl: Duration,
    key: &EncodingKey,
    mut extra: Map<String, Value>,
) -> Result<String, TokenError> {
    for reserved in ["sub", "iat", "exp", "jti"] {
        extra.remove(reserved);
    }

    let now = Utc::now();
    let claims = TokenClaims {
        sub: subject.to_string(),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
        jti: Uuid::new_v4().to_string(),
        extra,
    };

    encode(&Header::new(SIGNING_ALGORITHM), &claims, key)
        .map_err(|e| TokenError::Signing(e.to_string()))
}

/// 토큰 검증.
///
/// 알고리즘이 RS256이 아니면 서명 확인 전에 거부합니다. 라이브러리의 만료
/// 검사와 별도로 `exp`를 현재 시각과 다시 비교하며, `exp`가 없는 토큰은
/// 만료 없는 토큰으로 취급하지 않고 `Malformed`로 거부합니다.
pub fn validate(token: &str, key: &DecodingKey) -> Result<TokenClaims, TokenError> {
    let mut validation = Validation::new(SIGNING_ALGORITHM);
    validation.leeway = 0;
    validation.validate_exp = true;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<TokenClaims>(token, key, &validation)?;
    if data.claims.exp <= Utc::now().timestamp() {
        return Err(TokenError::Expired);
    }

    Ok(data.claims)
}

/// Access/Refresh 키 쌍과 유효 시간을 보유한 코덱.
///
/// 프로세스 시작 시 한 번 생성되어 모든 요청에서 읽기 전용으로 공유됩니다.
#[derive(Clone)]
pub struct TokenCodec {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &SIGNING_ALGORITHM)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

/// PEM 형식 키 묶음.
pub struct PemKeys<'a> {
    pub access_private: &'a [u8],
    pub access_public: &'a [u8],
    pub refresh_private: &'a [u8],
    pub refresh_public: &'a [u8],
}

impl TokenCodec {
    /// PEM 키에서 코덱 생성.
    pub fn from_pem(
        keys: PemKeys<'_>,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Result<Self, TokenError> {
        Ok(Self {
            access_encoding: EncodingKey::from_rsa_pem(keys.access_private)?,
            access_decoding: DecodingKey::from_rsa_pem(keys.access_public)?,
            refresh_encoding: EncodingKey::from_rsa_pem(keys.refresh_private)?,
            refresh_decoding: DecodingKey::from_rsa_pem(keys.refresh_public)?,
            access_ttl,
            refresh_ttl,
        })
    }

    /// 설정에서 코덱 생성. 키는 base64로 인코딩된 PEM입니다.
    pub fn from_config(config: &AuthConfig) -> Result<Self, TokenError> {
        let access_private = decode_key(config.access_token_private_key.expose_secret())?;
        let access_public = decode_key(&config.access_token_public_key)?;
        let refresh_private = decode_key(config.refresh_token_private_key.expose_secret())?;
        let refresh_public = decode_key(&config.refresh_token_public_key)?;

        Self::from_pem(
            PemKeys {
                access_private: &access_private,
                access_public: &access_public,
                refresh_private: &refresh_private,
                refresh_public: &refresh_public,
            },
            Duration::minutes(config.access_token_minutes),
            Duration::minutes(config.refresh_token_minutes),
        )
    }

    /// Access Token 유효 시간.
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Refresh Token 유효 시간.
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Access Token 발급. 발급 시점의 역할을 클레임에 포함합니다.
    pub fn issue_access(&self, user_id: Uuid, role: &Role) -> Result<String, TokenError> {
        let mut extra = Map::new();
        extra.insert("role".to_string(), Value::String(role.to_string()));
        extra.insert(
            "token_type".to_string(),
            Value::String(ACCESS_TOKEN_TYPE.to_string()),
        );
        issue(
            &user_id.to_string(),
            self.access_ttl,
            &self.access_encoding,
            extra,
        )
    }

    /// Refresh Token 발급.
    pub fn issue_refresh(&self, user_id: Uuid) -> Result<String, TokenError> {
        let mut extra = Map::new();
        extra.insert(
            "token_type".to_string(),
            Value::String(REFRESH_TOKEN_TYPE.to_string()),
        );
        issue(
            &user_id.to_string(),
            self.refresh_ttl,
            &self.refresh_encoding,
            extra,
        )
    }

    /// Access Token 검증.
    pub fn validate_access(&self, token: &str) -> Result<TokenClaims, TokenError> {
        validate(token, &self.access_decoding)
    }

    /// Refresh Token 검증.
    pub fn validate_refresh(&self, token: &str) -> Result<TokenClaims, TokenError> {
        validate(token, &self.refresh_decoding)
    }
}

fn decode_key(encoded: &str) -> Result<Vec<u8>, TokenError> {
    STANDARD
        .decode(encoded.trim())
        .map_err(|e| TokenError::InvalidKey(e.to_string()))
}
