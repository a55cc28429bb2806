//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 시작 시 한 번 구성되고 이후 읽기 전용으로 공유됩니다.
//! Arc로 래핑되어 여러 요청 간에 잠금 없이 공유됩니다.

use std::sync::Arc;

use tableye_core::{AuthConfig, Role, UserStore};

use crate::auth::{CookieSettings, TokenCodec};

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 사용자 식별 저장소 (Postgres 또는 인메모리)
    pub store: Arc<dyn UserStore>,

    /// Access/Refresh 토큰 코덱
    pub tokens: TokenCodec,

    /// 인증 쿠키 속성
    pub cookies: CookieSettings,

    /// 가입 시 부여할 기본 역할
    pub default_role: Role,

    /// 허용되는 역할 집합
    pub known_roles: Vec<String>,

    /// 데이터베이스 연결 풀 (헬스 체크용, 선택적)
    pub db_pool: Option<sqlx::PgPool>,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    pub fn new(
        store: Arc<dyn UserStore>,
        tokens: TokenCodec,
        cookies: CookieSettings,
        default_role: Role,
        known_roles: Vec<String>,
    ) -> Self {
        Self {
            store,
            tokens,
            cookies,
            default_role,
            known_roles,
            db_pool: None,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 인증 설정에서 AppState 생성.
    ///
    /// 키 디코딩과 기본 역할 검증이 여기서 한 번만 수행됩니다.
    pub fn from_config(config: &AuthConfig, store: Arc<dyn UserStore>) -> anyhow::Result<Self> {
        let tokens = TokenCodec::from_config(config)?;
        let default_role = config.default_role()?;
        if !crate::auth::prepare_dummy_hash() {
            anyhow::bail!("failed to prepare placeholder password hash");
        }

        Ok(Self::new(
            store,
            tokens,
            CookieSettings::from_config(config),
            default_role,
            config.known_roles.clone(),
        ))
    }

    /// 데이터베이스 풀 설정.
    pub fn with_db_pool(mut self, pool: sqlx::PgPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// 데이터베이스 연결 상태 확인.
    pub async fn is_db_healthy(&self) -> bool {
        match &self.db_pool {
            Some(pool) => sqlx::query("SELECT 1").execute(pool).await.is_ok(),
            None => false,
        }
    }

    /// 서버 업타임 (초).
    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }
}

/// 테스트용 AppState 생성.
///
/// 인메모리 저장소와 `tests/fixtures`의 RSA 키를 사용합니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    create_test_state_with_store().0
}

/// 테스트용 AppState와 저장소 핸들을 함께 반환합니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state_with_store() -> (AppState, Arc<tableye_core::InMemoryUserStore>) {
    use crate::auth::PemKeys;

    let tokens = TokenCodec::from_pem(
        PemKeys {
            access_private: include_bytes!("../tests/fixtures/access_private.pem"),
            access_public: include_bytes!("../tests/fixtures/access_public.pem"),
            refresh_private: include_bytes!("../tests/fixtures/refresh_private.pem"),
            refresh_public: include_bytes!("../tests/fixtures/refresh_public.pem"),
        },
        chrono::Duration::minutes(15),
        chrono::Duration::minutes(60),
    )
    .expect("test fixture keys must parse");

    let cookies = CookieSettings {
        domain: "localhost".to_string(),
        secure: false,
        access_max_age: 15 * 60,
        refresh_max_age: 60 * 60,
    };

    let store = Arc::new(tableye_core::InMemoryUserStore::new());
    let state = AppState::new(
        store.clone(),
        tokens,
        cookies,
        Role::from_stored(Role::USER),
        Role::defaults(),
    );
    (state, store)
}
