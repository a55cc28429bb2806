//! Users Repository
//!
//! Postgres 기반 [`UserStore`] 구현입니다. 스키마는 외부에서 관리되며
//! 다음 테이블을 사용합니다:
//!
//! - `users (id, name, email UNIQUE, password, role, verified, provider, created_at, updated_at)`
//! - `dealers (id, user_id, dealer_code, status)`
//! - `casino_dealers (casino_id, dealer_id)`
//! - `casinos (id, name)`

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use tableye_core::{
    CasinoSummary, DealerProfile, DealerSummary, NewUser, Role, StoreError, StoreResult, User,
    UserStore,
};

// ================================================================================================
// Types
// ================================================================================================

/// 사용자 레코드
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub verified: bool,
    pub provider: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            email: record.email,
            password_hash: record.password,
            role: Role::from_stored(record.role),
            verified: record.verified,
            provider: record.provider,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// 딜러 + 소속 카지노 조회 결과
#[derive(Debug, Clone, FromRow)]
pub struct DealerProfileRecord {
    pub dealer_id: Uuid,
    pub dealer_code: String,
    pub status: String,
    #[sqlx(default)]
    pub casino_id: Option<Uuid>,
    #[sqlx(default)]
    pub casino_name: Option<String>,
}

impl From<DealerProfileRecord> for DealerProfile {
    fn from(record: DealerProfileRecord) -> Self {
        let casino = match (record.casino_id, record.casino_name) {
            (Some(id), Some(name)) => Some(CasinoSummary { id, name }),
            _ => None,
        };
        Self {
            dealer: DealerSummary {
                id: record.dealer_id,
                dealer_code: record.dealer_code,
                status: record.status,
            },
            casino,
        }
    }
}

const USER_COLUMNS: &str =
    "id, name, email, password, role, verified, provider, created_at, updated_at";

// ================================================================================================
// Repository
// ================================================================================================

/// Postgres 사용자 저장소
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        Ok(record.map(User::from))
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        Ok(record.map(User::from))
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let now = Utc::now();
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            INSERT INTO users (id, name, email, password, role, verified, provider, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.verified)
        .bind(&user.provider)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => StoreError::DuplicateEmail,
            _ => backend(e),
        })?;

        Ok(record.into())
    }

    async fn update_user_role(&self, id: Uuid, role: &Role) -> StoreResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            UPDATE users SET role = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        record.map(User::from).ok_or(StoreError::NotFound)
    }

    async fn find_dealer_profile(&self, user_id: Uuid) -> StoreResult<Option<DealerProfile>> {
        let record = sqlx::query_as::<_, DealerProfileRecord>(
            r#"
            SELECT d.id AS dealer_id, d.dealer_code, d.status,
                   c.id AS casino_id, c.name AS casino_name
            FROM dealers d
            LEFT JOIN LATERAL (
                SELECT cd.casino_id FROM casino_dealers cd
                WHERE cd.dealer_id = d.id
                LIMIT 1
            ) link ON TRUE
            LEFT JOIN casinos c ON c.id = link.casino_id
            WHERE d.user_id = $1
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        Ok(record.map(DealerProfile::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_record_conversion_keeps_stored_role() {
        let now = Utc::now();
        let user: User = UserRecord {
            id: Uuid::new_v4(),
            name: "Pit Boss".to_string(),
            email: "boss@casino.com".to_string(),
            password: "$argon2id$hash".to_string(),
            role: "Admin".to_string(),
            verified: true,
            provider: "local".to_string(),
            created_at: now,
            updated_at: now,
        }
        .into();

        assert_eq!(user.password_hash, "$argon2id$hash");
        // 저장된 값은 그대로 보존 (게이트에서 정확히 비교)
        assert_eq!(user.role.as_str(), "Admin");
    }

    #[test]
    fn test_dealer_profile_without_casino() {
        let profile: DealerProfile = DealerProfileRecord {
            dealer_id: Uuid::new_v4(),
            dealer_code: "D-1".to_string(),
            status: "active".to_string(),
            casino_id: None,
            casino_name: None,
        }
        .into();
        assert!(profile.casino.is_none());

        let casino_id = Uuid::new_v4();
        let profile: DealerProfile = DealerProfileRecord {
            dealer_id: Uuid::new_v4(),
            dealer_code: "D-2".to_string(),
            status: "active".to_string(),
            casino_id: Some(casino_id),
            casino_name: Some("Lucky Seven".to_string()),
        }
        .into();
        assert_eq!(profile.casino.unwrap().id, casino_id);
    }
}
