//! 식별 저장소 계약.
//!
//! 인증 코어는 사용자 레코드가 어떻게 영속화되는지 알지 못합니다.
//! 조회/생성/역할 변경 능력만 [`UserStore`]를 통해 소비합니다.

mod memory;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{DealerProfile, NewUser, Role, User};

pub use memory::InMemoryUserStore;

/// 저장소 에러.
#[derive(Debug, Error)]
pub enum StoreError {
    /// 대상 레코드 없음
    #[error("record not found")]
    NotFound,
    /// 이메일 유일성 제약 위반
    #[error("user with that email already exists")]
    DuplicateEmail,
    /// 백엔드 에러 (DB 연결 실패 등)
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// 저장소 작업 Result 타입.
pub type StoreResult<T> = Result<T, StoreError>;

/// 사용자 식별 저장소.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// ID로 사용자 조회.
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// 정규화된 이메일로 사용자 조회.
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// 사용자 생성. 이메일이 이미 존재하면 [`StoreError::DuplicateEmail`].
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    /// 역할 변경. 사용자가 없으면 [`StoreError::NotFound`].
    async fn update_user_role(&self, id: Uuid, role: &Role) -> StoreResult<User>;

    /// 사용자에게 연결된 딜러/카지노 조회.
    async fn find_dealer_profile(&self, user_id: Uuid) -> StoreResult<Option<DealerProfile>>;
}
