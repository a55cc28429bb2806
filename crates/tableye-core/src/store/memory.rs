//! 인메모리 사용자 저장소.
//!
//! 데이터베이스가 설정되지 않은 개발 환경과 테스트에서 사용됩니다.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, StoreResult, UserStore};
use crate::domain::{DealerProfile, NewUser, Role, User};

/// 인메모리 사용자 저장소.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
    dealer_profiles: RwLock<HashMap<Uuid, DealerProfile>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 사용자에게 딜러 프로필 연결.
    pub async fn link_dealer_profile(&self, user_id: Uuid, profile: DealerProfile) {
        self.dealer_profiles.write().await.insert(user_id, profile);
    }

    /// 사용자 삭제. 존재했으면 true.
    pub async fn remove_user(&self, id: Uuid) -> bool {
        self.dealer_profiles.write().await.remove(&id);
        self.users.write().await.remove(&id).is_some()
    }

    /// 저장된 사용자 수.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }

        let record = user.into_user(Uuid::new_v4(), Utc::now());
        users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_user_role(&self, id: Uuid, role: &Role) -> StoreResult<User> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.role = role.clone();
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn find_dealer_profile(&self, user_id: Uuid) -> StoreResult<Option<DealerProfile>> {
        Ok(self.dealer_profiles.read().await.get(&user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CasinoSummary, DealerSummary};

    fn new_user(email: &str) -> NewUser {
        NewUser::local("Test User", email, "hash", Role::from_stored("user"))
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = InMemoryUserStore::new();
        let created = store.create_user(new_user("a@b.com")).await.unwrap();

        let by_id = store.find_user_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "a@b.com");

        let by_email = store.find_user_by_email("a@b.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);

        assert!(store.find_user_by_email("x@b.com").await.unwrap().is_none());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = InMemoryUserStore::new();
        store.create_user(new_user("a@b.com")).await.unwrap();

        let err = store.create_user(new_user("A@B.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
    }

    #[tokio::test]
    async fn test_update_role() {
        let store = InMemoryUserStore::new();
        let created = store.create_user(new_user("a@b.com")).await.unwrap();

        let updated = store.update_user_role(created.id, &Role::admin()).await.unwrap();
        assert_eq!(updated.role, Role::admin());
        assert!(updated.updated_at >= created.updated_at);

        let missing = store.update_user_role(Uuid::new_v4(), &Role::admin()).await;
        assert!(matches!(missing, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_dealer_profile_and_removal() {
        let store = InMemoryUserStore::new();
        let created = store.create_user(new_user("a@b.com")).await.unwrap();
        let profile = DealerProfile {
            dealer: DealerSummary {
                id: Uuid::new_v4(),
                dealer_code: "D-001".to_string(),
                status: "active".to_string(),
            },
            casino: Some(CasinoSummary {
                id: Uuid::new_v4(),
                name: "Lucky Seven".to_string(),
            }),
        };
        store.link_dealer_profile(created.id, profile.clone()).await;

        assert_eq!(store.find_dealer_profile(created.id).await.unwrap(), Some(profile));

        assert!(store.remove_user(created.id).await);
        assert!(store.find_user_by_id(created.id).await.unwrap().is_none());
        assert!(store.find_dealer_profile(created.id).await.unwrap().is_none());
        assert!(store.is_empty().await);
    }
}
