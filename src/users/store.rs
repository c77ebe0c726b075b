use async_trait::async_trait;
use uuid::Uuid;

use super::model::{NewUser, User, UserUpdate};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("a user with this email already exists")]
    DuplicateEmail,
    #[error("user not found")]
    NotFound,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Persistence contract the auth layer depends on. Implementations must
/// enforce email uniqueness and report it as `StoreError::DuplicateEmail`.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn create(&self, new_user: NewUser) -> Result<User, StoreError>;
    async fn update(&self, id: Uuid, changes: UserUpdate) -> Result<User, StoreError>;
    async fn list(&self) -> Result<Vec<User>, StoreError>;
}
