//! User profile repository.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait};
use uuid::Uuid;

use super::entities::user_profile::{ActiveModel, Entity as ProfileEntity};
use crate::domain::UserProfile;
use crate::errors::AppResult;

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<UserProfile>>;

    async fn create(&self, profile: UserProfile) -> AppResult<UserProfile>;

    async fn update(&self, profile: UserProfile) -> AppResult<UserProfile>;
}

/// SeaORM implementation of ProfileRepository
pub struct ProfileStore<C> {
    conn: Arc<C>,
}

impl<C> ProfileStore<C> {
    pub fn new(conn: Arc<C>) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl<C> ProfileRepository for ProfileStore<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_user(&self, user_id: Uuid) -> AppResult<Option<UserProfile>> {
        let result = ProfileEntity::find_by_id(user_id).one(&*self.conn).await?;
        Ok(result.map(UserProfile::from))
    }

    async fn create(&self, profile: UserProfile) -> AppResult<UserProfile> {
        let model = ActiveModel::from(profile).insert(&*self.conn).await?;
        Ok(UserProfile::from(model))
    }

    async fn update(&self, profile: UserProfile) -> AppResult<UserProfile> {
        let model = ActiveModel::from(profile).update(&*self.conn).await?;
        Ok(UserProfile::from(model))
    }
}
