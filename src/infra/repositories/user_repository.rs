//! User repository implementation.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use super::fetch_page;
use crate::domain::User;
use crate::errors::AppResult;
use crate::types::{Page, PaginationParams};

#[cfg(test)]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// Accounts are never removed; deactivated users stay queryable.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID, active or not
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find user by normalised email address
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Page through every account, newest first
    async fn list(&self, params: PaginationParams) -> AppResult<Page<User>>;

    /// Insert a new user
    async fn create(&self, user: User) -> AppResult<User>;

    /// Persist every field of an existing user
    async fn update(&self, user: User) -> AppResult<User>;
}

/// SeaORM implementation of UserRepository
pub struct UserStore<C> {
    conn: Arc<C>,
}

impl<C> UserStore<C> {
    /// Create new repository instance
    pub fn new(conn: Arc<C>) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl<C> UserRepository for UserStore<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id).one(&*self.conn).await?;
        Ok(result.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&*self.conn)
            .await?;
        Ok(result.map(User::from))
    }

    async fn list(&self, params: PaginationParams) -> AppResult<Page<User>> {
        let select = UserEntity::find().order_by_desc(user::Column::DateJoined);
        let page = fetch_page(select, &*self.conn, params).await?;
        Ok(page.map(User::from))
    }

    async fn create(&self, user: User) -> AppResult<User> {
        let model = ActiveModel::from(user).insert(&*self.conn).await?;
        Ok(User::from(model))
    }

    async fn update(&self, user: User) -> AppResult<User> {
        let model = ActiveModel::from(user).update(&*self.conn).await?;
        Ok(User::from(model))
    }
}

