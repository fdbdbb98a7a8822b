//! Notification repository.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use super::entities::notification::{self, ActiveModel, Entity as NotificationEntity};
use super::fetch_page;
use crate::domain::Notification;
use crate::errors::{AppResult, OptionExt};
use crate::types::{Page, PaginationParams};

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Notification>>;

    /// Notifications, newest first
    async fn list(
        &self,
        user_id: Option<Uuid>,
        unread_only: bool,
        params: PaginationParams,
    ) -> AppResult<Page<Notification>>;

    async fn create(&self, notification: Notification) -> AppResult<Notification>;

    async fn update(&self, notification: Notification) -> AppResult<Notification>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// SeaORM implementation of NotificationRepository
pub struct NotificationStore<C> {
    conn: Arc<C>,
}

impl<C> NotificationStore<C> {
    pub fn new(conn: Arc<C>) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl<C> NotificationRepository for NotificationStore<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Notification>> {
        let result = NotificationEntity::find_by_id(id).one(&*self.conn).await?;
        Ok(result.map(Notification::from))
    }

    async fn list(
        &self,
        user_id: Option<Uuid>,
        unread_only: bool,
        params: PaginationParams,
    ) -> AppResult<Page<Notification>> {
        let mut select = NotificationEntity::find();
        if let Some(user_id) = user_id {
            select = select.filter(notification::Column::UserId.eq(user_id));
        }
        if unread_only {
            select = select.filter(notification::Column::IsRead.eq(false));
        }
        let select = select.order_by_desc(notification::Column::CreatedAt);

        let page = fetch_page(select, &*self.conn, params).await?;
        Ok(page.map(Notification::from))
    }

    async fn create(&self, notification: Notification) -> AppResult<Notification> {
        let model = ActiveModel::from(notification).insert(&*self.conn).await?;
        Ok(Notification::from(model))
    }

    async fn update(&self, notification: Notification) -> AppResult<Notification> {
        let model = ActiveModel::from(notification).update(&*self.conn).await?;
        Ok(Notification::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let model = NotificationEntity::find_by_id(id)
            .one(&*self.conn)
            .await?
            .ok_or_not_found()?;
        model.delete(&*self.conn).await?;
        Ok(())
    }
}
