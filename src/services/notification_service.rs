//! Notification service.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use super::checks::active_user;
use crate::domain::{
    require_admin, CreateNotification, CurrentUser, Notification, UpdateNotification,
};
use crate::errors::{AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Page, PaginationParams};

#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Own notifications, or every user's for an admin
    async fn list(
        &self,
        requester: &CurrentUser,
        params: PaginationParams,
    ) -> AppResult<Page<Notification>>;

    async fn my_notifications(
        &self,
        requester: &CurrentUser,
        params: PaginationParams,
    ) -> AppResult<Page<Notification>>;

    async fn unread(
        &self,
        requester: &CurrentUser,
        params: PaginationParams,
    ) -> AppResult<Page<Notification>>;

    async fn get(&self, requester: &CurrentUser, id: Uuid) -> AppResult<Notification>;

    async fn create(
        &self,
        requester: &CurrentUser,
        input: CreateNotification,
    ) -> AppResult<Notification>;

    async fn update(
        &self,
        requester: &CurrentUser,
        id: Uuid,
        changes: UpdateNotification,
    ) -> AppResult<Notification>;

    async fn delete(&self, requester: &CurrentUser, id: Uuid) -> AppResult<()>;

    async fn mark_read(&self, requester: &CurrentUser, id: Uuid) -> AppResult<Notification>;
}

pub struct NotificationManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> NotificationManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> NotificationService for NotificationManager<U> {
    async fn list(
        &self,
        requester: &CurrentUser,
        params: PaginationParams,
    ) -> AppResult<Page<Notification>> {
        self.uow
            .notifications()
            .list(requester.owner_filter(), false, params)
            .await
    }

    async fn my_notifications(
        &self,
        requester: &CurrentUser,
        params: PaginationParams,
    ) -> AppResult<Page<Notification>> {
        self.uow
            .notifications()
            .list(Some(requester.id), false, params)
            .await
    }

    async fn unread(
        &self,
        requester: &CurrentUser,
        params: PaginationParams,
    ) -> AppResult<Page<Notification>> {
        self.uow
            .notifications()
            .list(Some(requester.id), true, params)
            .await
    }

    async fn get(&self, requester: &CurrentUser, id: Uuid) -> AppResult<Notification> {
        let notification = self
            .uow
            .notifications()
            .find_by_id(id)
            .await?
            .ok_or_not_found()?;
        requester.scope(notification)
    }

    async fn create(
        &self,
        requester: &CurrentUser,
        input: CreateNotification,
    ) -> AppResult<Notification> {
        require_admin(requester)?;

        let txn = self.uow.begin().await?;
        active_user(txn.users(), "user_id", input.user_id).await?;

        let mut notification = Notification::new(input);
        notification.normalize().into_result()?;

        let notification = txn.notifications().create(notification).await?;
        txn.commit().await?;

        tracing::info!(
            notification_id = %notification.id,
            user_id = %notification.user_id,
            kind = %notification.notification_type,
            "Notification created"
        );
        Ok(notification)
    }

    async fn update(
        &self,
        requester: &CurrentUser,
        id: Uuid,
        changes: UpdateNotification,
    ) -> AppResult<Notification> {
        require_admin(requester)?;

        let txn = self.uow.begin().await?;
        let mut notification = txn
            .notifications()
            .find_by_id(id)
            .await?
            .ok_or_not_found()?;

        if let Some(user_id) = changes.user_id.filter(|u| *u != notification.user_id) {
            active_user(txn.users(), "user_id", user_id).await?;
        }

        notification.apply(changes);
        notification.normalize().into_result()?;

        let notification = txn.notifications().update(notification).await?;
        txn.commit().await?;

        tracing::info!(notification_id = %notification.id, "Notification updated");
        Ok(notification)
    }

    async fn delete(&self, requester: &CurrentUser, id: Uuid) -> AppResult<()> {
        require_admin(requester)?;
        let txn = self.uow.begin().await?;
        txn.notifications().delete(id).await?;
        txn.commit().await?;

        tracing::info!(notification_id = %id, "Notification deleted");
        Ok(())
    }

    async fn mark_read(&self, requester: &CurrentUser, id: Uuid) -> AppResult<Notification> {
        let txn = self.uow.begin().await?;
        let notification = txn
            .notifications()
            .find_by_id(id)
            .await?
            .ok_or_not_found()?;
        let mut notification = requester.scope(notification)?;

        if !notification.mark_read() {
            return Ok(notification);
        }
        let notification = txn.notifications().update(notification).await?;
        txn.commit().await?;

        tracing::info!(notification_id = %notification.id, "Notification marked as read");
        Ok(notification)
    }
}
