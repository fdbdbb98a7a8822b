//! Appointment repository.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Select,
};
use uuid::Uuid;

use super::entities::appointment::{self, ActiveModel, Entity as AppointmentEntity};
use super::fetch_page;
use crate::domain::Appointment;
use crate::errors::{AppResult, OptionExt};
use crate::types::{Page, PaginationParams};

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Appointment>>;

    /// Appointments, latest date first
    async fn list(
        &self,
        owner_id: Option<Uuid>,
        params: PaginationParams,
    ) -> AppResult<Page<Appointment>>;

    async fn create(&self, appointment: Appointment) -> AppResult<Appointment>;

    async fn update(&self, appointment: Appointment) -> AppResult<Appointment>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// SeaORM implementation of AppointmentRepository
pub struct AppointmentStore<C> {
    conn: Arc<C>,
}

impl<C> AppointmentStore<C> {
    pub fn new(conn: Arc<C>) -> Self {
        Self { conn }
    }
}

fn list_query(owner_id: Option<Uuid>) -> Select<AppointmentEntity> {
    let mut select = AppointmentEntity::find();
    if let Some(owner_id) = owner_id {
        select = select.filter(appointment::Column::OwnerId.eq(owner_id));
    }
    select.order_by_desc(appointment::Column::AppointmentDate)
}

#[async_trait]
impl<C> AppointmentRepository for AppointmentStore<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Appointment>> {
        let result = AppointmentEntity::find_by_id(id).one(&*self.conn).await?;
        Ok(result.map(Appointment::from))
    }

    async fn list(
        &self,
        owner_id: Option<Uuid>,
        params: PaginationParams,
    ) -> AppResult<Page<Appointment>> {
        let page = fetch_page(list_query(owner_id), &*self.conn, params).await?;
        Ok(page.map(Appointment::from))
    }

    async fn create(&self, appointment: Appointment) -> AppResult<Appointment> {
        let model = ActiveModel::from(appointment).insert(&*self.conn).await?;
        Ok(Appointment::from(model))
    }

    async fn update(&self, appointment: Appointment) -> AppResult<Appointment> {
        let model = ActiveModel::from(appointment).update(&*self.conn).await?;
        Ok(Appointment::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let model = AppointmentEntity::find_by_id(id)
            .one(&*self.conn)
            .await?
            .ok_or_not_found()?;
        model.delete(&*self.conn).await?;
        Ok(())
    }
}
