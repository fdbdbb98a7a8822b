//! Health record repository.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect, Select,
};
use uuid::Uuid;

use super::entities::health_record::{self, ActiveModel, Entity as HealthRecordEntity};
use super::entities::pet;
use super::fetch_page;
use crate::domain::HealthRecord;
use crate::errors::{AppResult, OptionExt};
use crate::types::{Page, PaginationParams};

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait HealthRecordRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<HealthRecord>>;

    /// Records of live pets, newest record date first
    async fn list(
        &self,
        owner_id: Option<Uuid>,
        pet_id: Option<Uuid>,
        params: PaginationParams,
    ) -> AppResult<Page<HealthRecord>>;

    async fn create(&self, record: HealthRecord) -> AppResult<HealthRecord>;

    async fn update(&self, record: HealthRecord) -> AppResult<HealthRecord>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// SeaORM implementation of HealthRecordRepository
pub struct HealthRecordStore<C> {
    conn: Arc<C>,
}

impl<C> HealthRecordStore<C> {
    pub fn new(conn: Arc<C>) -> Self {
        Self { conn }
    }
}

fn list_query(owner_id: Option<Uuid>, pet_id: Option<Uuid>) -> Select<HealthRecordEntity> {
    let mut select = HealthRecordEntity::find()
        .inner_join(pet::Entity)
        .filter(pet::Column::IsDeleted.eq(false));
    if let Some(owner_id) = owner_id {
        select = select.filter(pet::Column::OwnerId.eq(owner_id));
    }
    if let Some(pet_id) = pet_id {
        select = select.filter(health_record::Column::PetId.eq(pet_id));
    }
    select
        .order_by_desc(health_record::Column::RecordDate)
        .order_by_desc(health_record::Column::CreatedAt)
}

#[async_trait]
impl<C> HealthRecordRepository for HealthRecordStore<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<HealthRecord>> {
        let result = HealthRecordEntity::find_by_id(id).one(&*self.conn).await?;
        Ok(result.map(HealthRecord::from))
    }

    async fn list(
        &self,
        owner_id: Option<Uuid>,
        pet_id: Option<Uuid>,
        params: PaginationParams,
    ) -> AppResult<Page<HealthRecord>> {
        let page = fetch_page(list_query(owner_id, pet_id), &*self.conn, params).await?;
        Ok(page.map(HealthRecord::from))
    }

    async fn create(&self, record: HealthRecord) -> AppResult<HealthRecord> {
        let model = ActiveModel::from(record).insert(&*self.conn).await?;
        Ok(HealthRecord::from(model))
    }

    async fn update(&self, record: HealthRecord) -> AppResult<HealthRecord> {
        let model = ActiveModel::from(record).update(&*self.conn).await?;
        Ok(HealthRecord::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let model = HealthRecordEntity::find_by_id(id)
            .one(&*self.conn)
            .await?
            .ok_or_not_found()?;
        model.delete(&*self.conn).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait, Value};

    #[test]
    fn test_records_of_deleted_pets_are_hidden() {
        let stmt = list_query(None, None).build(DbBackend::Postgres);
        assert!(stmt
            .sql
            .contains(r#"INNER JOIN "pets" ON "health_records"."pet_id" = "pets"."id""#));
        assert!(stmt.sql.contains(r#""pets"."is_deleted" = $1"#));
        assert!(stmt.sql.contains(
            r#"ORDER BY "health_records"."record_date" DESC, "health_records"."created_at" DESC"#
        ));
    }

    #[test]
    fn test_owner_and_pet_narrow_the_listing() {
        let owner = Uuid::new_v4();
        let pet_id = Uuid::new_v4();
        let stmt = list_query(Some(owner), Some(pet_id)).build(DbBackend::Postgres);
        assert!(stmt.sql.contains(r#""pets"."owner_id" = $2"#));
        assert!(stmt.sql.contains(r#""health_records"."pet_id" = $3"#));
        assert_eq!(
            stmt.values.map(|v| v.0).unwrap_or_default(),
            vec![Value::from(false), Value::from(owner), Value::from(pet_id)]
        );
    }
}
