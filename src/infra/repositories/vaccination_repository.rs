//! Vaccination repository.
//!
//! Lists are scoped through the pet: rows whose pet is soft-deleted are
//! hidden, and the owner filter applies to the pet's owner.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, UpdateMany,
};
use uuid::Uuid;

use super::entities::pet;
use super::entities::vaccination::{self, ActiveModel, Entity as VaccinationEntity};
use super::fetch_page;
use crate::domain::{Vaccination, VaccinationStatus};
use crate::errors::{AppResult, OptionExt};
use crate::types::{Page, PaginationParams};

#[cfg(test)]
use mockall::automock;

/// Filters for vaccination listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VaccinationFilter {
    /// Restrict to pets of this owner
    pub owner_id: Option<Uuid>,
    /// Restrict to one stored status
    pub status: Option<VaccinationStatus>,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait VaccinationRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Vaccination>>;

    /// Vaccinations of live pets, soonest due first
    async fn list(
        &self,
        filter: VaccinationFilter,
        params: PaginationParams,
    ) -> AppResult<Page<Vaccination>>;

    async fn create(&self, vaccination: Vaccination) -> AppResult<Vaccination>;

    async fn update(&self, vaccination: Vaccination) -> AppResult<Vaccination>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// Re-derive stored statuses for `today`. Returns the number of rows changed.
    async fn refresh_statuses(&self, today: NaiveDate) -> AppResult<u64>;
}

/// SeaORM implementation of VaccinationRepository
pub struct VaccinationStore<C> {
    conn: Arc<C>,
}

impl<C> VaccinationStore<C> {
    pub fn new(conn: Arc<C>) -> Self {
        Self { conn }
    }
}

fn list_query(filter: VaccinationFilter) -> Select<VaccinationEntity> {
    let mut select = VaccinationEntity::find()
        .inner_join(pet::Entity)
        .filter(pet::Column::IsDeleted.eq(false));
    if let Some(owner_id) = filter.owner_id {
        select = select.filter(pet::Column::OwnerId.eq(owner_id));
    }
    if let Some(status) = filter.status {
        select = select.filter(vaccination::Column::Status.eq(status.as_str()));
    }
    select
        .order_by_asc(vaccination::Column::DueDate)
        .order_by_asc(vaccination::Column::VaccineName)
}

/// `Vaccination::derive_status` as bulk updates, to be run in order.
fn status_refresh(today: NaiveDate, now: DateTime<Utc>) -> [UpdateMany<VaccinationEntity>; 3] {
    use vaccination::Column;

    let completed = VaccinationStatus::Completed.as_str();
    let overdue = VaccinationStatus::Overdue.as_str();
    let pending = VaccinationStatus::Pending.as_str();

    let to_completed = VaccinationEntity::update_many()
        .col_expr(Column::Status, Expr::value(completed))
        .col_expr(Column::UpdatedAt, Expr::value(now))
        .filter(Column::AdministeredDate.is_not_null())
        .filter(Column::Status.ne(completed));

    let to_overdue = VaccinationEntity::update_many()
        .col_expr(Column::Status, Expr::value(overdue))
        .col_expr(Column::UpdatedAt, Expr::value(now))
        .filter(Column::AdministeredDate.is_null())
        .filter(Column::DueDate.lt(today))
        .filter(Column::Status.is_not_in([completed, overdue]));

    let to_pending = VaccinationEntity::update_many()
        .col_expr(Column::Status, Expr::value(pending))
        .col_expr(Column::UpdatedAt, Expr::value(now))
        .filter(Column::AdministeredDate.is_null())
        .filter(Column::DueDate.gte(today))
        .filter(Column::Status.eq(overdue));

    [to_completed, to_overdue, to_pending]
}

#[async_trait]
impl<C> VaccinationRepository for VaccinationStore<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Vaccination>> {
        let result = VaccinationEntity::find_by_id(id).one(&*self.conn).await?;
        Ok(result.map(Vaccination::from))
    }

    async fn list(
        &self,
        filter: VaccinationFilter,
        params: PaginationParams,
    ) -> AppResult<Page<Vaccination>> {
        let page = fetch_page(list_query(filter), &*self.conn, params).await?;
        Ok(page.map(Vaccination::from))
    }

    async fn create(&self, vaccination: Vaccination) -> AppResult<Vaccination> {
        let model = ActiveModel::from(vaccination).insert(&*self.conn).await?;
        Ok(Vaccination::from(model))
    }

    async fn update(&self, vaccination: Vaccination) -> AppResult<Vaccination> {
        let model = ActiveModel::from(vaccination).update(&*self.conn).await?;
        Ok(Vaccination::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let model = VaccinationEntity::find_by_id(id)
            .one(&*self.conn)
            .await?
            .ok_or_not_found()?;
        model.delete(&*self.conn).await?;
        Ok(())
    }

    async fn refresh_statuses(&self, today: NaiveDate) -> AppResult<u64> {
        let mut changed = 0;
        for update in status_refresh(today, Utc::now()) {
            changed += update.exec(&*self.conn).await?.rows_affected;
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait, Value};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    fn parts(stmt: sea_orm::Statement) -> (String, Vec<Value>) {
        (stmt.sql, stmt.values.map(|v| v.0).unwrap_or_default())
    }

    #[test]
    fn test_listing_joins_pets_and_hides_deleted_ones() {
        let (sql, values) =
            parts(list_query(VaccinationFilter::default()).build(DbBackend::Postgres));
        assert!(sql.contains(r#"INNER JOIN "pets" ON "vaccinations"."pet_id" = "pets"."id""#));
        assert!(sql.contains(r#""pets"."is_deleted" = $1"#));
        assert!(sql.contains(r#"ORDER BY "vaccinations"."due_date" ASC"#));
        assert_eq!(values, vec![Value::from(false)]);
    }

    #[test]
    fn test_owner_and_status_filters() {
        let owner = Uuid::new_v4();
        let filter = VaccinationFilter {
            owner_id: Some(owner),
            status: Some(VaccinationStatus::Overdue),
        };
        let (sql, values) = parts(list_query(filter).build(DbBackend::Postgres));
        assert!(sql.contains(r#""pets"."owner_id" = $2"#));
        assert!(sql.contains(r#""vaccinations"."status" = $3"#));
        assert_eq!(
            values,
            vec![Value::from(false), Value::from(owner), Value::from("overdue")]
        );
    }

    #[test]
    fn test_administered_rows_become_completed() {
        let [to_completed, _, _] = status_refresh(today(), Utc::now());
        let (sql, values) = parts(to_completed.build(DbBackend::Postgres));
        assert!(sql.starts_with(r#"UPDATE "vaccinations" SET "status" = $1"#));
        assert!(sql.contains(r#""vaccinations"."administered_date" IS NOT NULL"#));
        assert!(sql.contains(r#""vaccinations"."status" <> $3"#));
        assert_eq!(values[0], Value::from("completed"));
        assert_eq!(values[2], Value::from("completed"));
    }

    #[test]
    fn test_past_due_unadministered_rows_become_overdue() {
        let [_, to_overdue, _] = status_refresh(today(), Utc::now());
        let (sql, values) = parts(to_overdue.build(DbBackend::Postgres));
        assert!(sql.contains(r#""vaccinations"."administered_date" IS NULL"#));
        assert!(sql.contains(r#""vaccinations"."due_date" < $3"#));
        assert!(sql.contains(r#""vaccinations"."status" NOT IN ($4, $5)"#));
        assert_eq!(values[0], Value::from("overdue"));
        assert_eq!(values[2], Value::from(today()));
        assert_eq!(&values[3..], &[Value::from("completed"), Value::from("overdue")]);
    }

    #[test]
    fn test_overdue_rows_due_again_return_to_pending() {
        let [_, _, to_pending] = status_refresh(today(), Utc::now());
        let (sql, values) = parts(to_pending.build(DbBackend::Postgres));
        assert!(sql.contains(r#""vaccinations"."administered_date" IS NULL"#));
        assert!(sql.contains(r#""vaccinations"."due_date" >= $3"#));
        assert!(sql.contains(r#""vaccinations"."status" = $4"#));
        assert_eq!(values[0], Value::from("pending"));
        assert_eq!(values[2], Value::from(today()));
        assert_eq!(values[3], Value::from("overdue"));
    }
}
