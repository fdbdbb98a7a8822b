//! Pet repository with soft-delete aware queries.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Select,
};
use uuid::Uuid;

use super::entities::pet::{self, ActiveModel, Entity as PetEntity};
use super::fetch_page;
use crate::domain::Pet;
use crate::errors::AppResult;
use crate::types::{Page, PaginationParams};

#[cfg(test)]
use mockall::automock;

/// Pet repository trait.
///
/// Default queries never return soft-deleted rows; the `_with_deleted`
/// and `list_deleted` methods are the only way to reach them.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PetRepository: Send + Sync {
    /// Find a pet that is not soft-deleted
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Pet>>;

    /// Find a pet whether or not it is soft-deleted
    async fn find_by_id_with_deleted(&self, id: Uuid) -> AppResult<Option<Pet>>;

    /// Live pets, optionally restricted to one owner
    async fn list(&self, owner_id: Option<Uuid>, params: PaginationParams) -> AppResult<Page<Pet>>;

    /// Soft-deleted pets, optionally restricted to one owner
    async fn list_deleted(
        &self,
        owner_id: Option<Uuid>,
        params: PaginationParams,
    ) -> AppResult<Page<Pet>>;

    /// Whether a live pet other than `exclude` carries this microchip
    async fn microchip_taken(&self, microchip: &str, exclude: Option<Uuid>) -> AppResult<bool>;

    async fn create(&self, pet: Pet) -> AppResult<Pet>;

    async fn update(&self, pet: Pet) -> AppResult<Pet>;
}

/// SeaORM implementation of PetRepository
pub struct PetStore<C> {
    conn: Arc<C>,
}

impl<C> PetStore<C> {
    pub fn new(conn: Arc<C>) -> Self {
        Self { conn }
    }
}

fn live_by_id(id: Uuid) -> Select<PetEntity> {
    PetEntity::find_by_id(id).filter(pet::Column::IsDeleted.eq(false))
}

fn scoped(deleted: bool, owner_id: Option<Uuid>) -> Select<PetEntity> {
    let mut select = PetEntity::find().filter(pet::Column::IsDeleted.eq(deleted));
    if let Some(owner_id) = owner_id {
        select = select.filter(pet::Column::OwnerId.eq(owner_id));
    }
    select
}

#[async_trait]
impl<C> PetRepository for PetStore<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Pet>> {
        let result = live_by_id(id).one(&*self.conn).await?;
        Ok(result.map(Pet::from))
    }

    async fn find_by_id_with_deleted(&self, id: Uuid) -> AppResult<Option<Pet>> {
        let result = PetEntity::find_by_id(id).one(&*self.conn).await?;
        Ok(result.map(Pet::from))
    }

    async fn list(&self, owner_id: Option<Uuid>, params: PaginationParams) -> AppResult<Page<Pet>> {
        let select = scoped(false, owner_id).order_by_desc(pet::Column::CreatedAt);
        let page = fetch_page(select, &*self.conn, params).await?;
        Ok(page.map(Pet::from))
    }

    async fn list_deleted(
        &self,
        owner_id: Option<Uuid>,
        params: PaginationParams,
    ) -> AppResult<Page<Pet>> {
        let select = scoped(true, owner_id).order_by_desc(pet::Column::DeletedAt);
        let page = fetch_page(select, &*self.conn, params).await?;
        Ok(page.map(Pet::from))
    }

    async fn microchip_taken(&self, microchip: &str, exclude: Option<Uuid>) -> AppResult<bool> {
        let mut select = PetEntity::find()
            .filter(pet::Column::IsDeleted.eq(false))
            .filter(pet::Column::MicrochipNumber.eq(microchip));
        if let Some(id) = exclude {
            select = select.filter(pet::Column::Id.ne(id));
        }
        let count = select.count(&*self.conn).await?;
        Ok(count > 0)
    }

    async fn create(&self, pet: Pet) -> AppResult<Pet> {
        let model = ActiveModel::from(pet).insert(&*self.conn).await?;
        Ok(Pet::from(model))
    }

    async fn update(&self, pet: Pet) -> AppResult<Pet> {
        let model = ActiveModel::from(pet).update(&*self.conn).await?;
        Ok(Pet::from(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait, Value};

    fn built(select: Select<PetEntity>) -> (String, Vec<Value>) {
        let stmt = select.build(DbBackend::Postgres);
        (stmt.sql, stmt.values.map(|v| v.0).unwrap_or_default())
    }

    #[test]
    fn test_lookup_by_id_skips_soft_deleted() {
        let id = Uuid::new_v4();
        let (sql, values) = built(live_by_id(id));
        assert!(sql.contains(r#""pets"."id" = $1"#));
        assert!(sql.contains(r#""pets"."is_deleted" = $2"#));
        assert_eq!(values, vec![Value::from(id), Value::from(false)]);
    }

    #[test]
    fn test_listing_without_owner_still_hides_deleted() {
        let (sql, values) = built(scoped(false, None));
        assert!(sql.contains(r#""pets"."is_deleted" = $1"#));
        assert!(!sql.contains("owner_id\" ="));
        assert_eq!(values, vec![Value::from(false)]);
    }

    #[test]
    fn test_owner_listing_is_restricted_to_owner() {
        let owner = Uuid::new_v4();
        let (sql, values) = built(scoped(false, Some(owner)));
        assert!(sql.contains(r#""pets"."is_deleted" = $1 AND "pets"."owner_id" = $2"#));
        assert_eq!(values, vec![Value::from(false), Value::from(owner)]);
    }

    #[test]
    fn test_deleted_listing_selects_only_deleted() {
        let owner = Uuid::new_v4();
        let (_, values) = built(scoped(true, Some(owner)));
        assert_eq!(values, vec![Value::from(true), Value::from(owner)]);
    }
}
